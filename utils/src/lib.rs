//! Shared utilities for the BRIX platform.

pub mod logging;
pub mod time;

pub use logging::{init_tracing, init_tracing_with_filter};
pub use time::format_duration;
