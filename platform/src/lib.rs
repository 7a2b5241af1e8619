//! Deployment wiring and configuration for the BRIX platform.

pub mod config;
pub mod deployment;
pub mod error;

pub use config::{IssuerConfig, PlatformConfig};
pub use deployment::Deployment;
pub use error::PlatformError;

/// Initialize logging from the config's `log_level`; `RUST_LOG` overrides.
pub fn init_logging(config: &PlatformConfig) {
    brix_utils::logging::init_tracing_with_filter(&config.log_level);
}
