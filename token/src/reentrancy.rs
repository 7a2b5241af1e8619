//! Scoped reentrancy lock.
//!
//! Fund-releasing operations mutate internal state before any external value
//! transfer; this lock is the second line of defense, refusing nested entry
//! into any guarded operation on the same instance.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReentrancyError {
    #[error("reentrant call")]
    ReentrantCall,
}

/// A per-instance in-progress flag with scoped acquisition.
#[derive(Clone, Debug, Default)]
pub struct ReentrancyLock {
    entered: bool,
}

impl ReentrancyLock {
    pub const fn new() -> Self {
        Self { entered: false }
    }

    /// Acquire the lock for the current call. Fails if already held.
    /// The returned guard releases on drop.
    pub fn enter(&mut self) -> Result<ReentrancyGuard<'_>, ReentrancyError> {
        if self.entered {
            return Err(ReentrancyError::ReentrantCall);
        }
        self.entered = true;
        Ok(ReentrancyGuard { lock: self })
    }
}

pub struct ReentrancyGuard<'a> {
    lock: &'a mut ReentrancyLock,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.lock.entered = false;
    }
}
