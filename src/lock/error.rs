use std::fmt;
use std::time::Duration;

use crate::store::StoreError;

/// Error type for lock operations.
///
/// Contention is not an error: `acquire` and `release` report it as
/// `Ok(false)`. `Busy` only appears when a caller explicitly asks for a
/// missed acquisition to be treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The lock key was empty or blank.
    InvalidKey(String),
    /// The TTL was zero.
    InvalidTtl(Duration),
    /// The store could not be reached or answered unexpectedly.
    Store(StoreError),
    /// The lock was held by another owner.
    Busy(String),
}

impl LockError {
    /// True when the failure came from the store rather than the caller's input.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, LockError::Store(_))
    }
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::InvalidKey(key) => write!(f, "invalid lock key: {:?}", key),
            LockError::InvalidTtl(ttl) => write!(f, "invalid lock ttl: {:?}", ttl),
            LockError::Store(err) => write!(f, "lock store unavailable: {}", err),
            LockError::Busy(key) => write!(f, "lock busy: {}", key),
        }
    }
}

impl std::error::Error for LockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LockError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for LockError {
    fn from(err: StoreError) -> Self {
        LockError::Store(err)
    }
}
