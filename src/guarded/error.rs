//! Error type for guarded invocations.

use std::error::Error;
use std::fmt;

use super::ReleaseOutcome;
use crate::lock::LockError;

/// Failure of a guarded call.
///
/// A busy lock is not represented here; see `Invocation::NotAcquired`.
#[derive(Debug)]
pub enum GuardError<E> {
    /// Acquisition itself failed (store unreachable, invalid key or ttl).
    /// The operation was never invoked.
    Acquire(LockError),
    /// The protected operation failed. The lock was still released; the
    /// release outcome is carried alongside so a failed release is reported
    /// together with the operation's error rather than hidden by it.
    Operation { error: E, release: ReleaseOutcome },
}

impl<E> GuardError<E> {
    /// The protected operation's own error, if it ran and failed.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            GuardError::Operation { error, .. } => Some(error),
            GuardError::Acquire(_) => None,
        }
    }

    pub fn into_operation_error(self) -> Option<E> {
        match self {
            GuardError::Operation { error, .. } => Some(error),
            GuardError::Acquire(_) => None,
        }
    }

    pub fn release_outcome(&self) -> Option<&ReleaseOutcome> {
        match self {
            GuardError::Operation { release, .. } => Some(release),
            GuardError::Acquire(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for GuardError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Acquire(err) => write!(f, "lock acquire failed: {}", err),
            GuardError::Operation {
                error,
                release: ReleaseOutcome::Failed(release_err),
            } => write!(
                f,
                "guarded operation failed: {} (lock release also failed: {})",
                error, release_err
            ),
            GuardError::Operation { error, .. } => write!(f, "guarded operation failed: {}", error),
        }
    }
}

impl<E: Error + 'static> Error for GuardError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GuardError::Acquire(err) => Some(err),
            GuardError::Operation { error, .. } => Some(error),
        }
    }
}
