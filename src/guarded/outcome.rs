use crate::lock::LockError;

/// What happened when the lock was released after the protected call.
///
/// Diagnostic only: it never replaces the operation's own result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Our token matched and the record was deleted.
    Released,
    /// The record had already expired or belonged to another owner.
    Lapsed,
    /// The store could not be reached during release. The record will be
    /// removed by its TTL.
    Failed(LockError),
}

impl ReleaseOutcome {
    pub fn is_released(&self) -> bool {
        matches!(self, ReleaseOutcome::Released)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseOutcome::Released => "released",
            ReleaseOutcome::Lapsed => "lapsed",
            ReleaseOutcome::Failed(_) => "failed",
        }
    }
}

impl From<Result<bool, LockError>> for ReleaseOutcome {
    fn from(result: Result<bool, LockError>) -> Self {
        match result {
            Ok(true) => ReleaseOutcome::Released,
            Ok(false) => ReleaseOutcome::Lapsed,
            Err(err) => ReleaseOutcome::Failed(err),
        }
    }
}

/// Result of a guarded call that did not fail.
#[derive(Debug)]
pub enum Invocation<T> {
    /// The lock was held while the operation ran to completion.
    Completed { value: T, release: ReleaseOutcome },
    /// The lock was busy; the operation was not invoked.
    NotAcquired { key: String },
}

impl<T> Invocation<T> {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Invocation::Completed { .. })
    }

    pub fn value(self) -> Option<T> {
        match self {
            Invocation::Completed { value, .. } => Some(value),
            Invocation::NotAcquired { .. } => None,
        }
    }

    pub fn release_outcome(&self) -> Option<&ReleaseOutcome> {
        match self {
            Invocation::Completed { release, .. } => Some(release),
            Invocation::NotAcquired { .. } => None,
        }
    }

    /// Treat a busy lock as an error.
    pub fn acquired(self) -> Result<T, LockError> {
        match self {
            Invocation::Completed { value, .. } => Ok(value),
            Invocation::NotAcquired { key } => Err(LockError::Busy(key)),
        }
    }
}
