//! Acquire, run, release: the sanctioned way to use the lock.
//!
//! ```text
//! IDLE ─► ACQUIRING ─┬─► HELD ─► RELEASING ─► DONE
//!                    └─► NOT_ACQUIRED
//! ```
//!
//! The operation only runs in HELD. Once HELD is entered, RELEASING follows
//! on every exit path: normal return, returned error, or panic.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use kvlock::{GuardedInvocation, InMemoryStore, Invocation, LockManager};
//!
//! let guarded = GuardedInvocation::new(LockManager::new(InMemoryStore::new()));
//! let outcome = guarded
//!     .run("report", Duration::from_secs(30), || Ok::<_, std::io::Error>(42))
//!     .unwrap();
//! assert!(matches!(outcome, Invocation::Completed { value: 42, .. }));
//! ```

use std::convert::Infallible;
use std::time::Duration;

use super::{GuardError, Invocation, ReleaseOutcome};
use crate::lock::{LockError, LockManager};
use crate::store::KeyValueStore;

/// Wraps protected operations with acquire/execute/release.
#[derive(Debug, Clone)]
pub struct GuardedInvocation<S> {
    manager: LockManager<S>,
}

impl<S: KeyValueStore> GuardedInvocation<S> {
    pub fn new(manager: LockManager<S>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &LockManager<S> {
        &self.manager
    }

    /// Run `operation` while holding `key` for at most `ttl`.
    ///
    /// Returns `Ok(Invocation::NotAcquired)` without calling `operation` if
    /// the lock is busy. Otherwise the lock is released exactly once before
    /// this returns (or before a panic propagates out of it), and the
    /// operation's result is passed through unchanged.
    pub fn run<T, E, F>(
        &self,
        key: &str,
        ttl: Duration,
        operation: F,
    ) -> Result<Invocation<T>, GuardError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let guard = match self.manager.lock_scoped(key, ttl) {
            Ok(Some(guard)) => guard,
            Ok(None) => {
                tracing::info!(key, "lock busy, skipping guarded call");
                return Ok(Invocation::NotAcquired {
                    key: key.to_string(),
                });
            }
            Err(err) => return Err(GuardError::Acquire(err)),
        };
        tracing::debug!(key, token = %guard.token(), "running guarded call");

        // A panic here drops `guard`, which releases the lock while unwinding.
        let result = operation();

        let release = ReleaseOutcome::from(guard.release());
        match &release {
            ReleaseOutcome::Released => {}
            ReleaseOutcome::Lapsed => {
                tracing::warn!(key, "lock expired before the guarded call finished")
            }
            ReleaseOutcome::Failed(err) => {
                tracing::warn!(key, error = %err, "failed to release lock after guarded call")
            }
        }

        match result {
            Ok(value) => Ok(Invocation::Completed { value, release }),
            Err(error) => Err(GuardError::Operation { error, release }),
        }
    }

    /// [`run`](Self::run) with the configured default TTL.
    pub fn run_default<T, E, F>(&self, key: &str, operation: F) -> Result<Invocation<T>, GuardError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.run(key, self.manager.config().default_ttl(), operation)
    }

    /// [`run`](Self::run) for operations that cannot fail.
    pub fn call<T, F>(&self, key: &str, ttl: Duration, operation: F) -> Result<Invocation<T>, LockError>
    where
        F: FnOnce() -> T,
    {
        self.run(key, ttl, || Ok::<T, Infallible>(operation()))
            .map_err(|err| match err {
                GuardError::Acquire(err) => err,
                GuardError::Operation { error, .. } => match error {},
            })
    }
}
