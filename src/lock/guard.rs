use std::thread;

use crate::store::KeyValueStore;

use super::{LockError, LockHandle, LockKey, LockManager, LockToken};

/// RAII guard over an acquired lock.
///
/// The lock is released exactly once: either by [`LockGuard::release`], or
/// when the guard is dropped, which also covers unwinding out of a panic.
pub struct LockGuard<'a, S: KeyValueStore> {
    manager: &'a LockManager<S>,
    handle: LockHandle,
    armed: bool,
}

impl<'a, S: KeyValueStore> LockGuard<'a, S> {
    pub(crate) fn new(manager: &'a LockManager<S>, handle: LockHandle) -> Self {
        Self {
            manager,
            handle,
            armed: true,
        }
    }

    pub fn handle(&self) -> &LockHandle {
        &self.handle
    }

    pub fn key(&self) -> &LockKey {
        self.handle.key()
    }

    pub fn token(&self) -> &LockToken {
        self.handle.token()
    }

    /// Release now and report the outcome instead of leaving it to `Drop`.
    pub fn release(mut self) -> Result<bool, LockError> {
        self.armed = false;
        self.manager.release(self.handle.key(), self.handle.token())
    }
}

impl<S: KeyValueStore> Drop for LockGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        let unwinding = thread::panicking();
        match self.manager.release(self.handle.key(), self.handle.token()) {
            Ok(released) => {
                if unwinding {
                    tracing::warn!(key = %self.handle.key(), released, "lock released while unwinding");
                } else if !released {
                    tracing::debug!(key = %self.handle.key(), "lock had already lapsed at drop");
                }
            }
            Err(err) => {
                tracing::warn!(key = %self.handle.key(), error = %err, unwinding, "failed to release lock on drop");
            }
        }
    }
}
