use std::time::{Duration, Instant};

use super::{LockKey, LockToken};

/// Proof that this call stack acquired `key` with `token`.
///
/// Deliberately not `Clone`: releasing consumes the handle.
#[derive(Debug)]
pub struct LockHandle {
    key: LockKey,
    token: LockToken,
    ttl: Duration,
    acquired_at: Instant,
}

impl LockHandle {
    pub(crate) fn new(key: LockKey, token: LockToken, ttl: Duration) -> Self {
        Self {
            key,
            token,
            ttl,
            acquired_at: Instant::now(),
        }
    }

    pub fn key(&self) -> &LockKey {
        &self.key
    }

    pub fn token(&self) -> &LockToken {
        &self.token
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// Local estimate of the time left before the store expires the record.
    ///
    /// Measured from when the acquire call returned, so it slightly
    /// overestimates; the store's clock is authoritative.
    pub fn remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.acquired_at.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}
