//! LockManager - acquire/release primitives over a `KeyValueStore`.
//!
//! ## Acquire
//!
//! Both acquire paths are a single atomic operation on the store:
//!
//! - [`LockManager::acquire`]: `SET key token NX PX ttl`.
//! - [`LockManager::acquire_scripted`]: the acquire script, which sets the key
//!   and its expiry inside one server-side execution.
//!
//! A separate "check, then set" or "set, then expire" sequence is never used:
//! the first lets two callers both see an absent key, the second leaves an
//! immortal lock behind if the client dies between the two commands.
//!
//! ## Release
//!
//! [`LockManager::release`] runs the release script, which compares the stored
//! token with the caller's and deletes only on a match, as one unit.
//!
//! [`LockManager::release_non_atomic`] is the GET-compare-DEL sequence kept
//! as a baseline. It is unsafe: if the record expires between the GET and the
//! DEL and another caller acquires the key in that window, the DEL removes the
//! other caller's lock.

use std::time::Duration;

use crate::config::{AcquireMode, LockConfig};
use crate::store::{KeyValueStore, Script, StoreError};

use super::{LockError, LockGuard, LockHandle, LockKey, LockToken};

/// Distributed lock manager backed by a shared key-value store.
///
/// Holds no in-process lock state: the store is the only serialization
/// point, so threads in one process contend exactly like separate processes.
#[derive(Debug, Clone)]
pub struct LockManager<S> {
    store: S,
    config: LockConfig,
}

impl<S: KeyValueStore> LockManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LockConfig::default())
    }

    pub fn with_config(store: S, config: LockConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// The key as written to the store, namespaced by `key_prefix`.
    pub fn store_key(&self, key: &LockKey) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    /// Try to create the lock record with a single `SET NX` + TTL.
    ///
    /// `Ok(true)` if this call created the record, `Ok(false)` if the lock is
    /// held by someone else. Store failures are `Err(LockError::Store)`.
    pub fn acquire(
        &self,
        key: &LockKey,
        token: &LockToken,
        ttl: Duration,
    ) -> Result<bool, LockError> {
        let ttl_ms = ttl_millis(ttl)?;
        let acquired = self.store.set_if_absent(
            &self.store_key(key),
            token.as_str(),
            Duration::from_millis(ttl_ms),
        )?;
        tracing::debug!(key = %key, token = %token, ttl_ms, acquired, "acquire");
        Ok(acquired)
    }

    /// Same contract as [`acquire`](Self::acquire), via the acquire script.
    pub fn acquire_scripted(
        &self,
        key: &LockKey,
        token: &LockToken,
        ttl: Duration,
    ) -> Result<bool, LockError> {
        let ttl_ms = ttl_millis(ttl)?.to_string();
        let store_key = self.store_key(key);
        let reply = self.store.eval(
            &Script::ACQUIRE,
            &[store_key.as_str()],
            &[token.as_str(), ttl_ms.as_str()],
        )?;
        let acquired = script_flag("acquire", reply)?;
        tracing::debug!(key = %key, token = %token, ttl_ms = %ttl_ms, acquired, "acquire (script)");
        Ok(acquired)
    }

    /// Delete the lock record only if it still holds `token`, atomically.
    ///
    /// `Ok(false)` means the lock had already lapsed or belongs to someone
    /// else; no record is touched in that case.
    pub fn release(&self, key: &LockKey, token: &LockToken) -> Result<bool, LockError> {
        let store_key = self.store_key(key);
        let reply = self
            .store
            .eval(&Script::RELEASE, &[store_key.as_str()], &[token.as_str()])?;
        let released = script_flag("release", reply)?;
        tracing::debug!(key = %key, token = %token, released, "release");
        Ok(released)
    }

    /// GET, compare, then DEL as three separate steps.
    ///
    /// UNSAFE under contention: the record can expire and be re-acquired by
    /// another owner between the GET and the DEL, and this call then deletes
    /// that owner's lock. Use [`release`](Self::release).
    pub fn release_non_atomic(&self, key: &LockKey, token: &LockToken) -> Result<bool, LockError> {
        let store_key = self.store_key(key);
        let current = self.store.get(&store_key)?;
        if current.as_deref() != Some(token.as_str()) {
            return Ok(false);
        }
        let deleted = self.store.delete(&store_key)?;
        tracing::debug!(key = %key, token = %token, deleted, "release (non-atomic)");
        Ok(deleted)
    }

    /// Acquire `key` with a freshly generated token using the configured
    /// [`AcquireMode`]. `Ok(None)` means the lock is busy.
    pub fn try_lock(&self, key: &str, ttl: Duration) -> Result<Option<LockHandle>, LockError> {
        let key = LockKey::new(key)?;
        let token = LockToken::generate();
        let acquired = match self.config.acquire_mode {
            AcquireMode::SetIfAbsent => self.acquire(&key, &token, ttl)?,
            AcquireMode::Script => self.acquire_scripted(&key, &token, ttl)?,
        };
        Ok(acquired.then(|| LockHandle::new(key, token, ttl)))
    }

    /// Release a handle obtained from [`try_lock`](Self::try_lock).
    pub fn unlock(&self, handle: LockHandle) -> Result<bool, LockError> {
        self.release(handle.key(), handle.token())
    }

    /// Like [`try_lock`](Self::try_lock), but the returned guard releases the
    /// lock when dropped, including while unwinding from a panic.
    pub fn lock_scoped(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<LockGuard<'_, S>>, LockError> {
        Ok(self
            .try_lock(key, ttl)?
            .map(|handle| LockGuard::new(self, handle)))
    }

    /// Whether any owner currently holds `key`.
    pub fn is_locked(&self, key: &str) -> Result<bool, LockError> {
        Ok(self.remaining_ttl(key)?.is_some())
    }

    /// Time left on the current record for `key`, or `None` if unlocked.
    pub fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>, LockError> {
        let key = LockKey::new(key)?;
        Ok(self.store.pttl(&self.store_key(&key))?)
    }
}

/// Whole milliseconds, rounded up so a sub-millisecond TTL never becomes 0.
fn ttl_millis(ttl: Duration) -> Result<u64, LockError> {
    if ttl.is_zero() {
        return Err(LockError::InvalidTtl(ttl));
    }
    let ms = ttl.as_nanos().div_ceil(1_000_000);
    u64::try_from(ms).map_err(|_| LockError::InvalidTtl(ttl))
}

/// Scripts answer 1 on success and 0 (or nil) otherwise.
fn script_flag(script: &str, reply: Option<i64>) -> Result<bool, LockError> {
    match reply {
        Some(1) => Ok(true),
        Some(0) | None => Ok(false),
        Some(other) => Err(LockError::Store(StoreError::UnexpectedReply(format!(
            "{} script returned {}",
            script, other
        )))),
    }
}
