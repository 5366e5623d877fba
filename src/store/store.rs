//! KeyValueStore - the narrow capability interface the lock protocol needs.

use std::sync::Arc;
use std::time::Duration;

use super::{Script, StoreError};

/// Capability interface the lock protocol requires from a shared store.
///
/// Correctness of the lock depends entirely on the atomicity promised here;
/// the caller never adds its own serialization on top.
pub trait KeyValueStore: Send + Sync {
    /// Set `key` to `value` only if it does not exist, attaching `ttl` in the
    /// same atomic operation. Returns `Ok(true)` if this call created the key.
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Run a server-side script atomically. No other client may observe or
    /// interleave with an intermediate state. `Ok(None)` is a nil reply.
    fn eval(&self, script: &Script, keys: &[&str], args: &[&str])
        -> Result<Option<i64>, StoreError>;

    /// Read the current value of `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Delete `key`. Returns true if it existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Remaining time to live of `key`, or `None` if the key is absent.
    ///
    /// A present key without an expiry reports `Duration::MAX`.
    fn pttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        (**self).set_if_absent(key, value, ttl)
    }

    fn eval(
        &self,
        script: &Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<Option<i64>, StoreError> {
        (**self).eval(script, keys, args)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key)
    }

    fn pttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        (**self).pttl(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        (**self).set_if_absent(key, value, ttl)
    }

    fn eval(
        &self,
        script: &Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<Option<i64>, StoreError> {
        (**self).eval(script, keys, args)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key)
    }

    fn pttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        (**self).pttl(key)
    }
}
