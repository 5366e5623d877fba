//! RedisStore - `KeyValueStore` over a Redis server.
//!
//! Requires the `redis` feature. Atomicity comes from Redis itself: `SET NX PX`
//! is a single command and scripts run to completion on the server's single
//! command thread.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use redis::{Client, Connection, RedisError};

use super::{KeyValueStore, Script, ScriptKind, StoreError};
use crate::config::RedisStoreConfig;

/// Redis-backed store.
///
/// Holds one lazily opened connection. A connection that fails with an I/O
/// error or timeout is discarded, so the next call reconnects.
pub struct RedisStore {
    client: Client,
    config: RedisStoreConfig,
    connection: Mutex<Option<Connection>>,
    acquire: redis::Script,
    release: redis::Script,
}

impl RedisStore {
    pub fn open(config: RedisStoreConfig) -> Result<Self, StoreError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            config,
            connection: Mutex::new(None),
            acquire: redis::Script::new(Script::ACQUIRE.source()),
            release: redis::Script::new(Script::RELEASE.source()),
        })
    }

    /// Open a store with default timeouts for the given URL.
    pub fn connect(url: impl Into<String>) -> Result<Self, StoreError> {
        Self::open(RedisStoreConfig {
            url: url.into(),
            ..RedisStoreConfig::default()
        })
    }

    pub fn config(&self) -> &RedisStoreConfig {
        &self.config
    }

    fn slot(&self) -> Result<MutexGuard<'_, Option<Connection>>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Poisoned("redis connection".into()))
    }

    fn open_connection(&self) -> Result<Connection, StoreError> {
        let con = self
            .client
            .get_connection_with_timeout(self.config.connect_timeout())
            .map_err(map_error)?;
        let timeout = Some(self.config.command_timeout());
        con.set_read_timeout(timeout).map_err(map_error)?;
        con.set_write_timeout(timeout).map_err(map_error)?;
        tracing::debug!(url = %self.config.url, "opened redis connection");
        Ok(con)
    }

    /// Run `f` against the shared connection, reconnecting if needed.
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, RedisError>,
    ) -> Result<T, StoreError> {
        let mut slot = self.slot()?;
        if slot.is_none() {
            *slot = Some(self.open_connection()?);
        }
        let Some(con) = slot.as_mut() else {
            return Err(StoreError::Connection("no redis connection".into()));
        };
        match f(con) {
            Ok(value) => Ok(value),
            Err(err) => {
                if err.is_io_error() || err.is_timeout() || err.is_connection_dropped() {
                    tracing::warn!(error = %err, "dropping redis connection");
                    *slot = None;
                }
                Err(map_error(err))
            }
        }
    }
}

fn map_error(err: RedisError) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout(err.to_string())
    } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Script(err.to_string())
    }
}

impl KeyValueStore for RedisStore {
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        let ttl_ms = ttl.as_millis().max(1) as u64;
        let reply: Option<String> = self.with_connection(|con| {
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("PX")
                .arg(ttl_ms)
                .query(con)
        })?;
        match reply.as_deref() {
            Some("OK") => Ok(true),
            None => Ok(false),
            Some(other) => Err(StoreError::UnexpectedReply(format!("SET NX returned {}", other))),
        }
    }

    fn eval(
        &self,
        script: &Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<Option<i64>, StoreError> {
        let prepared = match script.kind() {
            ScriptKind::Acquire => &self.acquire,
            ScriptKind::Release => &self.release,
        };
        self.with_connection(|con| {
            let mut invocation = prepared.prepare_invoke();
            for key in keys {
                invocation.key(*key);
            }
            for arg in args {
                invocation.arg(*arg);
            }
            invocation.invoke(con)
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_connection(|con| redis::cmd("GET").arg(key).query(con))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let deleted: i64 = self.with_connection(|con| redis::cmd("DEL").arg(key).query(con))?;
        Ok(deleted > 0)
    }

    fn pttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let ms: i64 = self.with_connection(|con| redis::cmd("PTTL").arg(key).query(con))?;
        Ok(match ms {
            -2 => None,
            -1 => Some(Duration::MAX),
            ms if ms >= 0 => Some(Duration::from_millis(ms as u64)),
            other => {
                return Err(StoreError::UnexpectedReply(format!(
                    "PTTL returned {}",
                    other
                )))
            }
        })
    }
}
