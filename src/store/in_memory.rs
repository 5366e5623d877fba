//! InMemoryStore - HashMap-backed store for testing and single-process use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::{KeyValueStore, Script, ScriptKind, StoreError};

/// Internal stored representation of a value.
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory key-value store with per-key expiry.
///
/// Every command, scripts included, runs inside a single mutex critical
/// section, which gives the same all-or-nothing visibility a single-threaded
/// store server provides. Expired keys are treated as absent on access.
///
/// Clone-friendly via Arc: clones share the same storage, so each clone can
/// stand in for a separate client process in tests.
#[derive(Clone)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| e.is_live(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Poisoned("in-memory store".into()))
    }

    /// Drop `key` if its expiry has passed, then return the live entry.
    fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a Entry> {
        let now = Instant::now();
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        entries.get(key)
    }

    fn insert_with_ttl(
        entries: &mut HashMap<String, Entry>,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> bool {
        if Self::live(entries, key).is_some() {
            return false;
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        true
    }
}

fn script_arg<'a>(values: &[&'a str], index: usize, what: &str) -> Result<&'a str, StoreError> {
    values
        .get(index)
        .copied()
        .ok_or_else(|| StoreError::Script(format!("missing {} {}", what, index + 1)))
}

impl KeyValueStore for InMemoryStore {
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut entries = self.entries()?;
        Ok(Self::insert_with_ttl(&mut entries, key, value, ttl))
    }

    fn eval(
        &self,
        script: &Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<Option<i64>, StoreError> {
        let key = script_arg(keys, 0, "key")?;
        let token = script_arg(args, 0, "arg")?;

        let mut entries = self.entries()?;
        match script.kind() {
            ScriptKind::Acquire => {
                let ttl_ms: u64 = script_arg(args, 1, "arg")?
                    .parse()
                    .map_err(|_| StoreError::Script("ttl is not an integer".into()))?;
                let created = Self::insert_with_ttl(
                    &mut entries,
                    key,
                    token,
                    Duration::from_millis(ttl_ms),
                );
                Ok(Some(i64::from(created)))
            }
            ScriptKind::Release => {
                let owned = Self::live(&mut entries, key).is_some_and(|e| e.value == token);
                if owned {
                    entries.remove(key);
                }
                Ok(Some(i64::from(owned)))
            }
        }
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries()?;
        Ok(Self::live(&mut entries, key).map(|e| e.value.clone()))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries()?;
        let existed = Self::live(&mut entries, key).is_some();
        entries.remove(key);
        Ok(existed)
    }

    fn pttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut entries = self.entries()?;
        let now = Instant::now();
        Ok(Self::live(&mut entries, key).map(|e| match e.expires_at {
            Some(at) => at.saturating_duration_since(now),
            None => Duration::MAX,
        }))
    }
}
