use std::fmt;

use super::LockError;

/// Name of the resource a lock protects.
///
/// Non-empty by construction; one key identifies one critical section
/// across every process sharing the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockKey(String);

impl LockKey {
    pub fn new(key: impl Into<String>) -> Result<Self, LockError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(LockError::InvalidKey(key));
        }
        Ok(LockKey(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LockKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for LockKey {
    type Error = LockError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        LockKey::new(key)
    }
}

impl TryFrom<String> for LockKey {
    type Error = LockError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        LockKey::new(key)
    }
}
