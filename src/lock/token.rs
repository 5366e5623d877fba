use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Per-acquisition proof of ownership.
///
/// Generated tokens are `{pid}-{seq}-{uuid}`: the process id and a
/// process-wide counter make tokens unique within a host, and the random
/// v4 UUID makes collisions across hosts negligible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockToken(String);

impl LockToken {
    /// A fresh token. Never returns the same value twice in one process.
    pub fn generate() -> Self {
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        LockToken(format!(
            "{}-{}-{}",
            std::process::id(),
            seq,
            Uuid::new_v4().simple()
        ))
    }

    /// Wrap a caller-supplied token, e.g. one read back from a peer.
    pub fn new(token: impl Into<String>) -> Self {
        LockToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LockToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
