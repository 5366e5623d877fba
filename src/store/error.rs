use std::fmt;

/// Failure talking to the key-value store.
///
/// Every variant means the store could not give a trustworthy answer. It is
/// never used to signal contention: a busy lock is `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Could not open or keep a connection to the store.
    Connection(String),
    /// The round-trip did not complete within the configured timeout.
    Timeout(String),
    /// The store rejected or failed to run a server-side script.
    Script(String),
    /// The store answered with a reply shape the caller did not expect.
    UnexpectedReply(String),
    /// A local synchronization primitive was poisoned by a panicking thread.
    Poisoned(String),
}

impl StoreError {
    /// Whether retrying the same call later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Connection(_) | StoreError::Timeout(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "store connection failed: {}", msg),
            StoreError::Timeout(msg) => write!(f, "store request timed out: {}", msg),
            StoreError::Script(msg) => write!(f, "store script failed: {}", msg),
            StoreError::UnexpectedReply(msg) => write!(f, "unexpected store reply: {}", msg),
            StoreError::Poisoned(msg) => write!(f, "store state poisoned: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
