//! Guarded invocation - run a closure under a distributed lock.
//!
//! `GuardedInvocation` composes a `LockManager` with an arbitrary protected
//! operation. It is the only path application code should use: acquisition
//! is fail-fast, and release happens on every exit path.
//!
//! ## Quick Start
//!
//! ```ignore
//! use kvlock::{GuardedInvocation, InMemoryStore, Invocation, LockManager};
//!
//! let guarded = GuardedInvocation::new(LockManager::new(InMemoryStore::new()));
//! match guarded.run("nightly-report", Duration::from_secs(60), || build_report())? {
//!     Invocation::Completed { value, .. } => publish(value),
//!     Invocation::NotAcquired { .. } => { /* another instance is on it */ }
//! }
//! ```

mod error;
mod guarded_invocation;
mod outcome;

pub use error::GuardError;
pub use guarded_invocation::GuardedInvocation;
pub use outcome::{Invocation, ReleaseOutcome};
