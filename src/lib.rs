//! Distributed mutual-exclusion lock over a shared key-value store.
//!
//! - [`LockManager`]: atomic acquire (`SET NX` with TTL, or the acquire
//!   script) and atomic compare-and-delete release.
//! - [`GuardedInvocation`]: acquire, run a closure, release on every exit path.
//! - [`KeyValueStore`]: the narrow store capability the protocol needs, with
//!   [`InMemoryStore`] included and `RedisStore` behind the `redis` feature.
//!
//! This is a best-effort advisory lock. It does not fence against a holder
//! that keeps working after its TTL elapsed.

mod config;
mod guarded;
#[cfg(feature = "http")]
pub mod http;
mod lock;
pub mod store;

pub use config::{AcquireMode, ConfigError, LockConfig, RedisStoreConfig};
pub use guarded::{GuardError, GuardedInvocation, Invocation, ReleaseOutcome};
pub use lock::{LockError, LockGuard, LockHandle, LockKey, LockManager, LockToken};
#[cfg(feature = "redis")]
pub use store::RedisStore;
pub use store::{InMemoryStore, KeyValueStore, Script, ScriptKind, StoreError};
