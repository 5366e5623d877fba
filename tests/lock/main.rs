//! Distributed lock integration tests.
//!
//! Each `LockManager` built over a clone of one `InMemoryStore` stands in for
//! a separate process sharing the same store:
//! - Acquire/release protocol and TTL expiry
//! - Concurrent acquire storms (mutual exclusion)
//! - The non-atomic release race, reproduced deterministically
//! - Guarded invocation across success, error, panic and store failure

mod contention;
mod protocol;
mod unsafe_release;
#[cfg(feature = "redis")]
mod redis_store;
