//! Key-value store boundary for the lock protocol.
//!
//! The lock is only as correct as the atomic primitives underneath it. This
//! module defines the narrow capability interface the protocol is written
//! against, the server-side scripts it runs, and two backends.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                KeyValueStore                  │
//! │  set_if_absent / eval / get / delete / pttl   │
//! └───────────────────────────────────────────────┘
//!             │                       │
//!             ▼                       ▼
//!    ┌────────────────┐     ┌──────────────────┐
//!    │ InMemoryStore  │     │    RedisStore    │
//!    │   (included)   │     │ (feature "redis")│
//!    └────────────────┘     └──────────────────┘
//! ```

mod error;
mod in_memory;
#[cfg(feature = "redis")]
mod redis;
mod script;
mod store;

pub use error::StoreError;
pub use in_memory::InMemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
pub use script::{Script, ScriptKind, ACQUIRE_LUA, RELEASE_LUA};
pub use store::KeyValueStore;
