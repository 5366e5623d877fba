//! Lock primitives: keys, tokens, handles, the manager and its scoped guard.

mod error;
mod guard;
mod handle;
mod key;
mod lock_manager;
mod token;

pub use error::LockError;
pub use guard::LockGuard;
pub use handle::LockHandle;
pub use key::LockKey;
pub use lock_manager::LockManager;
pub use token::LockToken;
