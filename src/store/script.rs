//! Server-side scripts used by the lock protocol.
//!
//! Each script is executed by the store as one indivisible operation. Stores
//! with a Lua engine run `source`; stores without one dispatch on `kind` and
//! must provide the same contract under their own serialization.

/// Set the key only if absent, then attach the expiry in the same script.
///
/// `KEYS[1]` = lock key, `ARGV[1]` = token, `ARGV[2]` = ttl in milliseconds.
/// Returns 1 when the lock was taken, 0 when the key already existed.
pub const ACQUIRE_LUA: &str = "if redis.call('setnx', KEYS[1], ARGV[1]) == 1 then \
return redis.call('pexpire', KEYS[1], ARGV[2]) else return 0 end";

/// Delete the key only if it still holds the caller's token.
///
/// `KEYS[1]` = lock key, `ARGV[1]` = token.
/// Returns the number of deleted keys (1), or 0 on mismatch or absence.
pub const RELEASE_LUA: &str = "if redis.call('get', KEYS[1]) == ARGV[1] then \
return redis.call('del', KEYS[1]) else return 0 end";

/// Which lock contract a script implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    /// Compare-and-expire acquire: see [`ACQUIRE_LUA`].
    Acquire,
    /// Compare-and-delete release: see [`RELEASE_LUA`].
    Release,
}

/// A named server-side script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script {
    kind: ScriptKind,
    source: &'static str,
}

impl Script {
    pub const ACQUIRE: Script = Script {
        kind: ScriptKind::Acquire,
        source: ACQUIRE_LUA,
    };

    pub const RELEASE: Script = Script {
        kind: ScriptKind::Release,
        source: RELEASE_LUA,
    };

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn source(&self) -> &'static str {
        self.source
    }
}
