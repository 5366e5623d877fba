//! Configuration for lock managers and store backends.
//!
//! Both config types deserialize with serde and fall back to defaults for
//! missing fields, so a partial JSON document or a sparse environment is
//! enough.

use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which store primitive `try_lock` uses to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireMode {
    /// Single atomic `SET key token NX PX ttl` command.
    #[default]
    SetIfAbsent,
    /// Server-side acquire script (set-if-absent then expire, as one unit).
    Script,
}

impl std::str::FromStr for AcquireMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "set_if_absent" | "setnx" => Ok(AcquireMode::SetIfAbsent),
            "script" | "lua" => Ok(AcquireMode::Script),
            other => Err(ConfigError::Invalid {
                field: "acquire_mode",
                message: format!("unknown acquire mode {:?}", other),
            }),
        }
    }
}

/// Lock manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Namespace prepended to every lock key in the store.
    pub key_prefix: String,
    /// TTL used by `GuardedInvocation::run_default`.
    pub default_ttl_ms: u64,
    pub acquire_mode: AcquireMode,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            key_prefix: "lock:".to_string(),
            default_ttl_ms: 1_000_000,
            acquire_mode: AcquireMode::SetIfAbsent,
        }
    }
}

impl LockConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_acquire_mode(mut self, mode: AcquireMode) -> Self {
        self.acquire_mode = mode;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_ttl_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "default_ttl_ms",
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `KVLOCK_KEY_PREFIX`, `KVLOCK_DEFAULT_TTL_MS` and
    /// `KVLOCK_ACQUIRE_MODE`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(prefix) = lookup("KVLOCK_KEY_PREFIX") {
            config.key_prefix = prefix;
        }
        if let Some(ttl) = lookup("KVLOCK_DEFAULT_TTL_MS") {
            config.default_ttl_ms = parse_millis("default_ttl_ms", &ttl)?;
        }
        if let Some(mode) = lookup("KVLOCK_ACQUIRE_MODE") {
            config.acquire_mode = mode.parse()?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Connection settings for the Redis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisStoreConfig {
    pub url: String,
    pub connect_timeout_ms: u64,
    /// Read and write timeout applied to every command round-trip.
    pub command_timeout_ms: u64,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/".to_string(),
            connect_timeout_ms: 2_000,
            command_timeout_ms: 2_000,
        }
    }
}

impl RedisStoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms.max(1))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read `REDIS_URL`, `KVLOCK_REDIS_CONNECT_TIMEOUT_MS` and
    /// `KVLOCK_REDIS_COMMAND_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(url) = env::var("REDIS_URL") {
            config.url = url;
        }
        if let Ok(ms) = env::var("KVLOCK_REDIS_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = parse_millis("connect_timeout_ms", &ms)?;
        }
        if let Ok(ms) = env::var("KVLOCK_REDIS_COMMAND_TIMEOUT_MS") {
            config.command_timeout_ms = parse_millis("command_timeout_ms", &ms)?;
        }
        Ok(config)
    }
}

fn parse_millis(field: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        field,
        message: format!("{:?} is not a whole number of milliseconds", raw),
    })
}

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be parsed.
    Parse(String),
    /// A field holds a value outside its allowed range.
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid { field, message } => {
                write!(f, "invalid config field {}: {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
