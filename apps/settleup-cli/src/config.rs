//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use settleup_infra::GatewayConfig;

/// Where the session is persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// JSON document at the given path.
    File(PathBuf),
    /// Redis, configured from `REDIS_*` variables.
    Redis,
    /// Process memory; the session is gone when the command exits.
    Memory,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub storage: StorageBackend,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let storage = match env::var("SETTLEUP_STORAGE")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            Ok("memory") => StorageBackend::Memory,
            Ok("redis") => StorageBackend::Redis,
            Ok("file") | Err(_) => StorageBackend::File(Self::session_file()),
            Ok(other) => {
                tracing::warn!(backend = %other, "Unknown SETTLEUP_STORAGE; using file storage");
                StorageBackend::File(Self::session_file())
            }
        };

        Self {
            gateway: GatewayConfig::from_env(),
            storage,
        }
    }

    /// `$SETTLEUP_HOME`, else `~/.config/settleup`, else `./.settleup`.
    pub fn settleup_home() -> PathBuf {
        if let Ok(home) = env::var("SETTLEUP_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("settleup"))
            .unwrap_or_else(|| PathBuf::from(".settleup"))
    }

    pub fn session_file() -> PathBuf {
        Self::settleup_home().join("session.json")
    }
}
