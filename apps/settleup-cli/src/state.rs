//! Application state - the wired-up session, gateway and auth service.

use std::sync::Arc;

use anyhow::Context;

use settleup_core::ports::KeyValueStore;
use settleup_core::{AuthService, SessionContext};
use settleup_infra::{FileKeyValueStore, HttpGateway, InMemoryKeyValueStore, KvSessionStore};

#[cfg(feature = "redis")]
use settleup_infra::RedisKeyValueStore;

use crate::config::{AppConfig, StorageBackend};

/// Everything a command needs.
pub struct AppState {
    pub session: Arc<SessionContext>,
    pub auth: AuthService,
}

impl AppState {
    /// Build the application state with the configured storage backend.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let kv = Self::storage(&config.storage).await;

        let (session, initial) = SessionContext::open(Arc::new(KvSessionStore::new(kv))).await;
        let session = Arc::new(session);

        let gateway = HttpGateway::new(config.gateway.clone(), session.clone())
            .context("Failed to build HTTP client")?;
        let auth = AuthService::new(Arc::new(gateway), session.clone());

        tracing::debug!(
            base_url = %config.gateway.base_url,
            route = ?initial.route(),
            "Application state initialized"
        );

        Ok(Self { session, auth })
    }

    /// Release the session context once no more commands will run.
    pub async fn shutdown(&self) {
        self.session.close().await;
    }

    async fn storage(backend: &StorageBackend) -> Arc<dyn KeyValueStore> {
        match backend {
            StorageBackend::File(path) => {
                tracing::debug!(path = %path.display(), "Using file session storage");
                Arc::new(FileKeyValueStore::new(path.clone()))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory session storage; the session ends with this process");
                Arc::new(InMemoryKeyValueStore::new())
            }
            StorageBackend::Redis => Self::redis_storage().await,
        }
    }

    #[cfg(feature = "redis")]
    async fn redis_storage() -> Arc<dyn KeyValueStore> {
        match RedisKeyValueStore::from_env().await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}. Using file storage.", e);
                Arc::new(FileKeyValueStore::new(AppConfig::session_file()))
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn redis_storage() -> Arc<dyn KeyValueStore> {
        tracing::warn!("Built without redis feature - using file storage");
        Arc::new(FileKeyValueStore::new(AppConfig::session_file()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn test_redis_backend_without_feature_uses_file_storage() {
        let kv = AppState::storage(&StorageBackend::Redis).await;
        assert!(kv.get("auth_token").await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_backend_starts_signed_out() {
        let config = AppConfig {
            gateway: settleup_infra::GatewayConfig::default(),
            storage: StorageBackend::Memory,
        };

        let state = AppState::new(&config).await.unwrap();
        assert!(!state.auth.is_authenticated().await);
        state.shutdown().await;
    }
}
