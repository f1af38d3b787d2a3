//! The process-wide session, owned explicitly instead of living in a global.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{AuthState, Session, User};
use crate::error::StorageError;
use crate::ports::SessionStore;

/// Owns the [`SessionStore`] and serializes every mutation of it.
///
/// Built once at start-up with [`SessionContext::open`], shared by `Arc` with
/// the transport and the [`AuthService`](crate::AuthService), and shut down
/// with [`SessionContext::close`]. Reads are not serialized; the store's
/// atomic multi-key writes keep them consistent.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    mutation: Mutex<()>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            mutation: Mutex::new(()),
        }
    }

    /// Create the context and derive the initial auth state from storage.
    pub async fn open(store: Arc<dyn SessionStore>) -> (Self, AuthState) {
        let context = Self::new(store);
        let state = context.auth_state().await;

        tracing::info!(
            authenticated = state.is_authenticated,
            route = ?state.route(),
            "Session context opened"
        );

        (context, state)
    }

    /// Wait for any in-flight mutation to land, then log the final state.
    pub async fn close(&self) {
        let _guard = self.mutation.lock().await;
        let authenticated = match self.store.read().await {
            Ok(session) => session.is_authenticated(),
            Err(_) => false,
        };
        tracing::info!(authenticated, "Session context closed");
    }

    pub async fn read(&self) -> Result<Session, StorageError> {
        self.store.read().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read session");
            e
        })
    }

    /// The stored bearer token, or `None` when signed out or unreadable.
    pub async fn token(&self) -> Option<String> {
        match self.store.read().await {
            Ok(session) => session.token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read token; sending request unauthenticated");
                None
            }
        }
    }

    pub async fn write(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let _guard = self.mutation.lock().await;
        self.store.write(token, user).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to store session");
            e
        })?;
        tracing::debug!(user_id = %user.id, "Session stored");
        Ok(())
    }

    /// Replace the cached user if a session exists. Returns the preserved
    /// token, or `None` (writing nothing) when signed out.
    pub async fn update_user(&self, user: &User) -> Result<Option<String>, StorageError> {
        let _guard = self.mutation.lock().await;

        let session = self.read().await?;
        let Some(token) = session.token.filter(|_| session.user.is_some()) else {
            tracing::debug!("No session to update");
            return Ok(None);
        };

        self.store.update_user(user).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to update cached user");
            e
        })?;
        Ok(Some(token))
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.mutation.lock().await;
        self.store.clear().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to clear session");
            e
        })?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    /// Derive the auth state from what is stored right now.
    pub async fn auth_state(&self) -> AuthState {
        match self.read().await {
            Ok(session) => AuthState::from(session),
            Err(_) => AuthState::signed_out(),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.auth_state().await.is_authenticated
    }
}
