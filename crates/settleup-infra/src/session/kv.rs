//! Session store on top of any [`KeyValueStore`].

use std::sync::Arc;

use async_trait::async_trait;

use settleup_core::ports::{KeyValueStore, SessionStore};
use settleup_core::{Session, StorageError, User};

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user_data";

/// Keeps the token and the JSON-encoded user under two keys, always written
/// and removed together through the store's multi-key operations.
pub struct KvSessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvSessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    fn encode_user(user: &User) -> Result<String, StorageError> {
        serde_json::to_string(user).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for KvSessionStore {
    async fn read(&self) -> Result<Session, StorageError> {
        let mut values = self.kv.multi_get(&[TOKEN_KEY, USER_KEY]).await?.into_iter();
        let token = values.next().flatten();
        let raw_user = values.next().flatten();

        let user = raw_user.and_then(|raw| match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user record is corrupt; treating session as empty");
                None
            }
        });

        let session = Session { token, user };
        if !session.is_empty() && !session.is_authenticated() {
            tracing::debug!("Stored session is incomplete; treating it as empty");
        }
        Ok(session.normalized())
    }

    async fn write(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let user = Self::encode_user(user)?;
        self.kv
            .multi_set(&[(TOKEN_KEY, token), (USER_KEY, user.as_str())])
            .await
    }

    async fn update_user(&self, user: &User) -> Result<(), StorageError> {
        let user = Self::encode_user(user)?;
        self.kv.multi_set(&[(USER_KEY, user.as_str())]).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.kv.multi_remove(&[TOKEN_KEY, USER_KEY]).await
    }
}
