use async_trait::async_trait;

use crate::domain::{Session, User};
use crate::error::StorageError;

/// Durable persistence of the [`Session`] across restarts.
///
/// Implementations do not order concurrent mutations; go through
/// [`SessionContext`](crate::SessionContext) when ordering matters.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The last written session. Corrupt or half-present data reads as
    /// [`Session::empty`]; only an unreachable backend is an error.
    async fn read(&self) -> Result<Session, StorageError>;

    /// Persist token and user as a single unit.
    async fn write(&self, token: &str, user: &User) -> Result<(), StorageError>;

    /// Replace the cached user, keeping the token.
    async fn update_user(&self, user: &User) -> Result<(), StorageError>;

    /// Remove both halves. Clearing an empty session succeeds.
    async fn clear(&self) -> Result<(), StorageError>;
}
