//! # Settle Up Infrastructure
//!
//! Concrete implementations of the ports defined in `settleup-core`:
//! key-value storage backends, the session store built on them, and the
//! HTTP gateway to the Settle Up API.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, file and in-memory storage only
//! - `redis` - Redis-backed key-value storage

pub mod gateway;
pub mod session;
pub mod storage;

// Re-exports
pub use gateway::{GatewayConfig, HttpGateway};
pub use session::KvSessionStore;
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};

#[cfg(feature = "redis")]
pub use storage::{RedisConfig, RedisKeyValueStore};
