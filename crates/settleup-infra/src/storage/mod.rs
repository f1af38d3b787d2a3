//! Key-value storage implementations - file on disk, Redis, and in-memory.

mod file;
mod memory;

#[cfg(feature = "redis")]
mod redis;

pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;

#[cfg(feature = "redis")]
pub use redis::{RedisConfig, RedisKeyValueStore};
