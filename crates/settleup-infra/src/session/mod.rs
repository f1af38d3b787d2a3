//! Session store implementations.

mod kv;

pub use kv::{KvSessionStore, TOKEN_KEY, USER_KEY};
