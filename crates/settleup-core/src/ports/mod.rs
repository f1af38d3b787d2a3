//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod session;
mod storage;
mod transport;

pub use session::SessionStore;
pub use storage::KeyValueStore;
pub use transport::{ApiReply, ApiRequest, ApiTransport, Method};
