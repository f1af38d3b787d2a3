//! Services - client-side logic built on the ports.

mod auth;
mod session_context;

pub use auth::{
    AuthService, NETWORK_MESSAGE, NOT_SIGNED_IN_MESSAGE, STORE_FAILED_MESSAGE, TIMEOUT_MESSAGE,
    endpoints,
};
pub use session_context::SessionContext;
