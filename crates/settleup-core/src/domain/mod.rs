//! Domain entities - the core client-side objects.

mod auth_result;
mod session;
mod user;

pub use auth_result::{AuthFailure, AuthResult, Field};
pub use session::{AuthState, Route, Session};
pub use user::User;
