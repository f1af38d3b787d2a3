//! Cross-cutting hooks run around every gateway request.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};

use settleup_core::SessionContext;

/// A hook into the gateway's request/response cycle.
///
/// Interceptors run in installation order. `on_response` runs before the
/// reply is handed back to the caller.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn on_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }

    async fn on_response(&self, _status: StatusCode) {}
}

/// Attaches the stored token as a bearer credential. Requests go out
/// unauthenticated when there is none; the server decides what needs one.
pub struct BearerTokenInterceptor {
    session: Arc<SessionContext>,
}

impl BearerTokenInterceptor {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Interceptor for BearerTokenInterceptor {
    async fn on_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Clears the session when the server rejects the presented credential.
pub struct SessionExpiryInterceptor {
    session: Arc<SessionContext>,
}

impl SessionExpiryInterceptor {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Interceptor for SessionExpiryInterceptor {
    async fn on_response(&self, status: StatusCode) {
        if status != StatusCode::UNAUTHORIZED {
            return;
        }

        tracing::warn!("Server rejected credentials; clearing session");
        // SessionContext logs the storage error; the 401 still reaches the caller.
        let _ = self.session.clear().await;
    }
}
