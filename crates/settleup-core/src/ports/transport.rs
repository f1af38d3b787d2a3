use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP methods the auth endpoints use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Patch,
}

/// An outgoing JSON request, relative to the transport's base endpoint.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Whatever the server answered, error statuses included.
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The single configured connection to the remote service.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Send a request. Returns `Ok` for any HTTP response; `Err` only when no
    /// response arrived (timeout, connection failure) or it could not be read.
    async fn send(&self, request: ApiRequest) -> Result<ApiReply, TransportError>;
}
