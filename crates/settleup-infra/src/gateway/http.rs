use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use settleup_core::ports::{ApiReply, ApiRequest, ApiTransport, Method};
use settleup_core::{SessionContext, TransportError};

use super::config::GatewayConfig;
use super::interceptors::{BearerTokenInterceptor, Interceptor, SessionExpiryInterceptor};

/// reqwest-backed [`ApiTransport`] with a fixed base URL, a timeout, and a
/// chain of [`Interceptor`]s.
pub struct HttpGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl HttpGateway {
    /// Build a gateway with the bearer-token and session-expiry interceptors
    /// installed.
    pub fn new(config: GatewayConfig, session: Arc<SessionContext>) -> Result<Self, TransportError> {
        Ok(Self::bare(config)?
            .with_interceptor(Arc::new(BearerTokenInterceptor::new(session.clone())))
            .with_interceptor(Arc::new(SessionExpiryInterceptor::new(session))))
    }

    /// A gateway without interceptors.
    pub fn bare(config: GatewayConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("settleup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        tracing::debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "HTTP gateway configured"
        );

        Ok(Self {
            http,
            config,
            interceptors: Vec::new(),
        })
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    fn classify(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() || error.is_request() {
            // No response arrived: refused, reset, or closed mid-request.
            TransportError::Unreachable(error.to_string())
        } else if error.is_body() || error.is_decode() {
            TransportError::Malformed(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl ApiTransport for HttpGateway {
    async fn send(&self, request: ApiRequest) -> Result<ApiReply, TransportError> {
        let url = self.config.url(&request.path);

        let mut builder = match request.method {
            Method::Post => self.http.post(&url),
            Method::Patch => self.http.patch(&url),
        }
        .header(ACCEPT, "application/json");

        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }

        for interceptor in &self.interceptors {
            builder = interceptor.on_request(builder).await;
        }

        tracing::debug!(method = ?request.method, %url, "Sending request");

        let response = builder.send().await.map_err(Self::classify)?;
        let status = response.status();

        for interceptor in &self.interceptors {
            interceptor.on_response(status).await;
        }

        let body = response.text().await.map_err(Self::classify)?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(ApiReply {
            status: status.as_u16(),
            body,
        })
    }
}
