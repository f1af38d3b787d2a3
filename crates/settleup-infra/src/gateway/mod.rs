//! HTTP gateway - the single configured transport to the Settle Up API.

mod config;
mod http;
mod interceptors;

pub use config::GatewayConfig;
pub use http::HttpGateway;
pub use interceptors::{BearerTokenInterceptor, Interceptor, SessionExpiryInterceptor};
