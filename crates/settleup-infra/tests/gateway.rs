//! Integration tests for the HTTP gateway and the auth flow running over it.
//!
//! Every test talks to a local wiremock server.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use settleup_core::ports::{ApiRequest, ApiTransport};
use settleup_core::services::{NETWORK_MESSAGE, TIMEOUT_MESSAGE};
use settleup_core::{AuthResult, AuthService, SessionContext, TransportError, User};
use settleup_infra::{GatewayConfig, HttpGateway, InMemoryKeyValueStore, KvSessionStore};
use settleup_shared::dto::{AuthPayload, UserResponse};
use settleup_shared::{ApiFieldError, ApiResponse};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn user_response() -> UserResponse {
    UserResponse {
        id: "u1".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "a@b.com".to_string(),
        is_email_verified: true,
        avatar: None,
        created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
    }
}

fn session() -> Arc<SessionContext> {
    let store = KvSessionStore::new(Arc::new(InMemoryKeyValueStore::new()));
    Arc::new(SessionContext::new(Arc::new(store)))
}

fn gateway(server: &MockServer, session: Arc<SessionContext>) -> HttpGateway {
    let config = GatewayConfig::new(format!("{}/api/v1", server.uri()))
        .with_timeout(Duration::from_millis(300));
    HttpGateway::new(config, session).unwrap()
}

#[tokio::test]
async fn test_bearer_token_attached_only_when_signed_in() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/auth/send-verification-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let session = session();
    let gateway = gateway(&server, session.clone());
    let request = ApiRequest::post("/users/auth/send-verification-code", json!({ "email": "a@b.com" }));

    gateway.send(request.clone()).await.unwrap();

    let user = User::from(user_response());
    session.write("abc", &user).await.unwrap();
    gateway.send(request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert!(received[0].headers.get("authorization").is_none());
    assert_eq!(
        received[1].headers.get("authorization").unwrap(),
        "Bearer abc"
    );
}

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/profile"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(ApiResponse::<()>::failure("Token expired")),
        )
        .mount(&server)
        .await;

    let session = session();
    session
        .write("stale", &User::from(user_response()))
        .await
        .unwrap();
    let gateway = gateway(&server, session.clone());

    let reply = gateway
        .send(ApiRequest::patch("/users/profile", json!({ "name": "Grace" })))
        .await
        .unwrap();

    assert_eq!(reply.status, 401);
    assert!(reply.body.contains("Token expired"));
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_timeout_is_distinct_from_unreachable() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let slow = gateway(&server, session());
    let err = slow
        .send(ApiRequest::post("/users/auth/login", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Timeout), "got {err:?}");

    // Nothing listens on port 1.
    let offline = HttpGateway::new(GatewayConfig::new("http://127.0.0.1:1/api/v1"), session()).unwrap();
    let err = offline
        .send(ApiRequest::post("/users/auth/login", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Unreachable(_)), "got {err:?}");
}

#[tokio::test]
async fn test_connection_dropped_before_response_is_unreachable() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    // Accepts the connection, then closes it without answering.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });

    let gateway = HttpGateway::new(GatewayConfig::new(format!("http://{addr}/api/v1")), session()).unwrap();
    let err = gateway
        .send(ApiRequest::post("/users/auth/login", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Unreachable(_)), "got {err:?}");
}

#[tokio::test]
async fn test_login_logout_and_expiry_lifecycle() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ApiResponse::ok_with_message(
            AuthPayload {
                user: user_response(),
                token: "abc".to_string(),
            },
            "Login successful",
        )))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/profile"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(ApiResponse::<()>::failure("Session expired")),
        )
        .mount(&server)
        .await;

    let session = session();
    let auth = AuthService::new(Arc::new(gateway(&server, session.clone())), session);

    // fresh install
    assert!(!auth.is_authenticated().await);

    let result = auth.login("a@b.com", "secret1").await;
    assert!(matches!(result, AuthResult::Success { ref token, .. } if token == "abc"));
    assert!(auth.is_authenticated().await);
    assert_eq!(auth.session().token().await.as_deref(), Some("abc"));

    auth.logout().await;
    assert!(!auth.is_authenticated().await);

    auth.login("a@b.com", "secret1").await;
    assert!(auth.is_authenticated().await);

    let result = auth
        .update_profile(settleup_shared::dto::UpdateProfileRequest {
            name: Some("Grace".to_string()),
            avatar: None,
        })
        .await;
    assert_eq!(result.failure().unwrap().message, "Session expired");
    assert!(!auth.is_authenticated().await);
}

#[tokio::test]
async fn test_register_field_errors_through_gateway() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/auth/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(
                ApiResponse::<()>::failure("Registration failed")
                    .with_error(ApiFieldError::new("email", "Email already registered")),
            ),
        )
        .mount(&server)
        .await;

    let session = session();
    let auth = AuthService::new(Arc::new(gateway(&server, session.clone())), session);

    let result = auth.register("Ada", "a@b.com", "secret1").await;
    let failure = result.failure().unwrap();
    assert_eq!(failure.field(settleup_core::Field::Email), Some("Email already registered"));
    assert!(!auth.is_authenticated().await);
}

#[tokio::test]
async fn test_facade_messages_for_transport_failures() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let session = session();
    let slow = AuthService::new(Arc::new(gateway(&server, session.clone())), session.clone());
    let offline = AuthService::new(
        Arc::new(HttpGateway::new(GatewayConfig::new("http://127.0.0.1:1"), session.clone()).unwrap()),
        session,
    );

    let timeout = slow.request_verification_code("a@b.com").await.unwrap_err();
    let unreachable = offline.request_verification_code("a@b.com").await.unwrap_err();

    assert_eq!(timeout.message, TIMEOUT_MESSAGE);
    assert_eq!(unreachable.message, NETWORK_MESSAGE);
}
