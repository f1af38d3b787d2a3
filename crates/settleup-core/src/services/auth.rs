//! Authentication facade - turns raw transport outcomes into [`AuthResult`]s.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use settleup_shared::ApiResponse;
use settleup_shared::dto::{
    AuthPayload, LoginRequest, ProfilePayload, RegisterRequest, UpdateProfileRequest,
    VerificationCodeRequest, VerifyEmailRequest,
};

use crate::domain::{AuthFailure, AuthResult, AuthState, Field, User};
use crate::error::TransportError;
use crate::ports::{ApiRequest, ApiTransport};
use crate::validation::VerificationCode;

use super::SessionContext;

/// Endpoint paths, relative to the API base URL.
pub mod endpoints {
    pub const REGISTER: &str = "/users/auth/register";
    pub const LOGIN: &str = "/users/auth/login";
    pub const SEND_VERIFICATION_CODE: &str = "/users/auth/send-verification-code";
    pub const VERIFY_EMAIL: &str = "/users/auth/verify-email";
    pub const PROFILE: &str = "/users/profile";
}

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please check your connection.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your internet connection.";
pub const STORE_FAILED_MESSAGE: &str = "Failed to store authentication data";
pub const NOT_SIGNED_IN_MESSAGE: &str = "Not signed in";

/// What the facade needs to know about each call to normalize its failures.
struct Operation {
    name: &'static str,
    default_message: &'static str,
    fields: &'static [Field],
}

const LOGIN: Operation = Operation {
    name: "login",
    default_message: "Login failed",
    fields: &[Field::Email, Field::Password],
};

const REGISTER: Operation = Operation {
    name: "register",
    default_message: "Registration failed",
    fields: &[Field::Name, Field::Email, Field::Password],
};

const SEND_CODE: Operation = Operation {
    name: "request_verification_code",
    default_message: "Failed to send verification code.",
    fields: &[Field::Email],
};

const VERIFY_EMAIL: Operation = Operation {
    name: "confirm_verification_code",
    default_message: "Email verification failed.",
    fields: &[Field::Email, Field::Code],
};

const UPDATE_PROFILE: Operation = Operation {
    name: "update_profile",
    default_message: "Profile update failed",
    fields: &[Field::Name, Field::Avatar],
};

/// The operations the client screens call.
///
/// Every method fails soft: errors come back as values and leave the session
/// in a state from which the user can retry.
pub struct AuthService {
    transport: Arc<dyn ApiTransport>,
    session: Arc<SessionContext>,
}

impl AuthService {
    pub fn new(transport: Arc<dyn ApiTransport>, session: Arc<SessionContext>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Sign in; on success the token and user are stored together.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = match Self::encode(&body, &LOGIN) {
            Ok(body) => ApiRequest::post(endpoints::LOGIN, body),
            Err(failure) => return failure.into(),
        };

        let (user, token) = match self.call_for::<AuthPayload>(request, &LOGIN).await {
            Ok(payload) if payload.token.is_empty() => {
                tracing::warn!("Login response carried an empty token");
                return AuthFailure::local(LOGIN.default_message).into();
            }
            Ok(payload) => (User::from(payload.user), payload.token),
            Err(failure) => return failure.into(),
        };

        if let Err(e) = self.session.write(&token, &user).await {
            tracing::warn!(error = %e, "Login succeeded but the session could not be stored");
            return AuthFailure::local(STORE_FAILED_MESSAGE).into();
        }

        tracing::info!(user_id = %user.id, "Signed in");
        AuthResult::Success { user, token }
    }

    /// Create an account. Does not sign in: the address must be verified and
    /// the user must log in afterwards.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AuthResult {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = match Self::encode(&body, &REGISTER) {
            Ok(body) => ApiRequest::post(endpoints::REGISTER, body),
            Err(failure) => return failure.into(),
        };

        match self.call_for::<AuthPayload>(request, &REGISTER).await {
            Ok(payload) => {
                let user = User::from(payload.user);
                tracing::info!(user_id = %user.id, "Account registered");
                AuthResult::Success {
                    user,
                    token: payload.token,
                }
            }
            Err(failure) => failure.into(),
        }
    }

    /// Ask the server to mail a verification code to `email`.
    pub async fn request_verification_code(&self, email: &str) -> Result<(), AuthFailure> {
        let body = Self::encode(
            &VerificationCodeRequest {
                email: email.to_string(),
            },
            &SEND_CODE,
        )?;
        self.call(ApiRequest::post(endpoints::SEND_VERIFICATION_CODE, body), &SEND_CODE)
            .await
            .map(drop)
    }

    /// Confirm `email` with a code the user typed.
    pub async fn confirm_verification_code(
        &self,
        email: &str,
        code: &VerificationCode,
    ) -> Result<(), AuthFailure> {
        let body = Self::encode(
            &VerifyEmailRequest {
                email: email.to_string(),
                code: code.as_str().to_string(),
            },
            &VERIFY_EMAIL,
        )?;
        self.call(ApiRequest::post(endpoints::VERIFY_EMAIL, body), &VERIFY_EMAIL)
            .await
            .map(drop)
    }

    /// Sign out locally. Never fails: a storage error is logged and the caller
    /// proceeds to the signed-out state regardless.
    pub async fn logout(&self) {
        match self.session.clear().await {
            Ok(()) => tracing::info!("Signed out"),
            Err(e) => tracing::error!(error = %e, "Logout could not clear stored session"),
        }
    }

    /// Update the profile; on success only the cached user changes.
    pub async fn update_profile(&self, update: UpdateProfileRequest) -> AuthResult {
        if update.name.is_none() && update.avatar.is_none() {
            return AuthFailure::local("Nothing to update").into();
        }
        if !self.session.is_authenticated().await {
            return AuthFailure::local(NOT_SIGNED_IN_MESSAGE).into();
        }

        let body = match Self::encode(&update, &UPDATE_PROFILE) {
            Ok(body) => body,
            Err(failure) => return failure.into(),
        };

        let user = match self
            .call_for::<ProfilePayload>(ApiRequest::patch(endpoints::PROFILE, body), &UPDATE_PROFILE)
            .await
        {
            Ok(payload) => User::from(payload.user),
            Err(failure) => return failure.into(),
        };

        match self.session.update_user(&user).await {
            Ok(Some(token)) => AuthResult::Success { user, token },
            Ok(None) => AuthFailure::local(NOT_SIGNED_IN_MESSAGE).into(),
            Err(_) => AuthFailure::local("Failed to store user data").into(),
        }
    }

    pub async fn auth_state(&self) -> AuthState {
        self.session.auth_state().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Like [`call`](Self::call), then decode `data` into `T`. A successful
    /// envelope without usable data counts as a malformed response.
    async fn call_for<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        op: &Operation,
    ) -> Result<T, AuthFailure> {
        let data = self.call(request, op).await?.unwrap_or(serde_json::Value::Null);

        serde_json::from_value::<T>(data).map_err(|e| {
            tracing::warn!(operation = op.name, error = %e, "Response data has unexpected shape");
            AuthFailure::local(op.default_message)
        })
    }

    /// Send `request` and normalize the outcome. Returns the envelope's `data`
    /// when the server reports success.
    async fn call(
        &self,
        request: ApiRequest,
        op: &Operation,
    ) -> Result<Option<serde_json::Value>, AuthFailure> {
        let reply = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(operation = op.name, error = %e, "Request did not complete");
            Self::transport_failure(&e, op)
        })?;

        let envelope = match serde_json::from_str::<ApiResponse<serde_json::Value>>(&reply.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    operation = op.name,
                    status = reply.status,
                    error = %e,
                    "Response is not a valid envelope"
                );
                return Err(AuthFailure::local(op.default_message));
            }
        };

        if envelope.success && reply.is_success() {
            return Ok(envelope.data);
        }

        tracing::debug!(
            operation = op.name,
            status = reply.status,
            errors = envelope.errors.len(),
            "Server rejected request"
        );

        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| op.default_message.to_string());
        Err(AuthFailure::from_server(message, &envelope.errors, op.fields))
    }

    fn encode<T: Serialize>(body: &T, op: &Operation) -> Result<serde_json::Value, AuthFailure> {
        serde_json::to_value(body).map_err(|e| {
            tracing::error!(operation = op.name, error = %e, "Failed to encode request body");
            AuthFailure::local(op.default_message)
        })
    }

    fn transport_failure(error: &TransportError, op: &Operation) -> AuthFailure {
        match error {
            TransportError::Timeout => AuthFailure::local(TIMEOUT_MESSAGE),
            TransportError::Unreachable(_) => AuthFailure::local(NETWORK_MESSAGE),
            TransportError::Malformed(_) | TransportError::Request(_) => {
                AuthFailure::local(op.default_message)
            }
        }
    }
}
