//! Backend gateway for token validation and RADIUS session lookup.
//!
//! Both operations are a single POST with an `application/x-www-form-urlencoded`
//! body carrying the token, against organization-scoped URLs. The caller owns
//! all failure handling; this module only reports what went wrong.
//!
//! # Architecture
//!
//! - [`Backend`] - Async trait the orchestrator calls through
//! - [`HttpBackend`] - `reqwest` implementation against the real endpoints
//! - [`ValidationResponse`] - Token validation payload
//! - [`SessionRecord`] - Opaque RADIUS session record

mod error;
mod http;

pub use error::BackendError;
pub use http::{DEFAULT_SESSIONS_PATH, DEFAULT_VALIDATE_PATH, HttpBackend, ORG_SLUG_PLACEHOLDER};

use async_trait::async_trait;
use serde::Deserialize;

/// Discriminant value the validation endpoint returns for a valid token.
pub const TOKEN_VALIDATION_SUCCESSFUL: &str = "AUTH_TOKEN_VALIDATION_SUCCESSFUL";

/// Payload of the token validation endpoint.
///
/// Only `response_code` is guaranteed; the credential fields are present on
/// success. Unknown keys are ignored.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ValidationResponse {
    /// Discriminant; equals [`TOKEN_VALIDATION_SUCCESSFUL`] on success.
    pub response_code: String,
    /// RADIUS username of the token owner.
    #[serde(default)]
    pub username: Option<String>,
    /// RADIUS password to submit to the captive portal (sensitive).
    #[serde(default)]
    pub radius_user_token: Option<String>,
}

impl ValidationResponse {
    /// Whether the discriminant reports a valid token.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.response_code == TOKEN_VALIDATION_SUCCESSFUL
    }
}

impl std::fmt::Debug for ValidationResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationResponse")
            .field("response_code", &self.response_code)
            .field("username", &self.username)
            .field(
                "radius_user_token",
                &self.radius_user_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// A RADIUS session record; opaque to the core.
pub type SessionRecord = serde_json::Value;

/// Remote calls the orchestrator depends on.
///
/// Implementations report failures; they never invalidate tokens or notify.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Validates `token` for `org_slug`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure, non-2xx status, or a
    /// body that is not a validation payload.
    async fn validate(&self, org_slug: &str, token: &str)
    -> Result<ValidationResponse, BackendError>;

    /// Lists the RADIUS sessions of the token owner.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure, non-2xx status, or a
    /// body that is not a JSON array.
    async fn list_sessions(
        &self,
        org_slug: &str,
        token: &str,
    ) -> Result<Vec<SessionRecord>, BackendError>;
}
