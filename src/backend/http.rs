//! `reqwest` implementation of the backend gateway.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::http_client::{HttpTimeouts, build_http_client};

use super::{Backend, BackendError, SessionRecord, ValidationResponse};

/// Placeholder replaced by the organization slug in path templates.
pub const ORG_SLUG_PLACEHOLDER: &str = "{orgSlug}";

/// Default token validation path template.
pub const DEFAULT_VALIDATE_PATH: &str = "/api/v1/{orgSlug}/account/token/validate/";

/// Default RADIUS session listing path template.
pub const DEFAULT_SESSIONS_PATH: &str = "/api/v1/{orgSlug}/account/session/";

/// Backend gateway talking to the organization-scoped HTTP endpoints.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    validate_path: String,
    sessions_path: String,
}

impl HttpBackend {
    /// Creates a gateway with the default path templates.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, BackendError> {
        Self::with_paths(base_url, DEFAULT_VALIDATE_PATH, DEFAULT_SESSIONS_PATH, timeouts)
    }

    /// Creates a gateway with custom path templates.
    ///
    /// Templates may contain [`ORG_SLUG_PLACEHOLDER`] and are resolved against
    /// `base_url` with standard URL joining rules.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn with_paths(
        base_url: &str,
        validate_path: impl Into<String>,
        sessions_path: impl Into<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BackendError::invalid_url(base_url, e.to_string()))?;
        Ok(Self {
            client: build_http_client("backend", timeouts)?,
            base_url,
            validate_path: validate_path.into(),
            sessions_path: sessions_path.into(),
        })
    }

    /// Builds the endpoint URL for `template` and `org_slug`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidUrl`] when the joined URL is invalid.
    pub fn endpoint(&self, template: &str, org_slug: &str) -> Result<Url, BackendError> {
        let path = template.replace(ORG_SLUG_PLACEHOLDER, org_slug);
        self.base_url
            .join(&path)
            .map_err(|e| BackendError::invalid_url(path, e.to_string()))
    }

    /// POSTs `token=<value>` to `url` and decodes the JSON body.
    async fn post_token<T: DeserializeOwned>(&self, url: Url, token: &str) -> Result<T, BackendError> {
        let response = self
            .client
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| BackendError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::http_status(url.as_str(), status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::network(url.as_str(), e))?;
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "backend response");
        serde_json::from_slice(&body).map_err(|e| BackendError::decode(url.as_str(), e.to_string()))
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .field("validate_path", &self.validate_path)
            .field("sessions_path", &self.sessions_path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, token), fields(org = %org_slug))]
    async fn validate(
        &self,
        org_slug: &str,
        token: &str,
    ) -> Result<ValidationResponse, BackendError> {
        let url = self.endpoint(&self.validate_path, org_slug)?;
        self.post_token(url, token).await
    }

    #[instrument(skip(self, token), fields(org = %org_slug))]
    async fn list_sessions(
        &self,
        org_slug: &str,
        token: &str,
    ) -> Result<Vec<SessionRecord>, BackendError> {
        let url = self.endpoint(&self.sessions_path, org_slug)?;
        self.post_token(url, token).await
    }
}
