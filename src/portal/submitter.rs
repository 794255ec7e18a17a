//! Submission of the armed form into the hidden frame.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http_client::{HttpTimeouts, build_connect_only_http_client};

use super::{FrameReply, PortalError, PortalForm};

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<title[^>]*>(.*?)</title>"));

/// Compiles a regex from a static pattern; panics only on a bug in the pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Submits an armed form and reports where the hidden frame landed.
///
/// The browser implementation of this is a hidden form targeting a hidden
/// iframe; the reply is read from the iframe's location and document title
/// once its load event fires.
#[async_trait]
pub trait PortalSubmitter: Send + Sync {
    /// Submits `form` and waits for the resulting frame document.
    ///
    /// No whole-request timeout is applied; a stalled portal keeps the frame waiting.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError`] when the form cannot be submitted at all.
    async fn submit(&self, form: &PortalForm) -> Result<FrameReply, PortalError>;
}

/// Frame stand-in that performs the form submission over HTTP.
///
/// GET forms carry their fields in the query string, replacing any query the
/// action already has; every other verb sends a urlencoded body. Redirects are followed like a browser frame would, and the
/// reply is read from the final URL and the final page's `<title>`.
#[derive(Debug, Clone)]
pub struct HttpPortalSubmitter {
    client: Client,
}

impl HttpPortalSubmitter {
    /// Only `timeouts.connect_secs` is applied; a connected request never times out.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, PortalError> {
        Ok(Self {
            client: build_connect_only_http_client("portal", timeouts)?,
        })
    }
}

#[async_trait]
impl PortalSubmitter for HttpPortalSubmitter {
    #[instrument(skip(self, form), fields(action = %form.action(), method = %form.method(), frame = form.target()))]
    async fn submit(&self, form: &PortalForm) -> Result<FrameReply, PortalError> {
        if form.action().is_empty() {
            return Err(PortalError::MissingAction);
        }
        let mut action = Url::parse(form.action()).map_err(|e| PortalError::InvalidAction {
            action: form.action().to_string(),
            reason: e.to_string(),
        })?;
        let method = Method::from_bytes(form.method().to_ascii_uppercase().as_bytes())
            .map_err(|_| PortalError::InvalidMethod(form.method().to_string()))?;

        let pairs = form.pairs();
        let request = if method == Method::GET {
            // A browser builds a GET form's query from the fields alone.
            action.set_query(None);
            self.client.get(action).query(&pairs)
        } else {
            self.client.request(method, action).form(&pairs)
        };

        let response = request
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| PortalError::network(form.action(), e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let title = match response.text().await {
            Ok(html) => extract_title(&html),
            Err(error) => {
                warn!(error = %error, "portal reply body could not be read; assuming no title");
                String::new()
            }
        };

        debug!(status, url = %final_url, title = %title, "portal frame loaded");
        Ok(FrameReply::new(final_url, title))
    }
}

/// Extracts the trimmed text of the first `<title>` element.
fn extract_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
