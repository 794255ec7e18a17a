//! Interpretation of the page the captive portal answers with.

use url::Url;

/// Query parameter the portal uses to report a login failure.
pub const REPLY_PARAM: &str = "reply";

/// Title substring marking a non-authoritative error page.
const NOT_FOUND_MARKER: &str = "404";

/// Where the hidden frame ended up after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReply {
    /// Final URL of the frame document.
    pub url: String,
    /// Title of the frame document (empty if it has none).
    pub title: String,
}

/// What a frame reply means for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// No `reply` parameter: the portal accepted the credentials or showed its
    /// normal gateway page.
    Accepted,
    /// A `reply` on a page titled with "404"; ignored.
    NotFoundIgnored(String),
    /// The portal rejected the login; carries the user-facing reply text.
    Rejected(String),
}

impl FrameReply {
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    /// The decoded `reply` query value, if present and non-empty.
    ///
    /// An unparseable URL is treated as carrying no reply.
    #[must_use]
    pub fn reply(&self) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == REPLY_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    /// Classifies the reply.
    #[must_use]
    pub fn outcome(&self) -> ReplyOutcome {
        match self.reply() {
            None => ReplyOutcome::Accepted,
            // TODO: confirm against portal server docs that 404-titled reply pages are benign redirects.
            Some(reply) if self.title.contains(NOT_FOUND_MARKER) => {
                ReplyOutcome::NotFoundIgnored(reply)
            }
            Some(reply) => ReplyOutcome::Rejected(reply),
        }
    }
}
