//! Error types for captive portal resubmission.

use thiserror::Error;

use crate::http_client::ClientBuildError;

/// Errors that keep a resubmission from producing a frame reply.
#[derive(Debug, Error)]
pub enum PortalError {
    /// The descriptor has no submission URL.
    #[error("captive portal form has no action URL")]
    MissingAction,

    /// The descriptor's action is not a valid absolute URL.
    #[error("invalid captive portal action {action}: {reason}")]
    InvalidAction {
        /// The offending action value.
        action: String,
        /// Parser error text.
        reason: String,
    },

    /// The descriptor's method is not a valid HTTP verb.
    #[error("invalid captive portal form method '{0}'")]
    InvalidMethod(String),

    /// Network-level error reaching the portal.
    #[error("network error submitting to {action}: {source}")]
    Network {
        /// The portal action URL.
        action: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error(transparent)]
    ClientBuild(#[from] ClientBuildError),
}

impl PortalError {
    /// Creates a network error from a reqwest error.
    pub fn network(action: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            action: action.into(),
            source,
        }
    }
}
