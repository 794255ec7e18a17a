//! Orchestrator states and the snapshot handed to the presentation layer.

use std::fmt;

use thiserror::Error;

use crate::backend::SessionRecord;
use crate::portal::ReplyOutcome;

/// Activation state machine.
///
/// `Idle -> Validating -> Validated -> FetchingSessions -> Ready -> AutoSubmitting`,
/// with `Failed` reachable from `Validating`, `FetchingSessions` and
/// `AutoSubmitting`. `Idle` is terminal when running embedded in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Idle,
    Validating,
    Validated,
    FetchingSessions,
    Ready,
    AutoSubmitting,
    Failed,
}

impl AuthState {
    /// Stable lowercase label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Validated => "validated",
            Self::FetchingSessions => "fetching-sessions",
            Self::Ready => "ready",
            Self::AutoSubmitting => "auto-submitting",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the host is the top-level browsing context or embedded in a frame.
///
/// Resubmission from an embedded context would loop forever when the status
/// page is itself the portal's redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsingContext {
    TopLevel,
    Embedded,
}

impl BrowsingContext {
    #[must_use]
    pub fn is_top_level(self) -> bool {
        self == Self::TopLevel
    }
}

/// Credentials recovered from a successful token validation. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The RADIUS user token submitted as the portal password (sensitive).
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Why an activation ended in [`AuthState::Failed`].
///
/// All kinds are handled the same way: token invalidated, one notification
/// shown, cause logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// Validation discriminant mismatch, missing token, or malformed payload.
    #[error("auth token invalid: {reason}")]
    TokenInvalid { reason: String },

    /// Network or HTTP failure on a backend call.
    #[error("backend unreachable: {reason}")]
    TransportFailure { reason: String },

    /// The captive portal answered the resubmission with a `reply`.
    #[error("captive portal rejected login: {reply}")]
    PortalRejected { reply: String },
}

impl AuthFailure {
    pub(crate) fn token_invalid(reason: impl Into<String>) -> Self {
        Self::TokenInvalid {
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(reason: impl Into<String>) -> Self {
        Self::TransportFailure {
            reason: reason.into(),
        }
    }
}

/// Immutable view of one activation, threaded through the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    state: AuthState,
    credentials: Option<Credentials>,
    sessions: Vec<SessionRecord>,
    failure: Option<AuthFailure>,
    reply: Option<ReplyOutcome>,
}

impl StatusSnapshot {
    /// A fresh snapshot in [`AuthState::Idle`].
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Credentials, present once validation succeeded.
    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// RADIUS sessions; empty until fetched.
    #[must_use]
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    #[must_use]
    pub fn failure(&self) -> Option<&AuthFailure> {
        self.failure.as_ref()
    }

    /// How the portal answered the resubmission, if one happened.
    #[must_use]
    pub fn reply(&self) -> Option<&ReplyOutcome> {
        self.reply.as_ref()
    }

    /// The "proceed" signal of token validation.
    #[must_use]
    pub fn may_proceed(&self) -> bool {
        self.state == AuthState::Validated && self.credentials.is_some()
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state == AuthState::Failed
    }

    pub(super) fn with_state(mut self, state: AuthState) -> Self {
        self.state = state;
        self
    }

    pub(super) fn validated(mut self, credentials: Credentials) -> Self {
        self.state = AuthState::Validated;
        self.credentials = Some(credentials);
        self
    }

    pub(super) fn ready(mut self, sessions: Vec<SessionRecord>) -> Self {
        self.state = AuthState::Ready;
        self.sessions = sessions;
        self
    }

    pub(super) fn with_reply(mut self, reply: ReplyOutcome) -> Self {
        self.reply = Some(reply);
        self
    }

    pub(super) fn failed(mut self, failure: AuthFailure) -> Self {
        self.state = AuthState::Failed;
        self.failure = Some(failure);
        self
    }
}
