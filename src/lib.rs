//! Portal Status Core Library
//!
//! This library implements the status/login flow of a captive portal client:
//! it re-validates a previously issued session token, looks up the user's
//! RADIUS sessions, and when none is active silently re-submits the user's
//! credentials to the captive portal's own login form.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`session`] - Token storage keyed by organization (`{org}_auth_token`)
//! - [`backend`] - Token validation and session listing endpoints
//! - [`portal`] - Captive portal form descriptor, form arming, reply interpretation
//! - [`notify`] - User-visible notification sink
//! - [`orchestrator`] - The activation state machine tying everything together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
mod http_client;
pub mod notify;
pub mod orchestrator;
pub mod portal;
pub mod session;
mod user_agent;

// Re-export commonly used types
pub use backend::{Backend, BackendError, HttpBackend, SessionRecord, ValidationResponse};
pub use http_client::{ClientBuildError, HttpTimeouts};
pub use notify::{ConsoleNotifier, LOGIN_ERROR, LOGOUT_SUCCESS, MAIN_NOTIFICATION_ID, Notifier};
pub use orchestrator::{
    AuthFailure, AuthState, BrowsingContext, Credentials, Orchestrator, StatusSnapshot,
};
pub use portal::{
    CaptivePortalForm, FrameReply, HttpPortalSubmitter, PortalError, PortalForm,
    PortalSubmitter, ReplyOutcome,
};
pub use session::{
    CookieFileStore, MemoryTokenStore, SessionError, TokenStore, token_cookie_name,
};
