//! Authentication re-validation and silent re-login orchestration.
//!
//! [`Orchestrator::activate`] runs once per status page load:
//!
//! 1. Validate the stored token against the backend.
//! 2. On success, list the user's RADIUS sessions.
//! 3. When the list is empty, re-submit the credentials to the captive portal
//!    and interpret its reply.
//!
//! Every failure is handled locally: the token is invalidated, a single
//! notification is shown, and the cause is logged. Nothing is retried.
//!
//! Dropping the future returned by `activate` abandons the activation; no
//! further state is mutated, although an in-flight request is not aborted on
//! the server side.

mod state;

pub use state::{AuthFailure, AuthState, BrowsingContext, Credentials, StatusSnapshot};

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::backend::{Backend, BackendError};
use crate::notify::{LOGIN_ERROR, LOGOUT_SUCCESS, MAIN_NOTIFICATION_ID, Notifier};
use crate::portal::{CaptivePortalForm, FrameReply, PortalForm, PortalSubmitter, ReplyOutcome};
use crate::session::{SessionError, TokenStore};

/// Drives one organization's status/login flow.
pub struct Orchestrator {
    org_slug: String,
    store: Arc<dyn TokenStore>,
    backend: Arc<dyn Backend>,
    submitter: Arc<dyn PortalSubmitter>,
    notifier: Arc<dyn Notifier>,
    portal_form: Option<CaptivePortalForm>,
}

impl Orchestrator {
    /// Creates an orchestrator without a captive portal form.
    ///
    /// Without a form the flow stops at [`AuthState::Ready`]; configure one
    /// with [`Orchestrator::with_portal_form`].
    #[must_use]
    pub fn new(
        org_slug: impl Into<String>,
        store: Arc<dyn TokenStore>,
        backend: Arc<dyn Backend>,
        submitter: Arc<dyn PortalSubmitter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            org_slug: org_slug.into(),
            store,
            backend,
            submitter,
            notifier,
            portal_form: None,
        }
    }

    #[must_use]
    pub fn with_portal_form(mut self, form: CaptivePortalForm) -> Self {
        self.portal_form = Some(form);
        self
    }

    /// Runs the whole activation and returns its terminal snapshot.
    ///
    /// When `context` is [`BrowsingContext::Embedded`] nothing happens and the
    /// snapshot stays [`AuthState::Idle`].
    #[instrument(skip(self), fields(org = %self.org_slug))]
    pub async fn activate(&self, context: BrowsingContext) -> StatusSnapshot {
        let status = StatusSnapshot::idle();
        if !context.is_top_level() {
            info!("running inside a frame; skipping activation");
            return status;
        }

        let status = self.validate_token(status).await;
        if !status.may_proceed() {
            return status;
        }

        let status = self.fetch_sessions(status).await;
        if status.state() != AuthState::Ready {
            return status;
        }

        if !status.sessions().is_empty() {
            info!(
                sessions = status.sessions().len(),
                "active RADIUS session found; no resubmission needed"
            );
            return status;
        }

        self.auto_submit(status, context).await
    }

    /// Validates the stored token and records the credentials it yields.
    ///
    /// The returned snapshot's [`StatusSnapshot::may_proceed`] is the proceed
    /// signal: true only when the discriminant matched and the payload carried
    /// both a username and a RADIUS user token. Otherwise the token has been
    /// invalidated and the user notified.
    #[instrument(skip(self, status), fields(org = %self.org_slug))]
    pub async fn validate_token(&self, status: StatusSnapshot) -> StatusSnapshot {
        let status = status.with_state(AuthState::Validating);

        let token = match self.store.get(&self.org_slug) {
            Ok(Some(token)) => token,
            Ok(None) => {
                return self.fail(status, AuthFailure::token_invalid("no auth token stored"));
            }
            Err(error) => {
                return self.fail(
                    status,
                    AuthFailure::token_invalid(format!("auth token unreadable: {error}")),
                );
            }
        };

        let response = match self.backend.validate(&self.org_slug, &token).await {
            Ok(response) => response,
            Err(error @ BackendError::Decode { .. }) => {
                return self.fail(status, AuthFailure::token_invalid(error.to_string()));
            }
            Err(error) => {
                return self.fail(status, AuthFailure::transport(error.to_string()));
            }
        };

        if !response.is_successful() {
            return self.fail(
                status,
                AuthFailure::token_invalid(format!(
                    "unexpected response_code '{}'",
                    response.response_code
                )),
            );
        }

        let (Some(username), Some(password)) = (response.username, response.radius_user_token)
        else {
            return self.fail(
                status,
                AuthFailure::token_invalid("validation payload lacks username or radius_user_token"),
            );
        };

        debug!(username = %username, "auth token validated");
        status.validated(Credentials::new(username, password))
    }

    /// Fetches the user's RADIUS sessions.
    ///
    /// Does nothing unless `status` carries a successful validation. On
    /// failure the previous (empty) session list is kept.
    #[instrument(skip(self, status), fields(org = %self.org_slug))]
    pub async fn fetch_sessions(&self, status: StatusSnapshot) -> StatusSnapshot {
        if !status.may_proceed() {
            debug!(state = %status.state(), "session lookup skipped without a validated token");
            return status;
        }
        let status = status.with_state(AuthState::FetchingSessions);

        let token = match self.store.get(&self.org_slug) {
            Ok(Some(token)) => token,
            Ok(None) => {
                return self.fail(status, AuthFailure::token_invalid("auth token disappeared"));
            }
            Err(error) => {
                return self.fail(
                    status,
                    AuthFailure::token_invalid(format!("auth token unreadable: {error}")),
                );
            }
        };

        match self.backend.list_sessions(&self.org_slug, &token).await {
            Ok(sessions) => {
                debug!(sessions = sessions.len(), "RADIUS sessions fetched");
                status.ready(sessions)
            }
            Err(error) => self.fail(status, AuthFailure::transport(error.to_string())),
        }
    }

    /// Re-submits the credentials to the captive portal and interprets its reply.
    async fn auto_submit(&self, status: StatusSnapshot, context: BrowsingContext) -> StatusSnapshot {
        if !context.is_top_level() {
            return status;
        }
        let Some(descriptor) = self.portal_form.as_ref() else {
            info!("no captive portal form configured; skipping resubmission");
            return status;
        };
        let Some(credentials) = status.credentials() else {
            return status;
        };

        let form = PortalForm::arm(credentials, descriptor);
        let status = status.with_state(AuthState::AutoSubmitting);
        info!(action = %form.action(), fields = form.fields().len(), "re-submitting credentials to captive portal");

        match self.submitter.submit(&form).await {
            Ok(reply) => self.handle_reply(status, &reply),
            Err(error) => {
                // A frame that never delivers a reply page cannot report a rejection.
                warn!(error = %error, "captive portal resubmission produced no reply");
                status
            }
        }
    }

    /// Interprets the page the hidden frame landed on after resubmission.
    ///
    /// A `reply` on a page whose title does not contain "404" invalidates the
    /// token and shows the reply text; anything else leaves the session alone.
    #[instrument(skip(self, status, reply), fields(org = %self.org_slug, url = %reply.url))]
    pub fn handle_reply(&self, status: StatusSnapshot, reply: &FrameReply) -> StatusSnapshot {
        let outcome = reply.outcome();
        match &outcome {
            ReplyOutcome::Accepted => {
                info!("captive portal accepted resubmission");
                status.with_reply(outcome)
            }
            ReplyOutcome::NotFoundIgnored(text) => {
                debug!(reply = %text, title = %reply.title, "ignoring reply on 404 page");
                status.with_reply(outcome)
            }
            ReplyOutcome::Rejected(text) => {
                let failure = AuthFailure::PortalRejected {
                    reply: text.clone(),
                };
                let message = text.clone();
                self.fail_with_message(status.with_reply(outcome), failure, &message)
            }
        }
    }

    /// Handles the presentation layer's logout intent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the token cannot be removed; no success
    /// notification is shown in that case.
    #[instrument(skip(self), fields(org = %self.org_slug))]
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(&self.org_slug)?;
        info!("logged out");
        self.notifier.success(LOGOUT_SUCCESS);
        Ok(())
    }

    fn fail(&self, status: StatusSnapshot, failure: AuthFailure) -> StatusSnapshot {
        self.fail_with_message(status, failure, LOGIN_ERROR)
    }

    fn fail_with_message(
        &self,
        status: StatusSnapshot,
        failure: AuthFailure,
        message: &str,
    ) -> StatusSnapshot {
        warn!(state = %status.state(), cause = %failure, "activation failed; invalidating auth token");
        if let Err(error) = self.store.remove(&self.org_slug) {
            error!(error = %error, "failed to invalidate auth token");
        }
        self.notifier.dismiss(MAIN_NOTIFICATION_ID);
        self.notifier.error(message);
        status.failed(failure)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("org_slug", &self.org_slug)
            .field("portal_form", &self.portal_form)
            .finish_non_exhaustive()
    }
}
