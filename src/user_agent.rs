//! Shared User-Agent string for backend and captive portal HTTP clients.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/portal-status";

/// Default User-Agent for every request this crate makes.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("portal-status/{version} (captive-portal-client; +{PROJECT_UA_URL})")
}
