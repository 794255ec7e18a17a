//! Session token storage.
//!
//! The auth token issued after a successful captive portal login is kept in a
//! client-side cookie jar under the key `{org_slug}_auth_token`. The core only
//! ever reads the token or removes it; issuing tokens happens elsewhere.

mod cookie_file;
mod error;
mod memory;

pub use cookie_file::{CookieFileStore, CookieLine, parse_netscape_cookies};
pub use error::SessionError;
pub use memory::MemoryTokenStore;

/// Suffix appended to the organization slug to form the token cookie name.
const TOKEN_COOKIE_SUFFIX: &str = "_auth_token";

/// Returns the cookie name holding the auth token for an organization.
///
/// ```
/// assert_eq!(portal_status::token_cookie_name("default"), "default_auth_token");
/// ```
#[must_use]
pub fn token_cookie_name(org_slug: &str) -> String {
    format!("{org_slug}{TOKEN_COOKIE_SUFFIX}")
}

/// Persistent storage for organization-scoped auth tokens.
///
/// Implementations must treat token values as secrets and never log them.
pub trait TokenStore: Send + Sync {
    /// Reads the token stored for `org_slug`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the backing storage cannot be read.
    fn get(&self, org_slug: &str) -> Result<Option<String>, SessionError>;

    /// Removes the token stored for `org_slug`. Removing an absent token is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the backing storage cannot be updated.
    fn remove(&self, org_slug: &str) -> Result<(), SessionError>;
}
