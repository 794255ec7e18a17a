//! Shared HTTP client construction policy.
//!
//! Both the backend gateway and the captive portal submitter build their
//! `reqwest` clients here so timeout, user-agent, compression and proxy
//! behavior stay consistent.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::user_agent;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Connect and read timeouts for the shared clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout in seconds.
    pub connect_secs: u64,
    /// Whole-request timeout in seconds; ignored by connect-only clients.
    pub read_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// Client construction failed.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// `reqwest` rejected the builder configuration.
    #[error("HTTP client construction failed for {client}: {source}")]
    Build {
        /// Which client was being built (for diagnostics only).
        client: &'static str,
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Querying system proxy settings panicked, even on the fallback path.
    #[error("HTTP client construction panicked for {client}")]
    Panic {
        /// Which client was being built.
        client: &'static str,
    },
}

/// Deadlines applied by a built client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClientPolicy {
    connect_secs: u64,
    /// Whole-request deadline; `None` lets a stalled request wait indefinitely.
    read_secs: Option<u64>,
}

impl From<HttpTimeouts> for ClientPolicy {
    fn from(timeouts: HttpTimeouts) -> Self {
        Self {
            connect_secs: timeouts.connect_secs,
            read_secs: Some(timeouts.read_secs),
        }
    }
}

/// Builds an HTTP client using the shared policy.
///
/// `client_name` is used only for error messages and logging.
///
/// # Errors
///
/// Returns [`ClientBuildError`] when client construction fails.
pub(crate) fn build_http_client(
    client_name: &'static str,
    timeouts: HttpTimeouts,
) -> Result<Client, ClientBuildError> {
    build_with_policy(client_name, ClientPolicy::from(timeouts))
}

/// Builds a client with a connect timeout but no whole-request deadline.
///
/// Used for the captive portal frame: a stalled portal reply is never timed out.
///
/// # Errors
///
/// Returns [`ClientBuildError`] when client construction fails.
pub(crate) fn build_connect_only_http_client(
    client_name: &'static str,
    timeouts: HttpTimeouts,
) -> Result<Client, ClientBuildError> {
    build_with_policy(
        client_name,
        ClientPolicy {
            connect_secs: timeouts.connect_secs,
            read_secs: None,
        },
    )
}

fn build_with_policy(
    client_name: &'static str,
    policy: ClientPolicy,
) -> Result<Client, ClientBuildError> {
    match try_build_client(policy, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic when querying system proxy
            // settings. The fallback keeps env-proxy support without the lookup.
            warn!(
                client = client_name,
                "HTTP client hit system proxy panic; using env-proxy fallback builder"
            );
            match try_build_client(policy, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(ClientBuildError::Panic {
                    client: client_name,
                }),
                Err(BuildClientFailure::Build(source)) => Err(ClientBuildError::Build {
                    client: client_name,
                    source,
                }),
            }
        }
        Err(BuildClientFailure::Build(source)) => Err(ClientBuildError::Build {
            client: client_name,
            source,
        }),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    policy: ClientPolicy,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(policy);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(policy: ClientPolicy) -> ClientBuilder {
    let builder = Client::builder()
        .connect_timeout(Duration::from_secs(policy.connect_secs))
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        // Portal login pages hand out their own session cookies across redirects.
        .cookie_store(true);
    match policy.read_secs {
        Some(read_secs) => builder.timeout(Duration::from_secs(read_secs)),
        None => builder,
    }
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
