//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Re-validate a captive-portal login and restore the RADIUS session.
///
/// portal-status checks the stored auth token against the backend, looks up
/// the user's RADIUS sessions and, when none is active, silently re-submits
/// the credentials to the captive portal's login form.
#[derive(Parser, Debug)]
#[command(name = "portal-status")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/portal-status/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. https://wifi.example.com
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Organization slug
    #[arg(long = "org", value_name = "SLUG", global = true)]
    pub org_slug: Option<String>,

    /// Netscape-format cookie file holding the auth token
    #[arg(long, value_name = "PATH", global = true)]
    pub cookie_file: Option<PathBuf>,

    /// JSON captive portal form descriptor
    #[arg(long, value_name = "PATH", global = true)]
    pub portal_form: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate the token, list sessions and re-login if needed (default)
    Status(StatusArgs),
    /// Invalidate the stored auth token
    Logout,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusArgs {
    /// Behave as if running inside a frame (no activation)
    #[arg(long)]
    pub embedded: bool,
}

impl Cli {
    /// The subcommand to run; `status` when none was given.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Status(StatusArgs::default()))
    }
}
