//! CLI entry point for portal-status.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use portal_status::portal::load_descriptor;
use portal_status::{
    BrowsingContext, ConsoleNotifier, CookieFileStore, HttpBackend, HttpPortalSubmitter,
    Orchestrator, ReplyOutcome, StatusSnapshot,
};
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::{Settings, load_config};
use cli::{Cli, Command};

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// The activation did not end in a failure.
    Success,
    /// The activation failed or logout could not remove the token.
    Failure,
    /// Missing or invalid configuration.
    Usage,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Usage => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("error: {error:#}");
            return ProcessExit::Usage.into();
        }
    };

    init_tracing(&cli, &settings);
    debug!(?cli, "CLI arguments parsed");

    match run(&cli, &settings).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("error: {error:#}");
            ProcessExit::Usage.into()
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let loaded = load_config(cli.config.as_deref())?;
    Settings::resolve(cli, loaded.config.as_ref())
}

/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > config verbosity.
fn init_tracing(cli: &Cli, settings: &Settings) {
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => settings.verbosity.default_filter(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color_requested())
        .with_env_filter(filter)
        .try_init();
}

fn no_color_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
        || std::env::var("TERM").is_ok_and(|value| value.eq_ignore_ascii_case("dumb"))
}

async fn run(cli: &Cli, settings: &Settings) -> Result<ProcessExit> {
    let orchestrator = build_orchestrator(settings)?;

    match cli.command() {
        Command::Status(args) => {
            let context = if args.embedded {
                BrowsingContext::Embedded
            } else {
                BrowsingContext::TopLevel
            };
            info!(org = %settings.org_slug, "portal-status starting");
            let status = orchestrator.activate(context).await;
            print_status(&status);
            Ok(if status.is_failed() {
                ProcessExit::Failure
            } else {
                ProcessExit::Success
            })
        }
        Command::Logout => match orchestrator.logout() {
            Ok(()) => Ok(ProcessExit::Success),
            Err(error) => {
                eprintln!("error: {error}");
                Ok(ProcessExit::Failure)
            }
        },
    }
}

fn build_orchestrator(settings: &Settings) -> Result<Orchestrator> {
    let backend = HttpBackend::with_paths(
        &settings.base_url,
        settings.validate_path.clone(),
        settings.sessions_path.clone(),
        settings.timeouts,
    )
    .context("Failed to set up backend client")?;
    let submitter = HttpPortalSubmitter::new(settings.timeouts)
        .context("Failed to set up captive portal client")?;

    let orchestrator = Orchestrator::new(
        settings.org_slug.clone(),
        Arc::new(CookieFileStore::new(settings.cookie_file.clone())),
        Arc::new(backend),
        Arc::new(submitter),
        Arc::new(ConsoleNotifier::new()),
    );

    match settings.portal_form.as_deref() {
        Some(path) => Ok(orchestrator.with_portal_form(read_portal_form(path)?)),
        None => Ok(orchestrator),
    }
}

fn read_portal_form(path: &Path) -> Result<portal_status::CaptivePortalForm> {
    load_descriptor(path)
        .with_context(|| format!("Failed to load captive portal form '{}'", path.display()))
}

fn print_status(status: &StatusSnapshot) {
    println!("state: {}", status.state());
    if let Some(credentials) = status.credentials() {
        println!("username: {}", credentials.username());
    }
    println!("sessions: {}", status.sessions().len());
    match status.reply() {
        Some(ReplyOutcome::Accepted) => println!("portal: accepted"),
        Some(ReplyOutcome::NotFoundIgnored(reply)) => {
            println!("portal: ignored reply on 404 page ({reply})");
        }
        Some(ReplyOutcome::Rejected(reply)) => println!("portal: rejected ({reply})"),
        None => {}
    }
    if let Some(failure) = status.failure() {
        println!("failure: {failure}");
    }
}
