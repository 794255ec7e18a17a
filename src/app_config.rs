//! Application configuration loading and CLI override merging.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use portal_status::HttpTimeouts;
use portal_status::backend::{DEFAULT_SESSIONS_PATH, DEFAULT_VALIDATE_PATH};

use crate::cli::Cli;

const APP_DIR: &str = "portal-status";
const CONFIG_FILE: &str = "config.toml";
const COOKIE_FILE: &str = "cookies.txt";

/// Line-oriented file configuration for portal-status defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Backend base URL.
    pub base_url: Option<String>,
    /// Organization slug.
    pub org_slug: Option<String>,
    /// Netscape cookie file holding the auth token.
    pub cookie_file: Option<PathBuf>,
    /// JSON captive portal form descriptor.
    pub portal_form: Option<PathBuf>,
    /// Token validation path template (`{orgSlug}` placeholder).
    pub validate_path: Option<String>,
    /// Session listing path template (`{orgSlug}` placeholder).
    pub sessions_path: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout for backend calls; portal submission has none.
    pub read_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = self.base_url.as_deref()
            && url::Url::parse(base_url).is_err()
        {
            bail!("Invalid config value for `base_url`: '{base_url}' is not an absolute URL");
        }
        if let Some(org_slug) = self.org_slug.as_deref()
            && org_slug.trim().is_empty()
        {
            bail!("Invalid config value for `org_slug`: must not be empty");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerbositySetting {
    #[default]
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Tracing filter directive used when neither `RUST_LOG` nor a CLI flag decides.
    #[must_use]
    pub fn default_filter(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves the per-user application directory.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/portal-status`
/// 2. `$HOME/.config/portal-status`
#[must_use]
pub fn resolve_app_dir() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join(APP_DIR))
}

#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    resolve_app_dir().map(|dir| dir.join(CONFIG_FILE))
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit` if given, otherwise from the default path if present.
///
/// An explicit path that does not exist is an error; a missing default file is not.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("Config file '{}' does not exist", path.display());
        }
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };
    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let string_value = || {
            parse_string_literal(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_number}"))
        };
        let integer_value = || {
            parse_integer_u64(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_number}"))
        };

        match key {
            "base_url" => cfg.base_url = Some(string_value()?),
            "org_slug" => cfg.org_slug = Some(string_value()?),
            "cookie_file" => cfg.cookie_file = Some(PathBuf::from(string_value()?)),
            "portal_form" => cfg.portal_form = Some(PathBuf::from(string_value()?)),
            "validate_path" => cfg.validate_path = Some(string_value()?),
            "sessions_path" => cfg.sessions_path = Some(string_value()?),
            "connect_timeout_secs" => cfg.connect_timeout_secs = Some(integer_value()?),
            "read_timeout_secs" => cfg.read_timeout_secs = Some(integer_value()?),
            "verbosity" => {
                let parsed = string_value()?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

/// Effective settings after merging CLI flags over the file config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub org_slug: String,
    pub cookie_file: PathBuf,
    pub portal_form: Option<PathBuf>,
    pub validate_path: String,
    pub sessions_path: String,
    pub timeouts: HttpTimeouts,
    pub verbosity: VerbositySetting,
}

impl Settings {
    /// Merges `cli` over `file`; CLI values win.
    ///
    /// # Errors
    ///
    /// Fails when the backend URL or organization slug is missing after
    /// merging, or when no cookie file can be located.
    pub fn resolve(cli: &Cli, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let Some(base_url) = cli.base_url.clone().or(file.base_url) else {
            bail!("No backend URL configured: pass --base-url or set `base_url` in the config file");
        };
        url::Url::parse(&base_url)
            .with_context(|| format!("Invalid backend URL '{base_url}'"))?;

        let Some(org_slug) = cli.org_slug.clone().or(file.org_slug) else {
            bail!("No organization configured: pass --org or set `org_slug` in the config file");
        };
        if org_slug.trim().is_empty() {
            bail!("Organization slug must not be empty");
        }

        let cookie_file = match cli.cookie_file.clone().or(file.cookie_file) {
            Some(path) => path,
            None => resolve_app_dir()
                .map(|dir| dir.join(COOKIE_FILE))
                .context("No cookie file configured and no home directory to default to")?,
        };

        let defaults = HttpTimeouts::default();
        Ok(Self {
            base_url,
            org_slug,
            cookie_file,
            portal_form: cli.portal_form.clone().or(file.portal_form),
            validate_path: file
                .validate_path
                .unwrap_or_else(|| DEFAULT_VALIDATE_PATH.to_string()),
            sessions_path: file
                .sessions_path
                .unwrap_or_else(|| DEFAULT_SESSIONS_PATH.to_string()),
            timeouts: HttpTimeouts {
                connect_secs: file.connect_timeout_secs.unwrap_or(defaults.connect_secs),
                read_secs: file.read_timeout_secs.unwrap_or(defaults.read_secs),
            },
            verbosity: file.verbosity.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
base_url = "https://wifi.example.com"
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.base_url.as_deref(), Some("https://wifi.example.com"));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.org_slug.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
base_url = "http://localhost:8000"
org_slug = "default"
cookie_file = "/var/lib/portal/cookies.txt"
portal_form = "/etc/portal/form.json"
validate_path = "/api/{orgSlug}/validate"
sessions_path = "/api/{orgSlug}/sessions"
connect_timeout_secs = 5
read_timeout_secs = 60
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.org_slug.as_deref(), Some("default"));
        assert_eq!(
            cfg.cookie_file,
            Some(PathBuf::from("/var/lib/portal/cookies.txt"))
        );
        assert_eq!(cfg.portal_form, Some(PathBuf::from("/etc/portal/form.json")));
        assert_eq!(cfg.validate_path.as_deref(), Some("/api/{orgSlug}/validate"));
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.read_timeout_secs, Some(60));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r##"
org_slug = "default" # tenant
base_url = "http://portal.lan/#ignored" # fragment kept inside quotes
"##,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.org_slug.as_deref(), Some("default"));
        assert_eq!(cfg.base_url.as_deref(), Some("http://portal.lan/#ignored"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err = parse_config_str("read_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("org_slug = default").expect_err("unquoted string expected");
        assert!(err.to_string().contains("org_slug"));
    }

    #[test]
    fn test_parse_config_rejects_relative_base_url() {
        let err = parse_config_str(r#"base_url = "wifi.example.com""#)
            .expect_err("relative base url expected");
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("\norg_slug").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_verbosity_default_filter() {
        assert_eq!(VerbositySetting::Default.default_filter(), "info");
        assert_eq!(VerbositySetting::Quiet.default_filter(), "error");
        assert_eq!(VerbositySetting::Debug.as_str(), "debug");
    }

    #[test]
    fn test_load_config_explicit_missing_file_fails() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let err = load_config(Some(&dir.path().join("absent.toml")))
            .expect_err("missing explicit config expected");
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_config_explicit_file() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "org_slug = \"default\"\n").expect("write config");
        let loaded = load_config(Some(&path)).expect("config should load");
        assert_eq!(loaded.path, Some(path));
        assert_eq!(
            loaded.config.and_then(|c| c.org_slug).as_deref(),
            Some("default")
        );
    }

    #[test]
    fn test_settings_cli_overrides_file() {
        let cli = Cli::try_parse_from([
            "portal-status",
            "--org",
            "campus",
            "--cookie-file",
            "/tmp/jar.txt",
        ])
        .expect("cli should parse");
        let file = FileConfig {
            base_url: Some("http://backend.lan".to_string()),
            org_slug: Some("default".to_string()),
            read_timeout_secs: Some(90),
            verbosity: Some(VerbositySetting::Quiet),
            ..FileConfig::default()
        };

        let settings = Settings::resolve(&cli, Some(&file)).expect("settings should resolve");

        assert_eq!(settings.base_url, "http://backend.lan");
        assert_eq!(settings.org_slug, "campus");
        assert_eq!(settings.cookie_file, PathBuf::from("/tmp/jar.txt"));
        assert_eq!(settings.validate_path, DEFAULT_VALIDATE_PATH);
        assert_eq!(settings.timeouts.read_secs, 90);
        assert_eq!(settings.verbosity, VerbositySetting::Quiet);
    }

    #[test]
    fn test_settings_missing_org_is_error() {
        let cli = Cli::try_parse_from(["portal-status", "--base-url", "http://backend.lan"])
            .expect("cli should parse");
        let err = Settings::resolve(&cli, None).expect_err("missing org expected");
        assert!(err.to_string().contains("organization"));
    }

    #[test]
    fn test_settings_missing_base_url_is_error() {
        let cli = Cli::try_parse_from(["portal-status", "--org", "default"])
            .expect("cli should parse");
        let err = Settings::resolve(&cli, None).expect_err("missing base url expected");
        assert!(err.to_string().contains("backend URL"));
    }
}
