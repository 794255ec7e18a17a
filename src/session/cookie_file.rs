//! Netscape cookie file token store.
//!
//! Parses the Netscape HTTP cookie file format (7 TAB-separated fields per line)
//! as written by browsers, browser extensions and `curl -c`, and exposes the
//! `{org}_auth_token` cookie through [`TokenStore`].

use std::fmt;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, instrument, warn};

use super::{SessionError, TokenStore, token_cookie_name};

/// Prefix curl uses to mark `HttpOnly` cookies; such lines are data, not comments.
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// A single parsed cookie from a Netscape-format cookie file.
///
/// The value field is redacted in Debug output to prevent accidental logging
/// of the auth token.
#[derive(Clone)]
pub struct CookieLine {
    /// The domain the cookie belongs to (e.g., `.example.com`).
    pub domain: String,
    /// Whether subdomains should match.
    pub tailmatch: bool,
    /// The URL path scope for the cookie.
    pub path: String,
    /// Whether the cookie should only be sent over HTTPS.
    pub secure: bool,
    /// Unix timestamp for expiry (0 = session cookie).
    pub expires: u64,
    /// Cookie name.
    pub name: String,
    /// Cookie value. Sensitive; never logged.
    value: String,
}

impl CookieLine {
    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive; do not log the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the cookie carries an expiry that is already in the past.
    #[must_use]
    pub fn is_expired_at(&self, now_unix: u64) -> bool {
        self.expires != 0 && self.expires <= now_unix
    }
}

impl fmt::Debug for CookieLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieLine")
            .field("domain", &self.domain)
            .field("tailmatch", &self.tailmatch)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("expires", &self.expires)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Result of parsing a cookie file: parsed cookies and skipped-line warnings.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Successfully parsed cookies, in file order.
    pub cookies: Vec<CookieLine>,
    /// Warnings for malformed lines (line number and reason).
    pub warnings: Vec<(usize, String)>,
}

/// Parses a Netscape-format cookie file from a buffered reader.
///
/// Lines starting with `#` (other than curl's `#HttpOnly_` marker) and blank
/// lines are skipped. Malformed lines are collected as warnings.
///
/// # Errors
///
/// Returns [`SessionError::Io`] when reading fails.
pub fn parse_netscape_cookies(
    reader: impl BufRead,
    source: &Path,
) -> Result<ParseResult, SessionError> {
    let mut result = ParseResult::default();

    for (idx, line_result) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line_result.map_err(|e| SessionError::io(source, e))?;
        let Some(data) = cookie_data(&line) else {
            continue;
        };

        match parse_cookie_line(data, line_number) {
            Ok(cookie) => result.cookies.push(cookie),
            Err(e) => {
                warn!(line = line_number, reason = %e, "skipping malformed cookie line");
                result.warnings.push((line_number, e.to_string()));
            }
        }
    }

    Ok(result)
}

/// Returns the cookie payload of a line, or `None` for blank and comment lines.
fn cookie_data(line: &str) -> Option<&str> {
    // Handle CRLF: strip trailing \r
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }
    if let Some(rest) = line.strip_prefix(HTTP_ONLY_PREFIX) {
        return Some(rest);
    }
    if line.starts_with('#') {
        return None;
    }
    Some(line)
}

fn parse_cookie_line(line: &str, line_number: usize) -> Result<CookieLine, SessionError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 7 {
        return Err(SessionError::invalid_line(
            line_number,
            format!("expected 7 TAB-separated fields, found {}", fields.len()),
        ));
    }

    let expires = fields[4].parse::<u64>().map_err(|_| {
        SessionError::invalid_line(
            line_number,
            format!(
                "expires field must be a non-negative integer, got '{}'",
                fields[4]
            ),
        )
    })?;

    if fields[5].is_empty() {
        return Err(SessionError::invalid_line(
            line_number,
            "cookie name field is empty",
        ));
    }

    Ok(CookieLine {
        domain: fields[0].to_string(),
        tailmatch: parse_bool_field(fields[1], "tailmatch", line_number)?,
        path: fields[2].to_string(),
        secure: parse_bool_field(fields[3], "secure", line_number)?,
        expires,
        name: fields[5].to_string(),
        value: fields[6].to_string(),
    })
}

fn parse_bool_field(value: &str, field_name: &str, line_number: usize) -> Result<bool, SessionError> {
    match value {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(SessionError::invalid_line(
            line_number,
            format!("{field_name} field must be TRUE or FALSE, got '{value}'"),
        )),
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Token store backed by a Netscape cookie file on disk.
///
/// A missing file reads as "no token". Removal rewrites the file without the
/// token cookie, keeping comments and unrelated cookies untouched.
#[derive(Debug, Clone)]
pub struct CookieFileStore {
    path: PathBuf,
}

impl CookieFileStore {
    /// Creates a store over the given cookie file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The cookie file this store reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_cookies(&self) -> Result<Option<ParseResult>, SessionError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::io(&self.path, e)),
        };
        parse_netscape_cookies(BufReader::new(file), &self.path).map(Some)
    }
}

impl TokenStore for CookieFileStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn get(&self, org_slug: &str) -> Result<Option<String>, SessionError> {
        let Some(parsed) = self.read_cookies()? else {
            debug!("cookie file does not exist");
            return Ok(None);
        };

        let name = token_cookie_name(org_slug);
        let now = now_unix();
        let token = parsed
            .cookies
            .iter()
            .filter(|cookie| cookie.name == name)
            .find(|cookie| {
                if cookie.is_expired_at(now) {
                    debug!(domain = %cookie.domain, "ignoring expired token cookie");
                    return false;
                }
                true
            })
            .map(|cookie| cookie.value().to_string());

        debug!(found = token.is_some(), cookie = %name, "token lookup");
        Ok(token)
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn remove(&self, org_slug: &str) -> Result<(), SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(SessionError::io(&self.path, e)),
        };

        let name = token_cookie_name(org_slug);
        let mut removed = 0_usize;
        let mut kept = String::with_capacity(raw.len());
        // Kept lines are copied with their original terminators.
        for line in raw.split_inclusive('\n') {
            let is_token = cookie_data(line)
                .and_then(|data| data.split('\t').nth(5))
                .is_some_and(|cookie_name| cookie_name == name);
            if is_token {
                removed += 1;
                continue;
            }
            kept.push_str(line);
        }

        if removed == 0 {
            return Ok(());
        }

        // Write a sibling file and rename so a crash never leaves a truncated jar.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, kept).map_err(|e| SessionError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| SessionError::io(&self.path, e))?;
        debug!(removed, cookie = %name, "token cookie removed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &str) -> ParseResult {
        parse_netscape_cookies(Cursor::new(input.as_bytes()), Path::new("test")).unwrap()
    }

    fn store_with(contents: &str) -> (tempfile::TempDir, CookieFileStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, CookieFileStore::new(path))
    }

    #[test]
    fn test_parse_netscape_cookies_valid_file() {
        let result = parse(
            "# Netscape HTTP Cookie File\n\
             .example.com\tTRUE\t/\tFALSE\t0\tdefault_auth_token\tabc123\n\
             wifi.example.com\tFALSE\t/path\tTRUE\t1700000000\tother\txyz789\n",
        );
        assert_eq!(result.cookies.len(), 2);
        assert!(result.warnings.is_empty());
        assert_eq!(result.cookies[0].name, "default_auth_token");
        assert_eq!(result.cookies[0].value(), "abc123");
        assert!(result.cookies[1].secure);
        assert_eq!(result.cookies[1].expires, 1_700_000_000);
    }

    #[test]
    fn test_parse_netscape_cookies_accepts_curl_http_only_marker() {
        let result = parse("#HttpOnly_.example.com\tTRUE\t/\tTRUE\t0\tdefault_auth_token\tabc\n");
        assert_eq!(result.cookies.len(), 1);
        assert_eq!(result.cookies[0].domain, ".example.com");
    }

    #[test]
    fn test_parse_netscape_cookies_malformed_lines_reported_with_line_numbers() {
        let result = parse(
            "# header\n\
             .good.com\tTRUE\t/\tFALSE\t0\tname\tvalue\n\
             bad line without tabs\n\
             .good.com\tMAYBE\t/\tFALSE\t0\tname\tvalue\n",
        );
        assert_eq!(result.cookies.len(), 1);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].0, 3);
        assert!(result.warnings[1].1.contains("TRUE or FALSE"));
    }

    #[test]
    fn test_cookie_line_debug_redacts_value() {
        let result = parse(".example.com\tTRUE\t/\tFALSE\t0\tdefault_auth_token\tsecret-token\n");
        let debug = format!("{:?}", result.cookies[0]);
        assert!(!debug.contains("secret-token"), "value leaked: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_cookie_file_store_get_returns_org_token() {
        let (_dir, store) = store_with(
            ".example.com\tTRUE\t/\tFALSE\t0\tother_auth_token\tnope\n\
             .example.com\tTRUE\t/\tFALSE\t0\tdefault_auth_token\ttok-1\n",
        );
        assert_eq!(store.get("default").unwrap().as_deref(), Some("tok-1"));
        assert_eq!(store.get("other").unwrap().as_deref(), Some("nope"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_cookie_file_store_get_skips_expired_token() {
        let (_dir, store) =
            store_with(".example.com\tTRUE\t/\tFALSE\t1\tdefault_auth_token\tstale\n");
        assert_eq!(store.get("default").unwrap(), None);
    }

    #[test]
    fn test_cookie_file_store_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = CookieFileStore::new(dir.path().join("absent.txt"));
        assert_eq!(store.get("default").unwrap(), None);
        assert!(store.remove("default").is_ok());
    }

    #[test]
    fn test_cookie_file_store_remove_keeps_other_lines() {
        let (_dir, store) = store_with(
            "# Netscape HTTP Cookie File\n\
             .example.com\tTRUE\t/\tFALSE\t0\tdefault_auth_token\ttok-1\n\
             .example.com\tTRUE\t/\tFALSE\t0\tcsrftoken\tkeep-me\n",
        );
        store.remove("default").unwrap();

        assert_eq!(store.get("default").unwrap(), None);
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.starts_with("# Netscape HTTP Cookie File\n"));
        assert!(contents.contains("csrftoken\tkeep-me"));
        assert!(!contents.contains("tok-1"));
    }

    #[test]
    fn test_cookie_file_store_remove_preserves_crlf_line_endings() {
        let (_dir, store) = store_with(
            "# Netscape HTTP Cookie File\r\n\
             .example.com\tTRUE\t/\tFALSE\t0\tcsrftoken\tkeep-me\r\n\
             .example.com\tTRUE\t/\tFALSE\t0\tdefault_auth_token\ttok-1\r\n\
             #HttpOnly_.example.com\tTRUE\t/\tFALSE\t0\tsessionid\ts-1\r\n",
        );
        store.remove("default").unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            contents,
            "# Netscape HTTP Cookie File\r\n\
             .example.com\tTRUE\t/\tFALSE\t0\tcsrftoken\tkeep-me\r\n\
             #HttpOnly_.example.com\tTRUE\t/\tFALSE\t0\tsessionid\ts-1\r\n"
        );
    }
}
