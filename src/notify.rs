//! User-visible notifications.
//!
//! Rendering notifications is the host's business; the core only asks for an
//! error or success message to be shown and for the main notification to be
//! dismissed before a new error replaces it.

use std::sync::Mutex;

use tracing::debug;

/// Identifier of the host's main notification slot.
pub const MAIN_NOTIFICATION_ID: &str = "main_toast_id";

/// Generic message shown whenever token validation or session lookup fails.
pub const LOGIN_ERROR: &str = "Login error occurred.";

/// Message shown after an explicit logout.
pub const LOGOUT_SUCCESS: &str = "Logout successful.";

/// Notification sink supplied by the host.
pub trait Notifier: Send + Sync {
    /// Shows an error message.
    fn error(&self, message: &str);

    /// Shows a success message.
    fn success(&self, message: &str);

    /// Dismisses the notification with the given id, if shown.
    fn dismiss(&self, id: &str);
}

/// Severity of a shown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Success,
}

/// A notification as last shown by [`ConsoleNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Terminal notifier: prints to stderr and remembers what is on screen.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    current: Mutex<Option<Notification>>,
}

impl ConsoleNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The notification currently shown, if any.
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        self.current.lock().ok().and_then(|guard| guard.clone())
    }

    fn show(&self, level: Level, message: &str) {
        match level {
            Level::Error => eprintln!("error: {message}"),
            Level::Success => eprintln!("{message}"),
        }
        if let Ok(mut current) = self.current.lock() {
            *current = Some(Notification {
                level,
                message: message.to_string(),
            });
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn error(&self, message: &str) {
        self.show(Level::Error, message);
    }

    fn success(&self, message: &str) {
        self.show(Level::Success, message);
    }

    fn dismiss(&self, id: &str) {
        debug!(id, "dismissing notification");
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}
