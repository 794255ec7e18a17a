//! Captive portal resubmission.
//!
//! When the user has no active RADIUS session, the validated credentials are
//! re-submitted to the captive portal's own login form so the network device
//! treats the client as freshly authenticated. The portal answers into a
//! hidden frame; a `reply` query parameter on the resulting page signals a
//! rejected login.
//!
//! # Architecture
//!
//! - [`CaptivePortalForm`] - Organization-specific form descriptor (JSON)
//! - [`PortalForm`] - The hidden form armed with credentials
//! - [`PortalSubmitter`] - Async trait submitting the form into the frame
//! - [`HttpPortalSubmitter`] - HTTP implementation of the frame
//! - [`FrameReply`] / [`ReplyOutcome`] - Reply page and its interpretation

mod descriptor;
mod error;
mod form;
mod reply;
mod submitter;

pub use descriptor::{AdditionalField, CaptivePortalForm, DEFAULT_METHOD, FieldMapping};
pub use error::PortalError;
pub use form::{FRAME_TARGET, FormField, PortalForm};
pub use reply::{FrameReply, REPLY_PARAM, ReplyOutcome};
pub use submitter::{HttpPortalSubmitter, PortalSubmitter};

use std::path::Path;

/// Loads a form descriptor from a JSON file.
///
/// # Errors
///
/// Returns an IO error when the file cannot be read, or an
/// [`std::io::ErrorKind::InvalidData`] error when it is not a valid descriptor.
pub fn load_descriptor(path: &Path) -> std::io::Result<CaptivePortalForm> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
