//! The hidden login form the resubmitter posts to the captive portal.

use std::fmt;

use crate::orchestrator::Credentials;

use super::CaptivePortalForm;

/// Name of the hidden frame the form targets.
pub const FRAME_TARGET: &str = "portal-auth-frame";

/// A single read-only form field.
#[derive(Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// Values may hold the RADIUS password.
impl fmt::Debug for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormField")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// A login form armed with credentials, ready to submit into the hidden frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalForm {
    method: String,
    action: String,
    target: &'static str,
    fields: Vec<FormField>,
}

impl PortalForm {
    /// Populates the form from validated credentials and the portal descriptor.
    ///
    /// Produces the username field, the password field, then one field per
    /// `additional_fields` entry in order (duplicates kept). Unmapped
    /// credential field names become empty strings.
    #[must_use]
    pub fn arm(credentials: &Credentials, descriptor: &CaptivePortalForm) -> Self {
        let mut fields = Vec::with_capacity(2 + descriptor.additional_fields.len());
        fields.push(FormField::new(
            descriptor.fields.username.clone().unwrap_or_default(),
            credentials.username(),
        ));
        fields.push(FormField::new(
            descriptor.fields.password.clone().unwrap_or_default(),
            credentials.password(),
        ));
        fields.extend(
            descriptor
                .additional_fields
                .iter()
                .map(|extra| FormField::new(extra.name.clone(), extra.value.clone())),
        );

        Self {
            method: descriptor.method(),
            action: descriptor.action.clone(),
            target: FRAME_TARGET,
            fields,
        }
    }

    /// Lowercased HTTP verb.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Submission URL (may be empty when the descriptor has none).
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Name of the frame receiving the portal's reply.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }

    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Fields as `(name, value)` pairs, in submission order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.name.as_str(), field.value.as_str()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::portal::descriptor::{AdditionalField, FieldMapping};

    fn descriptor(additional: &[(&str, &str)]) -> CaptivePortalForm {
        CaptivePortalForm {
            method: None,
            action: "http://10.0.0.1/login".to_string(),
            fields: FieldMapping {
                username: Some("u".to_string()),
                password: Some("p".to_string()),
            },
            additional_fields: additional
                .iter()
                .map(|(name, value)| AdditionalField {
                    name: (*name).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_arm_produces_credentials_then_additional_fields() {
        let credentials = Credentials::new("bob", "tok123");
        let form = PortalForm::arm(&credentials, &descriptor(&[("realm", "guest")]));

        assert_eq!(
            form.pairs(),
            vec![("u", "bob"), ("p", "tok123"), ("realm", "guest")]
        );
        assert_eq!(form.method(), "post");
        assert_eq!(form.target(), FRAME_TARGET);
    }

    #[test]
    fn test_arm_keeps_duplicate_additional_fields() {
        let credentials = Credentials::new("bob", "tok123");
        let form = PortalForm::arm(
            &credentials,
            &descriptor(&[("zone", "a"), ("zone", "b")]),
        );
        assert_eq!(form.fields().len(), 4);
        assert_eq!(form.pairs()[2..], [("zone", "a"), ("zone", "b")]);
    }

    #[test]
    fn test_arm_unmapped_fields_get_empty_names() {
        let credentials = Credentials::new("bob", "tok123");
        let form = PortalForm::arm(&credentials, &CaptivePortalForm::default());
        assert_eq!(form.pairs(), vec![("", "bob"), ("", "tok123")]);
        assert_eq!(form.action(), "");
    }

    #[test]
    fn test_form_debug_redacts_values() {
        let credentials = Credentials::new("bob", "tok123");
        let form = PortalForm::arm(&credentials, &descriptor(&[]));
        let debug = format!("{form:?}");
        assert!(!debug.contains("tok123"), "password leaked: {debug}");
    }
}
