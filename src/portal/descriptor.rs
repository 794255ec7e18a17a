//! Captive portal form descriptor.

use serde::Deserialize;

/// Default HTTP verb for resubmission.
pub const DEFAULT_METHOD: &str = "post";

/// Organization-specific description of the captive portal's login form.
///
/// Loaded from JSON, e.g.
///
/// ```json
/// {
///   "method": "post",
///   "action": "http://10.0.0.1:8005/index.php?zone=cpzone",
///   "fields": { "username": "auth_user", "password": "auth_pass" },
///   "additional_fields": [{ "name": "zone", "value": "cpzone" }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CaptivePortalForm {
    /// HTTP verb; [`DEFAULT_METHOD`] when absent or empty.
    #[serde(default)]
    pub method: Option<String>,
    /// Submission URL; empty when absent.
    #[serde(default)]
    pub action: String,
    /// Portal field names for the credentials.
    #[serde(default)]
    pub fields: FieldMapping,
    /// Static pairs the portal also expects, submitted verbatim and in order.
    #[serde(default)]
    pub additional_fields: Vec<AdditionalField>,
}

impl CaptivePortalForm {
    /// The effective HTTP verb, lowercased.
    #[must_use]
    pub fn method(&self) -> String {
        self.method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_METHOD)
            .to_ascii_lowercase()
    }
}

/// Names of the credential fields the portal expects.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FieldMapping {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A static `name=value` pair required by the portal.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AdditionalField {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_parses_full_json() {
        let form: CaptivePortalForm = serde_json::from_str(
            r#"{
                "method": "POST",
                "action": "http://10.0.0.1:8005/index.php?zone=cpzone",
                "fields": {"username": "auth_user", "password": "auth_pass"},
                "additional_fields": [{"name": "zone", "value": "cpzone"}]
            }"#,
        )
        .unwrap();
        assert_eq!(form.method(), "post");
        assert_eq!(form.fields.username.as_deref(), Some("auth_user"));
        assert_eq!(form.additional_fields.len(), 1);
        assert_eq!(form.additional_fields[0].name, "zone");
    }

    #[test]
    fn test_descriptor_defaults_when_keys_missing() {
        let form: CaptivePortalForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.method(), DEFAULT_METHOD);
        assert_eq!(form.action, "");
        assert_eq!(form.fields, FieldMapping::default());
        assert!(form.additional_fields.is_empty());
    }

    #[test]
    fn test_descriptor_empty_method_falls_back_to_post() {
        let form: CaptivePortalForm = serde_json::from_str(r#"{"method": ""}"#).unwrap();
        assert_eq!(form.method(), "post");
    }
}
