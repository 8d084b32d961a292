//! Client-side form field validation.
//!
//! Rules are read from the field's attributes, the way a browser form
//! carries them: `required`, `type` (`email`, `url`), `pattern` and
//! `data-error-message`. A field holds its current value in `value`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::dom::Element;

pub const VALUE_ATTR: &str = "value";
pub const TYPE_ATTR: &str = "type";
pub const REQUIRED_ATTR: &str = "required";
pub const PATTERN_ATTR: &str = "pattern";
pub const ERROR_MESSAGE_ATTR: &str = "data-error-message";
/// Holds the message of the last failed validation.
pub const ERROR_ATTR: &str = "data-error";

pub const VALID_CLASS: &str = "is-valid";
pub const INVALID_CLASS: &str = "is-invalid";

pub const DEFAULT_PATTERN_MESSAGE: &str = "Invalid format.";

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Input types with their own format check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Url,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Url => "url",
        }
    }

    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("email") => Self::Email,
            Some("url") => Self::Url,
            _ => Self::Text,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("This field is required.")]
    Required,
    #[error("Please enter a valid email address.")]
    Email,
    #[error("Please enter a valid URL.")]
    Url,
    /// The value does not match `pattern`; carries the message to show.
    #[error("{0}")]
    Pattern(String),
}

/// Check one field's current value against its rules.
///
/// The value is trimmed first. An empty value only fails when the field is
/// required. When several rules fail the pattern message wins over the
/// type message.
pub fn validate_field(field: &Element) -> Result<(), FieldError> {
    let value = field.attr(VALUE_ATTR).unwrap_or_default().trim();
    if value.is_empty() {
        return if field.attr(REQUIRED_ATTR).is_some() {
            Err(FieldError::Required)
        } else {
            Ok(())
        };
    }

    if let Some(pattern) = field.attr(PATTERN_ATTR) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(value) => {
                let message = field
                    .attr(ERROR_MESSAGE_ATTR)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(DEFAULT_PATTERN_MESSAGE);
                return Err(FieldError::Pattern(message.to_string()));
            }
            Ok(_) => {}
            Err(e) => log::warn!("ignoring invalid field pattern {:?}: {}", pattern, e),
        }
    }

    match FieldKind::from_attr(field.attr(TYPE_ATTR)) {
        FieldKind::Email if !EMAIL.is_match(value) => Err(FieldError::Email),
        FieldKind::Url if url::Url::parse(value).is_err() => Err(FieldError::Url),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: &str, value: &str) -> Element {
        Element::new("input")
            .with_attr(TYPE_ATTR, kind)
            .with_attr(VALUE_ATTR, value)
    }

    #[test]
    fn required_rejects_blank_values() {
        let required = field("text", "   ").with_attr(REQUIRED_ATTR, "");
        assert_eq!(validate_field(&required), Err(FieldError::Required));
        assert_eq!(
            FieldError::Required.to_string(),
            "This field is required."
        );
        assert_eq!(validate_field(&field("email", "")), Ok(()));
    }

    #[test]
    fn email_format() {
        assert_eq!(validate_field(&field("email", "analyst@example.com")), Ok(()));
        assert_eq!(validate_field(&field("email", " analyst@example.com ")), Ok(()));
        assert_eq!(validate_field(&field("email", "analyst@example")), Err(FieldError::Email));
        assert_eq!(validate_field(&field("email", "a b@example.com")), Err(FieldError::Email));
    }

    #[test]
    fn url_must_be_absolute() {
        assert_eq!(validate_field(&field("url", "https://example.com/x")), Ok(()));
        assert_eq!(validate_field(&field("url", "example.com")), Err(FieldError::Url));
        assert_eq!(validate_field(&field("url", "http://")), Err(FieldError::Url));
    }

    #[test]
    fn pattern_uses_custom_message_and_wins_over_type() {
        let domain = field("text", "Example.com")
            .with_attr(PATTERN_ATTR, "^[a-z0-9.-]+$")
            .with_attr(ERROR_MESSAGE_ATTR, "Use a lowercase domain");
        assert_eq!(
            validate_field(&domain),
            Err(FieldError::Pattern("Use a lowercase domain".into()))
        );

        let email = field("email", "nope").with_attr(PATTERN_ATTR, "^x");
        assert_eq!(
            validate_field(&email),
            Err(FieldError::Pattern(DEFAULT_PATTERN_MESSAGE.into()))
        );
    }

    #[test]
    fn pattern_is_not_anchored() {
        let field = field("text", "host-42.example.com").with_attr(PATTERN_ATTR, "[0-9]+");
        assert_eq!(validate_field(&field), Ok(()));
    }

    #[test]
    fn broken_pattern_is_ignored() {
        let field = field("text", "abc").with_attr(PATTERN_ATTR, "(");
        assert_eq!(validate_field(&field), Ok(()));
    }
}
