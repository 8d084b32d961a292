use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::dom::NodeId;

/// Attribute naming the action a clickable element triggers.
pub const ACTION_ATTR: &str = "data-action";
/// Attribute holding the JSON-encoded parameter object for the action.
pub const PARAMS_ATTR: &str = "data-params";

/// The closed set of actions a click can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CopyText,
    ToggleSection,
    ConfirmAction,
    ExportData,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        Self::CopyText,
        Self::ToggleSection,
        Self::ConfirmAction,
        Self::ExportData,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CopyText => "copy-text",
            Self::ToggleSection => "toggle-section",
            Self::ConfirmAction => "confirm-action",
            Self::ExportData => "export-data",
        }
    }

    /// Exact, case-sensitive lookup by action name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters carried in the `data-params` attribute.
///
/// Every field is optional; empty strings count as absent. Unknown keys are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParams {
    pub text: Option<String>,
    pub target: Option<String>,
    pub message: Option<String>,
    pub confirm_text: Option<String>,
    pub cancel_text: Option<String>,
    pub href: Option<String>,
    pub form: Option<String>,
    pub format: Option<String>,
    pub table: Option<String>,
}

impl ActionParams {
    /// Parse a raw `data-params` value. A missing or blank attribute yields
    /// the empty parameter set; anything else must be a JSON object.
    pub fn parse(raw: Option<&str>) -> Result<Self, ParamsError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(Self::default()),
            Some(raw) => raw,
        };
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ParamsError::Json(e.to_string()))?;
        if !value.is_object() {
            return Err(ParamsError::NotAnObject(json_kind(&value)));
        }
        serde_json::from_value(value).map_err(|e| ParamsError::Field(e.to_string()))
    }

    pub fn text(&self) -> Option<&str> {
        present(&self.text)
    }

    pub fn target(&self) -> Option<&str> {
        present(&self.target)
    }

    pub fn message(&self) -> Option<&str> {
        present(&self.message)
    }

    pub fn confirm_text(&self) -> Option<&str> {
        present(&self.confirm_text)
    }

    pub fn cancel_text(&self) -> Option<&str> {
        present(&self.cancel_text)
    }

    pub fn href(&self) -> Option<&str> {
        present(&self.href)
    }

    pub fn form(&self) -> Option<&str> {
        present(&self.form)
    }

    pub fn format(&self) -> Option<&str> {
        present(&self.format)
    }

    pub fn table(&self) -> Option<&str> {
        present(&self.table)
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Why a `data-params` blob was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("unexpected parameter value: {0}")]
    Field(String),
}

/// A single click resolved into a typed action. Lives for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub params: ActionParams,
    /// The element carrying the action marker.
    pub trigger: NodeId,
}
