//! Page description files.
//!
//! A layout is a TOML document listing sections, action buttons, forms and
//! tables:
//!
//! ```toml
//! title = "Investigation: example.com"
//!
//! [[section]]
//! id = "whois"
//! title = "WHOIS"
//! text = "Registrar: Example Registrar, Inc."
//!
//! [[button]]
//! label = "Toggle WHOIS"
//! action = "toggle-section"
//! params = '{"target": "#whois"}'
//!
//! [[form]]
//! id = "new-investigation"
//!
//! [[form.field]]
//! name = "contact"
//! type = "email"
//! required = true
//!
//! [[table]]
//! id = "entries"
//! columns = [{ label = "ID", sortable = true }, { label = "Target" }]
//! rows = [["2", "example.com"], ["1", "example.org"]]
//! ```
//!
//! Button parameters stay raw JSON strings: they are only parsed when the
//! button is clicked, so a broken blob surfaces as a dispatch diagnostic
//! rather than a load failure.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::action::{ACTION_ATTR, PARAMS_ATTR};
use crate::dashboard::Dashboard;
use crate::dom::{Element, HIDDEN_CLASS};
use crate::table::{Column, TableView};
use crate::validate::{
    ERROR_MESSAGE_ATTR, FieldKind, PATTERN_ATTR, REQUIRED_ATTR, TYPE_ATTR, VALUE_ATTR,
};

pub const DEFAULT_TITLE: &str = "OSINT Dashboard";

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("failed to read layout {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid layout: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate table id {0:?}")]
    DuplicateTable(String),
    #[error("table {table:?} has more than one column labelled {label:?}")]
    DuplicateColumn { table: String, label: String },
    #[error("field {field:?} of form {form:?} has an invalid pattern: {source}")]
    InvalidPattern {
        form: String,
        field: String,
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageLayout {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionSpec>,
    #[serde(default, rename = "button")]
    pub buttons: Vec<ButtonSpec>,
    #[serde(default, rename = "form")]
    pub forms: Vec<FormSpec>,
    #[serde(default, rename = "table")]
    pub tables: Vec<TableSpec>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionSpec {
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ButtonSpec {
    pub label: String,
    pub action: String,
    pub params: Option<String>,
    pub id: Option<String>,
    /// Extra text after the label, e.g. the value a copy button copies.
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormSpec {
    pub id: String,
    pub name: Option<String>,
    pub action: Option<String>,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    pub pattern: Option<String>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub id: String,
    pub title: Option<String>,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSpec {
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
}

impl PageLayout {
    pub fn from_toml_str(source: &str) -> Result<Self, LayoutError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let source = std::fs::read_to_string(path).map_err(|source| LayoutError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Build the page.
    ///
    /// Sections become `section` elements (hidden ones carry the hidden
    /// class), forms become `form` elements with one `input` per field, and
    /// each button becomes a `button` carrying the action attributes with
    /// its label (and hint) in child `span`s, so clicks on the label resolve
    /// to the button.
    ///
    /// Fails on a repeated table id, a repeated column label within a table
    /// or a field pattern that does not compile.
    pub fn build(self, notification_duration: Duration) -> Result<Dashboard, LayoutError> {
        let mut dashboard = Dashboard::new(self.title, notification_duration);
        let root = dashboard.document.root();

        for section in self.sections {
            let mut element = Element::new("section")
                .with_id(section.id)
                .with_class("section")
                .with_text(section.text);
            if let Some(title) = section.title {
                element = element.with_attr("data-title", title);
            }
            if section.hidden {
                element = element.with_class(HIDDEN_CLASS);
            }
            dashboard.document.append(root, element);
        }

        for form in self.forms {
            let mut element = Element::new("form").with_id(form.id.clone());
            if let Some(name) = form.name {
                element = element.with_attr("name", name);
            }
            if let Some(action) = form.action {
                element = element.with_attr("action", action);
            }
            let Some(form_node) = dashboard.document.append(root, element) else {
                continue;
            };
            for field in form.fields {
                let input = field_element(&form.id, field)?;
                dashboard.document.append(form_node, input);
            }
        }

        for button in self.buttons {
            let mut element = Element::new("button")
                .with_class("btn")
                .with_attr(ACTION_ATTR, button.action);
            if let Some(params) = button.params {
                element = element.with_attr(PARAMS_ATTR, params);
            }
            if let Some(id) = button.id {
                element = element.with_id(id);
            }
            if let Some(node) = dashboard.document.append(root, element) {
                dashboard.document.append(
                    node,
                    Element::new("span").with_class("label").with_text(button.label),
                );
                if let Some(hint) = button.hint.filter(|h| !h.is_empty()) {
                    dashboard.document.append(
                        node,
                        Element::new("span")
                            .with_class("hint")
                            .with_text(format!(" {}", hint)),
                    );
                }
            }
        }

        for spec in self.tables {
            let title = spec.title.unwrap_or_else(|| spec.id.clone());
            let mut labels = HashSet::new();
            let repeated = spec.columns.iter().find(|c| !labels.insert(c.label.as_str()));
            if let Some(repeated) = repeated {
                return Err(LayoutError::DuplicateColumn {
                    table: spec.id,
                    label: repeated.label.clone(),
                });
            }
            let columns = spec
                .columns
                .into_iter()
                .map(|c| Column::new(c.label, c.sortable))
                .collect();
            let mut table = TableView::new(spec.id, title, columns);
            for row in spec.rows {
                table.push_row(row);
            }
            let id = table.id().to_string();
            if !dashboard.add_table(table) {
                return Err(LayoutError::DuplicateTable(id));
            }
        }

        Ok(dashboard)
    }
}

/// An `input` element carrying the field's rules as attributes.
fn field_element(form: &str, field: FieldSpec) -> Result<Element, LayoutError> {
    let mut element = Element::new("input")
        .with_attr("name", field.name.clone())
        .with_attr(TYPE_ATTR, field.kind.name())
        .with_attr(VALUE_ATTR, field.value);
    if let Some(label) = field.label {
        element = element.with_attr("data-label", label);
    }
    if field.required {
        element = element.with_attr(REQUIRED_ATTR, "");
    }
    if let Some(pattern) = field.pattern {
        if let Err(source) = regex::Regex::new(&pattern) {
            return Err(LayoutError::InvalidPattern {
                form: form.to_string(),
                field: field.name,
                source,
            });
        }
        element = element.with_attr(PATTERN_ATTR, pattern);
    }
    if let Some(message) = field.error_message {
        element = element.with_attr(ERROR_MESSAGE_ATTR, message);
    }
    Ok(element)
}
