use std::collections::VecDeque;
use std::time::Duration;

use crate::dom::{Document, NodeId};
use crate::effect::{Completion, Effect};
use crate::notify::{Notifications, Severity};
use crate::selector::Selector;
use crate::table::{SortOutcome, TableView};
use crate::validate::{
    ERROR_ATTR, FieldError, INVALID_CLASS, VALID_CLASS, VALUE_ATTR, validate_field,
};

/// Diagnostics kept for display; older ones are dropped.
const MAX_DIAGNOSTICS: usize = 100;

pub const DEFAULT_CONFIRM_MESSAGE: &str = "Are you sure you want to perform this action?";
pub const DEFAULT_CONFIRM_LABEL: &str = "Confirm";
pub const DEFAULT_CANCEL_LABEL: &str = "Cancel";
pub const INVALID_FORM_MESSAGE: &str = "Please correct the highlighted fields.";

/// A non-fatal problem noticed while handling input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: log::Level,
    pub message: String,
}

/// What accepting a confirmation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmTarget {
    Navigate(String),
    /// Selector of the form to submit.
    SubmitForm(String),
    Nothing,
}

/// A yes/no prompt waiting for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirm {
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub on_accept: ConfirmTarget,
    pub trigger: NodeId,
}

/// Complete page state: element tree, tables, notifications, the pending
/// confirmation and the effect outbox.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub document: Document,
    pub notifications: Notifications,
    tables: Vec<TableView>,
    diagnostics: VecDeque<Diagnostic>,
    pending_confirm: Option<PendingConfirm>,
    effects: Vec<Effect>,
    location: Option<String>,
}

impl Dashboard {
    pub fn new(title: impl Into<String>, notification_duration: Duration) -> Self {
        Self {
            title: title.into(),
            document: Document::new(),
            notifications: Notifications::new(notification_duration),
            tables: Vec::new(),
            diagnostics: VecDeque::new(),
            pending_confirm: None,
            effects: Vec::new(),
            location: None,
        }
    }

    /// Add a table. Returns `false` (and keeps the existing one) if a table
    /// with the same id is already present.
    pub fn add_table(&mut self, table: TableView) -> bool {
        if self.table(table.id()).is_some() {
            return false;
        }
        self.tables.push(table);
        true
    }

    pub fn tables(&self) -> &[TableView] {
        &self.tables
    }

    pub fn table(&self, id: &str) -> Option<&TableView> {
        self.tables.iter().find(|t| t.id() == id)
    }

    /// Header click on `column` of table `table_id`.
    pub fn sort_table(&mut self, table_id: &str, column: usize) -> SortOutcome {
        match self.tables.iter_mut().find(|t| t.id() == table_id) {
            Some(table) => {
                let outcome = table.click_header(column);
                log::debug!("sort {} column {}: {:?}", table_id, column, outcome);
                outcome
            }
            None => {
                self.diagnose(log::Level::Warn, format!("No table with id {:?}", table_id));
                SortOutcome::Ignored
            }
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notifications.notify(message, severity);
    }

    /// Record a diagnostic and log it at the same level.
    pub fn diagnose(&mut self, level: log::Level, message: impl Into<String>) {
        let message = message.into();
        log::log!(level, "{}", message);
        if self.diagnostics.len() == MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(Diagnostic { level, message });
    }

    /// Oldest first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Drain the effect outbox.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn pending_effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn pending_confirm(&self) -> Option<&PendingConfirm> {
        self.pending_confirm.as_ref()
    }

    /// Show a confirmation prompt, replacing any prompt still open.
    pub fn prompt(&mut self, confirm: PendingConfirm) {
        if let Some(previous) = self.pending_confirm.replace(confirm) {
            log::debug!("confirmation {:?} replaced before an answer", previous.message);
        }
    }

    /// Answer the pending confirmation. Cancelling has no side effect.
    pub fn resolve_confirm(&mut self, accepted: bool) {
        let Some(confirm) = self.pending_confirm.take() else {
            return;
        };
        if !accepted {
            log::debug!("confirmation {:?} cancelled", confirm.message);
            return;
        }

        match confirm.on_accept {
            ConfirmTarget::Navigate(href) => {
                log::info!("navigating to {}", href);
                self.location = Some(href.clone());
                self.push_effect(Effect::Navigate(href));
            }
            ConfirmTarget::SubmitForm(form_selector) => {
                self.submit_form(&form_selector);
            }
            ConfirmTarget::Nothing => {}
        }
    }

    fn submit_form(&mut self, form_selector: &str) {
        let selector = match Selector::parse(form_selector) {
            Ok(selector) => selector,
            Err(e) => {
                self.diagnose(log::Level::Warn, format!("Invalid form selector: {}", e));
                return;
            }
        };
        let Some(form) = self.document.query_selector(&selector) else {
            self.diagnose(
                log::Level::Warn,
                format!("No form matches {:?}", form_selector),
            );
            return;
        };
        let name = self
            .document
            .get(form)
            .and_then(|e| e.attr("name").map(str::to_string).or_else(|| e.id.clone()))
            .unwrap_or_else(|| form_selector.to_string());

        if !self.validate_form(form) {
            log::info!("form {} not submitted: invalid fields", name);
            self.notify(INVALID_FORM_MESSAGE, Severity::Warning);
            return;
        }

        let fields = self
            .form_fields(form)
            .into_iter()
            .filter_map(|field| {
                let element = self.document.get(field)?;
                let value = element.attr(VALUE_ATTR).unwrap_or_default().trim();
                Some((element.attr("name")?.to_string(), value.to_string()))
            })
            .collect();
        log::info!("submitting form {}", name);
        self.push_effect(Effect::SubmitForm { form, name, fields });
    }

    /// The `input` elements inside `form`, in document order.
    pub fn form_fields(&self, form: NodeId) -> Vec<NodeId> {
        self.document
            .descendants(form)
            .into_iter()
            .filter(|&id| self.document.get(id).is_some_and(|e| e.tag == "input"))
            .collect()
    }

    /// Replace a field's value. Editing clears the field's error state until
    /// it is validated again.
    pub fn set_field_value(&mut self, field: NodeId, value: impl Into<String>) {
        if !self.document.set_attr(field, VALUE_ATTR, value) {
            return;
        }
        self.document.set_class(field, INVALID_CLASS, false);
        self.document.remove_attr(field, ERROR_ATTR);
    }

    /// Validate one field and mark it valid or invalid. The failure message
    /// is kept in the field's error attribute.
    pub fn validate_field(&mut self, field: NodeId) -> Result<(), FieldError> {
        let result = match self.document.get(field) {
            Some(element) => validate_field(element),
            None => return Ok(()),
        };
        self.document.set_class(field, VALID_CLASS, result.is_ok());
        self.document.set_class(field, INVALID_CLASS, result.is_err());
        match &result {
            Ok(()) => {
                self.document.remove_attr(field, ERROR_ATTR);
            }
            Err(e) => {
                self.document.set_attr(field, ERROR_ATTR, e.to_string());
            }
        }
        result
    }

    /// Validate every field of `form`. Returns whether all of them passed.
    pub fn validate_form(&mut self, form: NodeId) -> bool {
        let mut valid = true;
        for field in self.form_fields(form) {
            valid &= self.validate_field(field).is_ok();
        }
        valid
    }

    /// Turn a finished background effect into a notification.
    pub fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Clipboard(Ok(())) => self.notify("Copied to clipboard", Severity::Success),
            Completion::Clipboard(Err(_)) => {
                self.notify("Failed to copy to clipboard", Severity::Danger)
            }
            Completion::Export(Ok(receipt)) => self.notify(
                format!("Exported {} rows to {}", receipt.rows, receipt.path.display()),
                Severity::Success,
            ),
            Completion::Export(Err(_)) => {
                self.notify("An error occurred during export", Severity::Danger)
            }
        }
    }
}
