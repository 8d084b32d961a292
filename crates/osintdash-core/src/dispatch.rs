//! Click dispatch: from a clicked element to one of the fixed action
//! handlers.
//!
//! The dispatch table maps every [`ActionKind`] to a plain function and is
//! built once in [`Dispatcher::new`]. Malformed parameter blobs fail closed:
//! nothing is mutated, one diagnostic is recorded and the outcome is
//! [`DispatchOutcome::Rejected`]. Every other problem (unknown action,
//! missing parameter, selector matching nothing) is likewise absorbed as a
//! single diagnostic.

use std::collections::HashMap;

use thiserror::Error;

use crate::action::{
    ACTION_ATTR, ActionKind, ActionParams, ActionRequest, PARAMS_ATTR, ParamsError,
};
use crate::dashboard::{
    ConfirmTarget, DEFAULT_CANCEL_LABEL, DEFAULT_CONFIRM_LABEL, DEFAULT_CONFIRM_MESSAGE,
    Dashboard, PendingConfirm,
};
use crate::dom::{HIDDEN_CLASS, NodeId};
use crate::effect::Effect;
use crate::export::{ExportFormat, ExportJob};
use crate::notify::Severity;
use crate::selector::{Selector, SelectorError};

pub const INVALID_EXPORT_FORMAT: &str = "Invalid export format";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("malformed parameters for {action}: {reason}")]
    MalformedParams { action: String, reason: ParamsError },
    #[error("{action} requires the {param:?} parameter")]
    MissingParam {
        action: ActionKind,
        param: &'static str,
    },
    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),
    #[error("no element matches {0:?}")]
    NoMatch(String),
    #[error("no table with id {0:?}")]
    UnknownTable(String),
}

/// What a handler did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// A background effect was queued.
    Queued,
    /// A section's visibility flipped.
    Toggled { node: NodeId, visible: bool },
    /// A confirmation prompt is now pending.
    Prompted,
    /// Only a notification was shown.
    Notified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Neither the target nor any ancestor carries an action.
    NoAction,
    Handled(ActionKind, Handled),
    /// The action name is not one of the known kinds.
    Unknown(String),
    Rejected(DispatchError),
}

pub type Handler = fn(&mut Dashboard, &ActionRequest) -> Result<Handled, DispatchError>;

/// Routes clicks to handlers.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: HashMap<ActionKind, Handler>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let handlers = ActionKind::ALL
            .into_iter()
            .map(|kind| (kind, handler_for(kind)))
            .collect();
        Self { handlers }
    }

    /// Handle a click whose target is `target`.
    pub fn dispatch(&self, dashboard: &mut Dashboard, target: NodeId) -> DispatchOutcome {
        let Some(trigger) = dashboard.document.closest_with_attr(target, ACTION_ATTR) else {
            return DispatchOutcome::NoAction;
        };
        let Some(element) = dashboard.document.get(trigger) else {
            return DispatchOutcome::NoAction;
        };
        let name = element.attr(ACTION_ATTR).unwrap_or_default().to_string();
        let raw_params = element.attr(PARAMS_ATTR).map(str::to_string);

        // Params are validated before routing, so a broken blob is rejected
        // even when the action name is unknown.
        let params = match ActionParams::parse(raw_params.as_deref()) {
            Ok(params) => params,
            Err(reason) => {
                return reject(
                    dashboard,
                    DispatchError::MalformedParams {
                        action: name,
                        reason,
                    },
                );
            }
        };

        let Some((kind, handler)) = ActionKind::from_name(&name)
            .and_then(|kind| self.handlers.get(&kind).map(|h| (kind, *h)))
        else {
            dashboard.diagnose(log::Level::Warn, format!("Unknown action: {}", name));
            return DispatchOutcome::Unknown(name);
        };

        let request = ActionRequest {
            kind,
            params,
            trigger,
        };
        match handler(dashboard, &request) {
            Ok(handled) => {
                log::debug!("{} handled: {:?}", kind, handled);
                DispatchOutcome::Handled(kind, handled)
            }
            Err(e) => reject(dashboard, e),
        }
    }
}

fn reject(dashboard: &mut Dashboard, error: DispatchError) -> DispatchOutcome {
    let level = match error {
        DispatchError::MalformedParams { .. } => log::Level::Error,
        _ => log::Level::Warn,
    };
    dashboard.diagnose(level, error.to_string());
    DispatchOutcome::Rejected(error)
}

fn handler_for(kind: ActionKind) -> Handler {
    match kind {
        ActionKind::CopyText => copy_text,
        ActionKind::ToggleSection => toggle_section,
        ActionKind::ConfirmAction => confirm_action,
        ActionKind::ExportData => export_data,
    }
}

fn copy_text(dashboard: &mut Dashboard, request: &ActionRequest) -> Result<Handled, DispatchError> {
    let text = match request.params.text() {
        Some(text) => text.to_string(),
        None => dashboard.document.text_content(request.trigger),
    };
    dashboard.push_effect(Effect::CopyToClipboard(text));
    Ok(Handled::Queued)
}

fn toggle_section(
    dashboard: &mut Dashboard,
    request: &ActionRequest,
) -> Result<Handled, DispatchError> {
    let target = request.params.target().ok_or(DispatchError::MissingParam {
        action: request.kind,
        param: "target",
    })?;
    let selector = Selector::parse(target)?;
    let node = dashboard
        .document
        .query_selector(&selector)
        .ok_or_else(|| DispatchError::NoMatch(target.to_string()))?;
    let hidden = dashboard.document.toggle_class(node, HIDDEN_CLASS);
    Ok(Handled::Toggled {
        node,
        visible: !hidden,
    })
}

fn confirm_action(
    dashboard: &mut Dashboard,
    request: &ActionRequest,
) -> Result<Handled, DispatchError> {
    let params = &request.params;
    let on_accept = if let Some(href) = params.href() {
        ConfirmTarget::Navigate(href.to_string())
    } else if let Some(form) = params.form() {
        ConfirmTarget::SubmitForm(form.to_string())
    } else {
        ConfirmTarget::Nothing
    };

    dashboard.prompt(PendingConfirm {
        message: params.message().unwrap_or(DEFAULT_CONFIRM_MESSAGE).to_string(),
        confirm_label: params.confirm_text().unwrap_or(DEFAULT_CONFIRM_LABEL).to_string(),
        cancel_label: params.cancel_text().unwrap_or(DEFAULT_CANCEL_LABEL).to_string(),
        on_accept,
        trigger: request.trigger,
    });
    Ok(Handled::Prompted)
}

fn export_data(
    dashboard: &mut Dashboard,
    request: &ActionRequest,
) -> Result<Handled, DispatchError> {
    let table_id = request.params.table().ok_or(DispatchError::MissingParam {
        action: request.kind,
        param: "table",
    })?;
    let table = dashboard
        .table(table_id)
        .ok_or_else(|| DispatchError::UnknownTable(table_id.to_string()))?;

    let format = match request.params.format() {
        None => ExportFormat::Json,
        Some(raw) => match raw.parse::<ExportFormat>() {
            Ok(format) => format,
            Err(e) => {
                log::warn!("{}", e);
                dashboard.notify(INVALID_EXPORT_FORMAT, Severity::Danger);
                return Ok(Handled::Notified);
            }
        },
    };

    let job = ExportJob::from_table(table, format);
    dashboard.push_effect(Effect::Export(job));
    Ok(Handled::Queued)
}
