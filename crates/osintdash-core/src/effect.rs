//! Side effects queued by action handlers and executed by the host.
//!
//! Handlers never block: anything that touches the platform is pushed onto
//! the dashboard's effect outbox. The host drains the outbox after each
//! event, runs background effects with [`run_effect`] and feeds the resulting
//! [`Completion`] back through `Dashboard::apply_completion`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::clipboard::{Clipboard, ClipboardError};
use crate::dom::NodeId;
use crate::export::{ExportError, ExportJob, ExportReceipt, write_export};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CopyToClipboard(String),
    Export(ExportJob),
    Navigate(String),
    /// A validated form, with its field names and trimmed values.
    SubmitForm {
        form: NodeId,
        name: String,
        fields: Vec<(String, String)>,
    },
}

impl Effect {
    /// Whether the effect has to run off the UI loop.
    pub fn is_background(&self) -> bool {
        matches!(self, Self::CopyToClipboard(_) | Self::Export(_))
    }
}

/// Result of a background effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Clipboard(Result<(), ClipboardError>),
    Export(Result<ExportReceipt, ExportError>),
}

/// Platform capabilities background effects need.
#[derive(Clone)]
pub struct EffectContext {
    pub clipboard: Arc<dyn Clipboard>,
    pub export_dir: PathBuf,
}

/// Run a background effect. Foreground effects return `None`.
pub async fn run_effect(effect: Effect, ctx: &EffectContext) -> Option<Completion> {
    match effect {
        Effect::CopyToClipboard(text) => {
            let result = ctx.clipboard.write(text).await;
            if let Err(e) = &result {
                log::error!("Failed to copy: {}", e);
            }
            Some(Completion::Clipboard(result))
        }
        Effect::Export(job) => {
            let dir = ctx.export_dir.clone();
            let result = tokio::task::spawn_blocking(move || write_export(&dir, &job))
                .await
                .unwrap_or_else(|e| Err(ExportError::Task(e.to_string())));
            if let Err(e) = &result {
                log::error!("Error exporting data: {}", e);
            }
            Some(Completion::Export(result))
        }
        Effect::Navigate(_) | Effect::SubmitForm { .. } => None,
    }
}
