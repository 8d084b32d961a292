use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use osintdash_core::{Clipboard, ClipboardError, Effect, EffectContext};

use crate::tui_event::TaskEvent;

/// The desktop clipboard, opened on first use.
///
/// arboard calls block (X11 round-trips), so every write runs on the
/// blocking pool. The handle is kept after the first successful open so the
/// selection stays owned while the TUI runs.
#[derive(Default, Clone)]
pub struct SystemClipboard {
    inner: Arc<Mutex<Option<arboard::Clipboard>>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write(&self, text: String) -> Result<(), ClipboardError> {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = inner
                .lock()
                .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".into()))?;
            if guard.is_none() {
                let clipboard = arboard::Clipboard::new()
                    .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
                *guard = Some(clipboard);
            }
            let Some(clipboard) = guard.as_mut() else {
                return Err(ClipboardError::Unavailable("clipboard not initialized".into()));
            };
            clipboard
                .set_text(text)
                .map_err(|e| ClipboardError::Write(e.to_string()))
        })
        .await
        .unwrap_or_else(|e| Err(ClipboardError::Unavailable(format!("Task join error: {}", e))))
    }
}

fn effect_name(effect: &Effect) -> &'static str {
    match effect {
        Effect::CopyToClipboard(_) => "copy",
        Effect::Export(_) => "export",
        Effect::Navigate(_) => "navigate",
        Effect::SubmitForm { .. } => "submit",
    }
}

/// Run a background effect on the runtime and report its completion to the TUI.
///
/// Nothing is sent if the effect is cancelled (the TUI is shutting down) or
/// produces no completion.
pub fn spawn_effect(
    effect: Effect,
    ctx: EffectContext,
    tx: mpsc::UnboundedSender<TaskEvent>,
    cancel: CancellationToken,
) {
    let name = effect_name(&effect);
    tokio::spawn(async move {
        let task = tokio::spawn(async move { osintdash_core::run_effect(effect, &ctx).await });
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("{} effect abandoned on shutdown", name);
            }
            joined = task => match joined {
                Ok(Some(completion)) => {
                    let _ = tx.send(TaskEvent::Completed(completion));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("{} effect task failed: {}", name, e);
                    let _ = tx.send(TaskEvent::Crashed {
                        effect: name,
                        error: e.to_string(),
                    });
                }
            },
        }
    });
}
