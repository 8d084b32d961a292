use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Platform clipboard write capability.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write(&self, text: String) -> Result<(), ClipboardError>;
}

/// Clipboard kept in process memory, optionally refusing every write.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    refuse: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes all fail with `reason`.
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(None),
            refuse: Some(reason.into()),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write(&self, text: String) -> Result<(), ClipboardError> {
        if let Some(reason) = &self.refuse {
            return Err(ClipboardError::Write(reason.clone()));
        }
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        *contents = Some(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_clipboard_stores_last_write() {
        let clipboard = MemoryClipboard::new();
        clipboard.write("first".into()).await.unwrap();
        clipboard.write("second".into()).await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn refusing_clipboard_keeps_contents() {
        let clipboard = MemoryClipboard::refusing("permission denied");
        let err = clipboard.write("secret".into()).await.unwrap_err();
        assert_eq!(err, ClipboardError::Write("permission denied".into()));
        assert_eq!(clipboard.contents(), None);
    }
}
