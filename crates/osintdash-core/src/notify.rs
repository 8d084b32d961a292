//! Transient notification surface.
//!
//! Notifications auto-dismiss once their duration has elapsed; a zero
//! duration keeps them on screen until explicitly dismissed.

use std::time::{Duration, Instant};

/// Default on-screen time for a notification.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Info => "ℹ",
            Self::Warning => "⚠",
            Self::Danger => "✖",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
    pub shown_at: Instant,
}

impl Notification {
    pub fn is_persistent(&self) -> bool {
        self.duration.is_zero()
    }

    fn is_expired(&self, now: Instant) -> bool {
        !self.is_persistent() && now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

#[derive(Debug, Clone)]
pub struct Notifications {
    entries: Vec<Notification>,
    next_id: u64,
    default_duration: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl Notifications {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            default_duration,
        }
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Show `message` for the default duration.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> NotificationId {
        self.show(message, severity, self.default_duration)
    }

    pub fn show(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
    ) -> NotificationId {
        self.show_at(message, severity, duration, Instant::now())
    }

    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
        now: Instant,
    ) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            message: message.into(),
            severity,
            duration,
            shown_at: now,
        });
        id
    }

    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    /// Dismiss the most recently shown notification.
    pub fn dismiss_latest(&mut self) -> Option<NotificationId> {
        self.entries.pop().map(|n| n.id)
    }

    /// Drop every timed notification whose duration has elapsed at `now`.
    /// Returns how many were removed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| !n.is_expired(now));
        before - self.entries.len()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
