//! Single-slot, auto-expiring status messages
//!
//! A notification is raised after every settled remote call (and for local
//! validation failures). Only one is visible at a time: raising a new one
//! replaces the old one and restarts its window. Expiry is a timestamp
//! comparison performed on read, so no timer task is needed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// How long a notification stays visible
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// The action succeeded
    Success,
    /// The action failed or was rejected
    Error,
}

/// A visible status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message text
    pub message: String,
    /// Severity
    pub kind: NotificationKind,
    /// When the notification was raised
    pub created_at: Instant,
}

impl Notification {
    /// Create a success notification stamped now
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
            created_at: Instant::now(),
        }
    }

    /// Create an error notification stamped now
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
            created_at: Instant::now(),
        }
    }

    /// Whether the notification is past its window at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= NOTIFICATION_TTL
    }

    /// Time left before expiry, zero once expired
    #[must_use]
    pub fn remaining(&self) -> Duration {
        NOTIFICATION_TTL.saturating_sub(Instant::now().saturating_duration_since(self.created_at))
    }
}

/// Holder for the one visible notification
#[derive(Debug, Clone, Default)]
pub struct NotificationChannel {
    slot: Option<Notification>,
}

impl NotificationChannel {
    /// Create an empty channel
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is visible with a fresh notification
    pub fn raise(&mut self, message: impl Into<String>, kind: NotificationKind) {
        let notification = match kind {
            NotificationKind::Success => Notification::success(message),
            NotificationKind::Error => Notification::error(message),
        };
        tracing::debug!(kind = ?notification.kind, message = %notification.message, "notification raised");
        self.slot = Some(notification);
    }

    /// Dismiss the visible notification
    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// The visible notification, dropping it first if it has expired
    pub fn current(&mut self) -> Option<&Notification> {
        let now = Instant::now();
        if self.slot.as_ref().is_some_and(|n| n.is_expired_at(now)) {
            self.slot = None;
        }
        self.slot.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_raise_and_expire() {
        let mut channel = NotificationChannel::new();
        channel.raise("Email generated", NotificationKind::Success);
        assert_eq!(channel.current().map(|n| n.kind), Some(NotificationKind::Success));

        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert!(channel.current().is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(channel.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notification_supersedes_and_restarts_window() {
        let mut channel = NotificationChannel::new();
        channel.raise("first", NotificationKind::Success);

        tokio::time::advance(Duration::from_secs(4)).await;
        channel.raise("second", NotificationKind::Error);

        tokio::time::advance(Duration::from_secs(4)).await;
        let visible = channel.current().cloned().unwrap();
        assert_eq!(visible.message, "second");
        assert_eq!(visible.kind, NotificationKind::Error);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(channel.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear() {
        let mut channel = NotificationChannel::new();
        channel.raise("oops", NotificationKind::Error);
        channel.clear();
        assert!(channel.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining() {
        let notification = Notification::success("ok");
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(notification.remaining(), Duration::from_secs(3));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(notification.remaining(), Duration::ZERO);
    }
}
