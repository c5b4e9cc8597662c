//! User-facing outcome queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use skillroute_core::NotificationId;

/// Notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
    /// Neutral information
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
            NotificationKind::Info => write!(f, "info"),
        }
    }
}

/// Notification body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NotificationMessage {
    /// One line
    Plain(String),
    /// Title with supporting text
    Detailed {
        /// Headline
        title: String,
        /// Supporting text
        description: String,
    },
}

impl NotificationMessage {
    /// Title with supporting text.
    pub fn detailed(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Detailed {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl From<&str> for NotificationMessage {
    fn from(s: &str) -> Self {
        Self::Plain(s.to_string())
    }
}

impl From<String> for NotificationMessage {
    fn from(s: String) -> Self {
        Self::Plain(s)
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationMessage::Plain(text) => write!(f, "{}", text),
            NotificationMessage::Detailed { title, description } => {
                write!(f, "{}: {}", title, description)
            }
        }
    }
}

/// One queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Unique id
    pub id: NotificationId,
    /// Kind
    pub kind: NotificationKind,
    /// Body
    pub message: NotificationMessage,
}

/// FIFO of transient notifications. Not deduplicated, not persisted.
#[derive(Debug, Default)]
pub struct NotificationSink {
    queue: Mutex<VecDeque<Notification>>,
}

impl NotificationSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification and return its id.
    pub fn push(&self, kind: NotificationKind, message: impl Into<NotificationMessage>) -> NotificationId {
        let notification = Notification {
            id: NotificationId::new(),
            kind,
            message: message.into(),
        };
        let id = notification.id;
        self.queue().push_back(notification);
        id
    }

    /// Remove by id. Returns whether it was present.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut queue = self.queue();
        match queue.iter().position(|n| n.id == id) {
            Some(pos) => {
                queue.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Queued notifications, oldest first.
    pub fn pending(&self) -> Vec<Notification> {
        self.queue().iter().cloned().collect()
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue().drain(..).collect()
    }

    /// Queue length.
    pub fn len(&self) -> usize {
        self.queue().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_and_dismiss() {
        let sink = NotificationSink::new();
        let first = sink.push(NotificationKind::Success, "saved");
        let second = sink.push(
            NotificationKind::Error,
            NotificationMessage::detailed("Update failed", "timed out"),
        );
        assert_ne!(first, second);

        assert!(sink.dismiss(first));
        assert!(!sink.dismiss(first));

        let pending = sink.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second);
        assert_eq!(pending[0].message.to_string(), "Update failed: timed out");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let sink = NotificationSink::new();
        sink.push(NotificationKind::Info, "busy");
        sink.push(NotificationKind::Info, "busy");
        assert_eq!(sink.len(), 2);

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.is_empty());
    }
}
