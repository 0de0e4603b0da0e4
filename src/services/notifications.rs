use std::collections::VecDeque;
use chrono::{DateTime, Utc};
use crate::models::Notification;

/// Insertion-ordered notification queue with per-entry expiry
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    entries: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        tracing::debug!(
            "Queued {:?} notification {} for {}",
            notification.kind,
            notification.id,
            notification.recipient_id
        );
        self.entries.push_back(notification);
    }

    /// Remove a notification by id, returning it if present
    pub fn remove(&mut self, id: &str) -> Option<Notification> {
        let index = self.entries.iter().position(|n| n.id == id)?;
        self.entries.remove(index)
    }

    /// Drop every entry whose display window has elapsed
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| !n.is_expired(now));
        before - self.entries.len()
    }

    /// Live notifications for one recipient, oldest first
    pub fn for_recipient<'a>(
        &'a self,
        recipient_id: &'a str,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Notification> + 'a {
        self.entries
            .iter()
            .filter(move |n| n.recipient_id == recipient_id && !n.is_expired(now))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
