//! Change notifications shared by every open view of the board data.
//!
//! Notifications carry only a category tag, never the changed records:
//! subscribers re-query the collections they care about. Cloned channel
//! handles share one subscriber registry, so two stores built from clones
//! of the same channel observe each other's mutations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Category of data that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    BoardsUpdated,
    TasksUpdated,
    ActivityUpdated,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::BoardsUpdated => "BOARDS_UPDATED",
            ChangeKind::TasksUpdated => "TASKS_UPDATED",
            ChangeKind::ActivityUpdated => "ACTIVITY_UPDATED",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broadcast handle for change notifications. Cheap to clone; clones share
/// the subscriber registry.
#[derive(Clone, Default)]
pub struct SyncChannel {
    subscribers: Arc<Mutex<Vec<Sender<ChangeKind>>>>,
}

impl SyncChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Dropping the returned receiver unsubscribes;
    /// its sender is pruned on the next publish.
    pub fn subscribe(&self) -> Receiver<ChangeKind> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .expect("subscriber registry poisoned")
            .push(tx);
        rx
    }

    /// Fire-and-forget broadcast to every live subscriber
    pub fn publish(&self, kind: ChangeKind) {
        self.subscribers
            .lock()
            .expect("subscriber registry poisoned")
            .retain(|tx| tx.send(kind).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("subscriber registry poisoned")
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_receives_published_kind() {
        let channel = SyncChannel::new();
        let rx = channel.subscribe();
        channel.publish(ChangeKind::TasksUpdated);
        assert_eq!(rx.try_recv().unwrap(), ChangeKind::TasksUpdated);
    }

    #[test]
    fn clones_share_the_registry() {
        let channel = SyncChannel::new();
        let rx = channel.subscribe();
        let clone = channel.clone();
        clone.publish(ChangeKind::BoardsUpdated);
        assert_eq!(rx.try_recv().unwrap(), ChangeKind::BoardsUpdated);
    }

    #[test]
    fn every_subscriber_sees_every_publish() {
        let channel = SyncChannel::new();
        let a = channel.subscribe();
        let b = channel.subscribe();
        channel.publish(ChangeKind::ActivityUpdated);
        assert_eq!(a.try_recv().unwrap(), ChangeKind::ActivityUpdated);
        assert_eq!(b.try_recv().unwrap(), ChangeKind::ActivityUpdated);
    }

    #[test]
    fn dropped_receivers_are_pruned_on_publish() {
        let channel = SyncChannel::new();
        let rx = channel.subscribe();
        drop(rx);
        assert_eq!(channel.subscriber_count(), 1);
        channel.publish(ChangeKind::TasksUpdated);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn wire_tags_match_the_original_protocol() {
        assert_eq!(ChangeKind::BoardsUpdated.as_str(), "BOARDS_UPDATED");
        assert_eq!(ChangeKind::TasksUpdated.as_str(), "TASKS_UPDATED");
        assert_eq!(ChangeKind::ActivityUpdated.as_str(), "ACTIVITY_UPDATED");
    }
}
