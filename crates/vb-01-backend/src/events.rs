//! # Backend Events
//!
//! Per-backend publish/subscribe hub. Subscriptions are explicit handles:
//! dropping one (or calling `unsubscribe`) removes its callback.

use parking_lot::RwLock;
use shared_types::{BackendEvent, EventKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Callback invoked for each published event.
pub type EventCallback = Arc<dyn Fn(&BackendEvent) + Send + Sync>;

type SubscriberMap = HashMap<u64, (EventKind, EventCallback)>;

/// Subscriber table of one backend.
#[derive(Default)]
pub struct EventHub {
    subscribers: Arc<RwLock<SubscriberMap>>,
    next_id: AtomicU64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for `kind`.
    pub fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().insert(id, (kind, callback));
        debug!(subscription = id, ?kind, "Subscriber registered");
        Subscription {
            id,
            kind,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Deliver `event` to every subscriber of its kind.
    ///
    /// Callbacks run outside the table lock, so a callback may subscribe or
    /// unsubscribe without deadlocking.
    pub fn publish(&self, event: &BackendEvent) {
        let targets: Vec<EventCallback> = self
            .subscribers
            .read()
            .values()
            .filter(|(kind, _)| *kind == event.kind)
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in targets {
            callback(event);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

/// Handle for one registered callback.
///
/// When dropped, the subscription is automatically cleaned up.
#[must_use = "dropping the subscription unsubscribes"]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    subscribers: Weak<RwLock<SubscriberMap>>,
}

impl Subscription {
    /// Event kind this subscription listens to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Cancel the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The hub may already be gone together with its backend.
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.write().remove(&self.id);
            debug!(subscription = self.id, "Subscriber removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_types::BackendId;
    use std::sync::atomic::AtomicUsize;

    fn event(kind: EventKind) -> BackendEvent {
        BackendEvent {
            kind,
            backend_id: BackendId::from("eth"),
            vault_id: "v-1".to_string(),
            tx_hash: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_publish_only_matching_kind() {
        let hub = EventHub::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = hub.subscribe(
            EventKind::VaultCreated,
            Arc::new(move |_: &BackendEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        hub.publish(&event(EventKind::VaultCreated));
        hub.publish(&event(EventKind::AssetsLocked));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels_subscription() {
        let hub = EventHub::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let sub = hub.subscribe(
            EventKind::AssetsLocked,
            Arc::new(move |_: &BackendEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(hub.subscriber_count(), 1);

        sub.unsubscribe();
        hub.publish(&event(EventKind::AssetsLocked));

        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_discarded_handle_unsubscribes_at_once() {
        let hub = EventHub::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _ = hub.subscribe(
            EventKind::VaultCreated,
            Arc::new(move |_: &BackendEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        hub.publish(&event(EventKind::VaultCreated));

        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outlives_hub() {
        let hub = EventHub::new();
        let sub = hub.subscribe(EventKind::SyncInitiated, Arc::new(|_| {}));
        drop(hub);
        drop(sub);
    }
}
