//! Named trigger publish/subscribe.
//!
//! Delivery is synchronous and in subscription order. Nothing is queued: a
//! subscriber that subscribes after a publish never sees it, and a publish
//! made from inside a subscriber is delivered immediately as its own call.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

/// A named event with an optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub name: String,
    pub payload: Option<Value>,
}

impl Trigger {
    /// A trigger with no payload.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            payload: None,
        }
    }

    /// A trigger carrying a JSON payload.
    pub fn with_payload(name: &str, payload: Value) -> Self {
        Self {
            name: name.to_string(),
            payload: Some(payload),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&Trigger) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Handler)>,
}

/// Session-owned trigger bus. Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Subscribers>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a handler. It sees every publish from now on.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Trigger) + Send + Sync + 'static,
    {
        let mut subs = self.lock();
        let id = SubscriptionId(subs.next_id);
        subs.next_id += 1;
        subs.entries.push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.lock();
        let before = subs.entries.len();
        subs.entries.retain(|(sid, _)| *sid != id);
        subs.entries.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Publish a trigger without payload. Returns the number of deliveries.
    pub fn publish(&self, name: &str) -> usize {
        self.publish_trigger(Trigger::new(name))
    }

    /// Publish a trigger carrying a JSON payload.
    pub fn publish_with(&self, name: &str, payload: Value) -> usize {
        self.publish_trigger(Trigger::with_payload(name, payload))
    }

    /// Deliver `trigger` to every current subscriber in subscription order.
    pub fn publish_trigger(&self, trigger: Trigger) -> usize {
        // Snapshot so handlers may publish or (un)subscribe without deadlocking.
        let handlers: Vec<Handler> = self
            .lock()
            .entries
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        log::debug!("trigger '{}' -> {} subscribers", trigger.name, handlers.len());
        for handler in &handlers {
            handler(&trigger);
        }
        handlers.len()
    }
}
