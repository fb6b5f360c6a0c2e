//! Notification types and the subscriber list that delivers them.

use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use uuid::Uuid;

/// Unique identifier for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Create a new random subscription ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notifications published by the stress meter.
///
/// Within a single mutation they are always delivered in the order
/// `ValueChanged` -> zone edge -> `Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StressEvent {
    /// The stress value changed; carries the new value.
    ValueChanged(f32),
    /// Stress crossed up into the danger zone.
    ZoneEntered,
    /// Stress dropped back below the danger threshold.
    ZoneExited,
    /// Stress reached its maximum. Fires once per session.
    Exhausted,
}

impl StressEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            StressEvent::ValueChanged(_) => "value_changed",
            StressEvent::ZoneEntered => "zone_entered",
            StressEvent::ZoneExited => "zone_exited",
            StressEvent::Exhausted => "exhausted",
        }
    }
}

/// Returns false once the subscriber is gone for good.
type Callback<E> = Box<dyn FnMut(&E) -> bool + Send>;

/// An ordered list of callbacks for events of type `E`.
///
/// Callbacks run synchronously in subscription order.
pub struct Subscribers<E> {
    entries: Vec<(SubscriptionId, Callback<E>)>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl<E> Subscribers<E> {
    /// Create an empty subscriber list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Keep the returned ID to unsubscribe later.
    pub fn subscribe(&mut self, mut callback: impl FnMut(&E) + Send + 'static) -> SubscriptionId
    where
        E: 'static,
    {
        self.push(Box::new(move |event: &E| {
            callback(event);
            true
        }))
    }

    fn push(&mut self, callback: Callback<E>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.entries.push((id, callback));
        id
    }

    /// Remove a callback. Returns false if the ID was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Deliver an event to every callback, dropping channel subscribers
    /// whose receiver has gone away.
    pub fn publish(&mut self, event: &E) {
        self.entries.retain_mut(|(_, callback)| callback(event));
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: Clone + Send + 'static> Subscribers<E> {
    /// Subscribe through a channel instead of a callback.
    ///
    /// The subscription ends by itself on the first publish after the
    /// receiver is dropped.
    pub fn subscribe_channel(&mut self) -> (SubscriptionId, mpsc::Receiver<E>) {
        let (tx, rx) = mpsc::channel();
        let id = self.push(Box::new(move |event: &E| tx.send(event.clone()).is_ok()));
        (id, rx)
    }
}
