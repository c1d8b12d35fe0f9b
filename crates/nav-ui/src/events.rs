//! Transition lifecycle events
//!
//! Listeners are called in registration order. A listener that panics is
//! logged and skipped; the others still run.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

/// Event kinds a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// A transition started
    TransitionStart,
    /// A transition settled
    TransitionEnd,
}

/// A lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    /// Start or end
    pub kind: EventKind,
    /// Backward/dismiss transition
    pub closing: bool,
    /// Route driving the transition (the entering route, or the one closing)
    pub route_key: String,
}

impl TransitionEvent {
    /// Create a start event
    pub fn start(closing: bool, route_key: impl Into<String>) -> Self {
        Self {
            kind: EventKind::TransitionStart,
            closing,
            route_key: route_key.into(),
        }
    }

    /// Create an end event
    pub fn end(closing: bool, route_key: impl Into<String>) -> Self {
        Self {
            kind: EventKind::TransitionEnd,
            closing,
            route_key: route_key.into(),
        }
    }
}

/// Listener identifier returned on registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&TransitionEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
}

/// Registry of lifecycle listeners
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind
    pub fn add_listener<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&TransitionEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push((id, kind, Arc::new(listener)));
        Subscription {
            id,
            kind,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Remove a listener; returns whether it was registered
    pub fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut registry = self.registry.lock();
        let before = registry.listeners.len();
        registry
            .listeners
            .retain(|(lid, lkind, _)| !(*lid == id && *lkind == kind));
        registry.listeners.len() != before
    }

    /// Number of listeners for a kind
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .listeners
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    /// Deliver an event to every matching listener
    ///
    /// The listener list is copied first so listeners can add or remove
    /// listeners while being called.
    pub fn emit(&self, event: &TransitionEvent) {
        let listeners: Vec<Listener> = self
            .registry
            .lock()
            .listeners
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(_, _, listener)| listener.clone())
            .collect();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::error!(
                    "Listener for {:?} on {} panicked",
                    event.kind,
                    event.route_key
                );
            }
        }
    }

    /// Deliver events in order
    pub fn emit_all(&self, events: &[TransitionEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Handle returned by [`EventBus::add_listener`]
#[derive(Debug, Clone)]
pub struct Subscription {
    id: ListenerId,
    kind: EventKind,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Listener identifier
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Event kind this subscription listens to
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Remove the listener
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .listeners
                .retain(|(id, _, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &EventBus, kind: EventKind, log: &Arc<Mutex<Vec<u32>>>, n: u32) -> Subscription {
        let log = log.clone();
        bus.add_listener(kind, move |_| log.lock().push(n))
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _one = recorder(&bus, EventKind::TransitionStart, &log, 1);
        let two = recorder(&bus, EventKind::TransitionStart, &log, 2);
        let _three = recorder(&bus, EventKind::TransitionStart, &log, 3);

        bus.emit(&TransitionEvent::start(false, "A-1"));
        assert_eq!(*log.lock(), vec![1, 2, 3]);

        two.unsubscribe();
        bus.emit(&TransitionEvent::start(false, "B-2"));
        assert_eq!(*log.lock(), vec![1, 2, 3, 1, 3]);
    }

    #[test]
    fn test_events_only_reach_matching_kind() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _start = recorder(&bus, EventKind::TransitionStart, &log, 1);
        let _end = recorder(&bus, EventKind::TransitionEnd, &log, 2);

        bus.emit(&TransitionEvent::end(true, "A-1"));
        assert_eq!(*log.lock(), vec![2]);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let _one = recorder(&bus, EventKind::TransitionStart, &log, 1);
        let _bad = bus.add_listener(EventKind::TransitionStart, |_| panic!("listener failure"));
        let _three = recorder(&bus, EventKind::TransitionStart, &log, 3);

        bus.emit(&TransitionEvent::start(false, "A-1"));
        assert_eq!(*log.lock(), vec![1, 3]);
    }

    #[test]
    fn test_remove_listener_by_id() {
        let bus = EventBus::new();
        let sub = bus.add_listener(EventKind::TransitionEnd, |_| {});
        assert_eq!(bus.listener_count(EventKind::TransitionEnd), 1);

        assert!(!bus.remove_listener(EventKind::TransitionStart, sub.id()));
        assert!(bus.remove_listener(EventKind::TransitionEnd, sub.id()));
        assert_eq!(bus.listener_count(EventKind::TransitionEnd), 0);
    }

    #[test]
    fn test_listener_can_subscribe_during_emit() {
        let bus = EventBus::new();
        let inner = bus.clone();
        let _sub = bus.add_listener(EventKind::TransitionStart, move |_| {
            let _ = inner.add_listener(EventKind::TransitionEnd, |_| {});
        });

        bus.emit(&TransitionEvent::start(false, "A-1"));
        assert_eq!(bus.listener_count(EventKind::TransitionEnd), 1);
    }
}
