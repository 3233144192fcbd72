//! Inbound frame dispatch — parses envelopes and routes `data` payloads to
//! registered listeners by the `type` discriminator.
//!
//! One dispatcher exists per channel domain; listeners registered on the
//! location dispatcher never see chat frames and vice versa. Malformed
//! frames are discarded with a log line, never propagated — a bad frame must
//! not take the connection down.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use skywatch_core::frames::InboundEnvelope;

/// Listener callback invoked with the frame's `data` payload (not the
/// envelope).
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

struct Entry {
    id: u64,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    by_type: HashMap<String, Vec<Entry>>,
}

/// Routes inbound frames to listeners registered per message type.
pub struct Dispatcher {
    registry: Arc<Mutex<Registry>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Register a listener for a message type.
    ///
    /// The same callback may be registered twice; it will then run twice per
    /// matching frame. The returned [`Subscription`] removes exactly the
    /// registration it came from.
    pub fn on(
        &self,
        event_type: impl Into<String>,
        listener: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Subscription {
        let event_type = event_type.into();
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .by_type
            .entry(event_type.clone())
            .or_default()
            .push(Entry {
                id,
                listener: Arc::new(listener),
            });
        Subscription {
            registry: Arc::downgrade(&self.registry),
            event_type,
            id,
        }
    }

    /// Parse a raw text frame and dispatch it.
    ///
    /// Unparsable frames are logged and dropped. Envelopes with a type no
    /// listener registered for are valid and simply go nowhere.
    pub fn dispatch(&self, text: &str) {
        match InboundEnvelope::parse(text) {
            Ok(envelope) => self.emit(&envelope.event_type, &envelope.data),
            Err(e) => warn!(error = %e, "discarding malformed inbound frame"),
        }
    }

    /// Invoke every listener for `event_type`, in registration order.
    ///
    /// A panicking listener is isolated: it is logged and the remaining
    /// listeners still run against an intact registry.
    pub fn emit(&self, event_type: &str, data: &Value) {
        let listeners: Vec<Listener> = {
            let registry = self.registry.lock();
            registry
                .by_type
                .get(event_type)
                .map(|entries| entries.iter().map(|e| Arc::clone(&e.listener)).collect())
                .unwrap_or_default()
        };
        if listeners.is_empty() {
            debug!(event_type, "no listeners for inbound frame");
            return;
        }
        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| (*listener)(data))).is_err() {
                warn!(event_type, "listener panicked, continuing with the rest");
            }
        }
    }

    /// Number of listeners currently registered for a type.
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.registry
            .lock()
            .by_type
            .get(event_type)
            .map_or(0, Vec::len)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer returned by [`Dispatcher::on`].
///
/// Consuming it removes the one registration it belongs to; other listeners
/// for the same type — including other registrations of the same callback —
/// are unaffected. Dropping without calling [`dispose`](Self::dispose)
/// leaves the listener registered.
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    event_type: String,
    id: u64,
}

impl Subscription {
    /// Remove the listener this subscription registered.
    pub fn dispose(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock();
        if let Some(entries) = registry.by_type.get_mut(&self.event_type) {
            if let Some(pos) = entries.iter().position(|e| e.id == self.id) {
                let _ = entries.remove(pos);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&Value) + Send + Sync + Clone) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let listener = move |data: &Value| {
            sink.lock().push(data.to_string());
        };
        (log, listener)
    }

    #[test]
    fn dispatches_data_not_envelope() {
        let dispatcher = Dispatcher::new();
        let (log, listener) = recorder();
        let _sub = dispatcher.on("location_update", listener);

        dispatcher.dispatch(r#"{"type":"location_update","data":{"user_id":"u1"}}"#);

        let log = log.lock();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0], r#"{"user_id":"u1"}"#);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let dispatcher = Dispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|i| {
                let order = Arc::clone(&order);
                dispatcher.on("t", move |_| order.lock().push(i))
            })
            .collect();

        dispatcher.emit("t", &Value::Null);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn malformed_frame_is_discarded() {
        let dispatcher = Dispatcher::new();
        let (log, listener) = recorder();
        let _sub = dispatcher.on("location_update", listener);

        dispatcher.dispatch("{this is not json");
        dispatcher.dispatch(r#"{"missing":"type"}"#);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn unrecognized_type_matches_zero_listeners() {
        let dispatcher = Dispatcher::new();
        let (log, listener) = recorder();
        let _sub = dispatcher.on("location_update", listener);

        // Valid envelope, unknown type: not an error, nothing invoked.
        dispatcher.dispatch(r#"{"type":"report_new","data":{}}"#);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn dispose_removes_only_that_registration() {
        let dispatcher = Dispatcher::new();
        let (log_a, listener_a) = recorder();
        let (log_b, listener_b) = recorder();
        let sub_a = dispatcher.on("t", listener_a);
        let _sub_b = dispatcher.on("t", listener_b);

        sub_a.dispose();
        dispatcher.emit("t", &Value::Null);

        assert!(log_a.lock().is_empty());
        assert_eq!(log_b.lock().len(), 1);
    }

    #[test]
    fn duplicate_registration_invoked_twice_removed_once() {
        let dispatcher = Dispatcher::new();
        let (log, listener) = recorder();
        let sub_first = dispatcher.on("t", listener.clone());
        let _sub_second = dispatcher.on("t", listener);

        dispatcher.emit("t", &Value::Null);
        assert_eq!(log.lock().len(), 2);

        // Disposing one registration leaves the other active.
        sub_first.dispose();
        dispatcher.emit("t", &Value::Null);
        assert_eq!(log.lock().len(), 3);
        assert_eq!(dispatcher.listener_count("t"), 1);
    }

    #[test]
    fn panicking_listener_does_not_stop_the_rest() {
        let dispatcher = Dispatcher::new();
        let (log, listener) = recorder();
        let _sub_panic = dispatcher.on("t", |_| panic!("listener bug"));
        let _sub_ok = dispatcher.on("t", listener);

        dispatcher.emit("t", &Value::Null);
        assert_eq!(log.lock().len(), 1);

        // Registry still intact afterwards.
        assert_eq!(dispatcher.listener_count("t"), 2);
        dispatcher.emit("t", &Value::Null);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn dispose_after_dispatcher_dropped_is_harmless() {
        let dispatcher = Dispatcher::new();
        let (_log, listener) = recorder();
        let sub = dispatcher.on("t", listener);
        drop(dispatcher);
        sub.dispose();
    }

    #[test]
    fn listener_count_tracks_registrations() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.listener_count("t"), 0);
        let (_log, listener) = recorder();
        let sub = dispatcher.on("t", listener);
        assert_eq!(dispatcher.listener_count("t"), 1);
        sub.dispose();
        assert_eq!(dispatcher.listener_count("t"), 0);
    }
}
