//! Live spotter tracker — wires the snapshot reconciler to a dispatcher.
//!
//! Subscribes to `location_update` and `location_stopped` on the location
//! domain's dispatcher and maintains the deduplicated snapshot the map
//! renders from. Mutation happens only inside dispatcher callbacks (the
//! event loop); readers get an owned copy and never block the stream.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::warn;

use skywatch_core::payloads::{LocationStoppedPayload, LocationUpdatePayload};
use skywatch_core::snapshot::SpotterSnapshot;

use crate::dispatcher::{Dispatcher, Subscription};

/// Maintains the live snapshot of currently active spotters.
pub struct SpotterTracker {
    state: Arc<Mutex<SpotterSnapshot>>,
    subscriptions: Vec<Subscription>,
}

impl SpotterTracker {
    /// Attach to a dispatcher, consuming position events from now on.
    #[must_use]
    pub fn attach(dispatcher: &Dispatcher) -> Self {
        let state = Arc::new(Mutex::new(SpotterSnapshot::new()));

        let updates = {
            let state = Arc::clone(&state);
            dispatcher.on("location_update", move |data: &Value| {
                match serde_json::from_value::<LocationUpdatePayload>(data.clone()) {
                    Ok(update) => {
                        let mut snapshot = state.lock();
                        *snapshot = snapshot.apply_update(&update);
                    }
                    Err(e) => warn!(error = %e, "location_update payload failed to decode"),
                }
            })
        };

        let stops = {
            let state = Arc::clone(&state);
            dispatcher.on("location_stopped", move |data: &Value| {
                match serde_json::from_value::<LocationStoppedPayload>(data.clone()) {
                    Ok(stop) => {
                        let mut snapshot = state.lock();
                        *snapshot = snapshot.apply_stopped(stop.user_id.as_str());
                    }
                    Err(e) => warn!(error = %e, "location_stopped payload failed to decode"),
                }
            })
        };

        Self {
            state,
            subscriptions: vec![updates, stops],
        }
    }

    /// Owned copy of the current snapshot, safe to hand to a renderer.
    #[must_use]
    pub fn snapshot(&self) -> SpotterSnapshot {
        self.state.lock().clone()
    }

    /// Fold the REST collaborator's initial active-spotters response under
    /// whatever has already streamed in (streamed state wins per identity).
    pub fn merge_initial(&self, feature_collection: &Value) {
        let initial = SpotterSnapshot::from_feature_collection(feature_collection);
        let mut snapshot = self.state.lock();
        *snapshot = snapshot.merge(&initial);
    }

    /// Unsubscribe from the dispatcher, freezing the snapshot.
    pub fn detach(self) {
        for subscription in self.subscriptions {
            subscription.dispose();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
