//! Location channel session — periodic position broadcast.
//!
//! `start_sharing` opens the location connection, samples once immediately,
//! and then resamples on a fixed interval until `stop_sharing`. Stopping
//! cancels the schedule and announces `stop_sharing` on the wire but leaves
//! the connection itself open; connection and sharing have independent
//! lifecycles.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use skywatch_core::frames::OutboundFrame;
use skywatch_core::payloads::Visibility;
use skywatch_settings::SkywatchSettings;

use crate::connection::Connection;
use crate::geo::GeolocationProvider;

/// Drives position sharing over a location-domain [`Connection`].
pub struct LocationSession {
    connection: Connection,
    provider: Arc<dyn GeolocationProvider>,
    sample_interval: Duration,
    default_visibility: Visibility,
    /// Cancellation for the active periodic task, if sharing.
    sharing: Mutex<Option<CancellationToken>>,
}

impl LocationSession {
    /// Create a session over an existing location connection.
    #[must_use]
    pub fn new(
        connection: Connection,
        provider: Arc<dyn GeolocationProvider>,
        sample_interval: Duration,
        default_visibility: Visibility,
    ) -> Self {
        Self {
            connection,
            provider,
            sample_interval,
            default_visibility,
            sharing: Mutex::new(None),
        }
    }

    /// Create a session with interval and visibility from settings.
    #[must_use]
    pub fn from_settings(
        connection: Connection,
        provider: Arc<dyn GeolocationProvider>,
        settings: &SkywatchSettings,
    ) -> Self {
        Self::new(
            connection,
            provider,
            Duration::from_secs(settings.realtime.sample_interval_secs.max(1)),
            settings.location.default_visibility,
        )
    }

    /// The connection this session shares over.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Whether a periodic sharing schedule is currently active.
    #[must_use]
    pub fn is_sharing(&self) -> bool {
        self.sharing.lock().is_some()
    }

    /// Begin sharing: connect, send one sample now, then resample
    /// periodically. A no-op when already sharing.
    pub async fn start_sharing(&self, visibility: Option<Visibility>) {
        let cancel = {
            let mut sharing = self.sharing.lock();
            if sharing.is_some() {
                debug!("already sharing location");
                return;
            }
            let cancel = CancellationToken::new();
            *sharing = Some(cancel.clone());
            cancel
        };

        self.connection.connect().await;
        let visibility = visibility.unwrap_or(self.default_visibility);
        info!(?visibility, "started sharing location");

        sample_and_send(&self.connection, self.provider.as_ref(), visibility).await;

        let connection = self.connection.clone();
        let provider = Arc::clone(&self.provider);
        let period = self.sample_interval;
        drop(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The immediate tick duplicates the sample just sent.
            let _ = interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        sample_and_send(&connection, provider.as_ref(), visibility).await;
                    }
                    () = cancel.cancelled() => break,
                }
            }
        }));
    }

    /// Stop sharing: cancel the schedule and announce it once. Idempotent;
    /// the connection stays open.
    pub fn stop_sharing(&self) {
        let Some(cancel) = self.sharing.lock().take() else {
            return;
        };
        cancel.cancel();
        let _ = self.connection.send(&OutboundFrame::StopSharing);
        info!("stopped sharing location");
    }
}

/// Sample once and send the result; failures are logged and skipped so the
/// periodic schedule keeps running.
async fn sample_and_send(
    connection: &Connection,
    provider: &dyn GeolocationProvider,
    visibility: Visibility,
) {
    match provider.current_position().await {
        Ok(position) => {
            let _ = connection.send(&OutboundFrame::LocationUpdate {
                latitude: position.latitude,
                longitude: position.longitude,
                altitude: position.altitude,
                accuracy: position.accuracy,
                heading: position.heading,
                speed: position.speed,
                visibility: Some(visibility),
            });
        }
        Err(e) => warn!(error = %e, "position sample failed, skipping"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
