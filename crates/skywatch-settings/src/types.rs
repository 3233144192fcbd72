//! Settings type definitions.

use serde::{Deserialize, Serialize};

use skywatch_core::backoff::ReconnectConfig;
use skywatch_core::payloads::Visibility;

/// Root settings object persisted as `~/.skywatch/settings.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkywatchSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Realtime transport settings.
    pub realtime: RealtimeSettings,
    /// Location sharing settings.
    pub location: LocationSettings,
}

impl Default for SkywatchSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "skywatch".to_string(),
            realtime: RealtimeSettings::default(),
            location: LocationSettings::default(),
        }
    }
}

/// Realtime transport settings, shared by both channel domains.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeSettings {
    /// WebSocket endpoint of the location channel.
    pub location_url: String,
    /// WebSocket endpoint of the chat channel.
    pub chat_url: String,
    /// Per-domain reconnect policy parameters.
    pub reconnect: ReconnectConfig,
    /// Seconds between periodic position samples while sharing.
    pub sample_interval_secs: u64,
    /// Depth of the outbound send queue per connection.
    pub send_queue_depth: usize,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            location_url: "ws://127.0.0.1:8000/api/v1/locations/ws".to_string(),
            chat_url: "ws://127.0.0.1:8000/api/v1/messages/ws".to_string(),
            reconnect: ReconnectConfig::default(),
            sample_interval_secs: 10,
            send_queue_depth: 256,
        }
    }
}

/// Location sharing settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationSettings {
    /// Visibility sent with position samples when the caller does not
    /// specify one.
    pub default_visibility: Visibility,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
