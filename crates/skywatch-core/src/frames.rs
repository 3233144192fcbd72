//! Wire frames for both channel domains.
//!
//! Every frame is one JSON text message on the socket. Outbound frames carry
//! a `type` discriminator; the handshake is the single untagged exception,
//! sent once as the first frame after connect. Inbound frames arrive as a
//! `{type, data}` envelope and are decoded to typed payloads by listeners.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{ChannelId, ReportId, UserId};
use crate::payloads::Visibility;

/// First client→server frame after connect, carrying the bearer token.
///
/// The server validates it and, on rejection, simply closes the connection
/// (close code 4001); there is no in-band auth-failure message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeFrame {
    /// Opaque bearer token from the auth collaborator.
    pub token: String,
}

impl HandshakeFrame {
    /// Build a handshake frame for the given token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Client→server frame, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Position sample from the local spotter.
    LocationUpdate {
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
        /// Meters above sea level.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        altitude: Option<f64>,
        /// Fix accuracy in meters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accuracy: Option<f64>,
        /// Heading in degrees (0–360).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heading: Option<f64>,
        /// Speed in meters per second.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speed: Option<f64>,
        /// Who may see this sample; the server falls back to the account
        /// preference when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        visibility: Option<Visibility>,
    },
    /// Stop broadcasting the local position.
    StopSharing,
    /// Chat message. The protocol expects exactly one of `channel_id` /
    /// `recipient_id`; the server is the authority on that constraint.
    Message {
        /// Message body.
        content: String,
        /// Target channel.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<ChannelId>,
        /// Direct-message recipient.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_id: Option<UserId>,
        /// Optional attached position.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        latitude: Option<f64>,
        /// Optional attached position.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        longitude: Option<f64>,
        /// Optional linked incident report.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        report_id: Option<ReportId>,
    },
    /// Subscribe to a channel's messages.
    JoinChannel {
        /// Channel to join.
        channel_id: ChannelId,
    },
    /// Unsubscribe from a channel's messages.
    LeaveChannel {
        /// Channel to leave.
        channel_id: ChannelId,
    },
}

/// Server→client envelope, common to both channel domains.
///
/// Only the discriminator is interpreted here; the `data` object is handed
/// to listeners as-is. Unrecognized types are valid envelopes that simply
/// match zero listeners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundEnvelope {
    /// Event type (e.g. `location_update`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload, passed to listeners without the envelope.
    pub data: Value,
}

impl InboundEnvelope {
    /// Parse a raw text frame into an envelope.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
