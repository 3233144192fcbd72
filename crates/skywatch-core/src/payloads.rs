//! Typed inbound payloads and shared wire enums.
//!
//! Inbound frames arrive as an envelope (`{"type": ..., "data": {...}}`);
//! these are the typed shapes of the `data` object for the recognized types.
//! Timestamps are carried as opaque strings — the server emits naive ISO-8601
//! and the client never does arithmetic on them.

use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, MessageId, ReportId, UserId};

/// Who may see a shared location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to everyone, including anonymous viewers.
    #[default]
    Public,
    /// Visible to verified spotters and above.
    Verified,
    /// Visible to coordinators and admins only.
    Coordinators,
}

/// User role, as carried on location and message payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unverified spotter.
    Spotter,
    /// Spotter verified by a coordinator.
    VerifiedSpotter,
    /// Net coordinator.
    Coordinator,
    /// Administrator.
    Admin,
}

/// Data of an inbound `location_update` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdatePayload {
    /// Originating user. The broadcast always carries it; kept optional so a
    /// partial payload still decodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Display callsign, used as the identity fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    /// Sender role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Meters above sea level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Fix accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Heading in degrees (0–360).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Speed in meters per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Server-side sample time (opaque ISO-8601 string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl LocationUpdatePayload {
    /// Stable identity used to deduplicate features: the user ID, falling
    /// back to the callsign. `None` when the payload carries neither.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.user_id
            .as_ref()
            .map(UserId::as_str)
            .or(self.callsign.as_deref())
    }
}

/// Data of an inbound `location_stopped` event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStoppedPayload {
    /// The user who stopped sharing.
    pub user_id: UserId,
}

/// Sender block embedded in a chat message payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    /// Sender user ID.
    pub id: UserId,
    /// Sender callsign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
    /// Sender role.
    pub role: Role,
}

/// Data of an inbound `chat_message` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    /// Message ID.
    pub id: MessageId,
    /// Message body.
    pub content: String,
    /// Sender info.
    pub sender: SenderInfo,
    /// Channel the message was posted to (absent for direct messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    /// Direct-message recipient (absent for channel messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<UserId>,
    /// Optional attached position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Optional attached position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Optional linked incident report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<ReportId>,
    /// Creation time (opaque ISO-8601 string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last edit time, if edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_wire_names() {
        assert_eq!(
            serde_json::to_string(&Visibility::Public).unwrap(),
            "\"public\""
        );
        assert_eq!(
            serde_json::to_string(&Visibility::Coordinators).unwrap(),
            "\"coordinators\""
        );
        let v: Visibility = serde_json::from_str("\"verified\"").unwrap();
        assert_eq!(v, Visibility::Verified);
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::VerifiedSpotter).unwrap(),
            "\"verified_spotter\""
        );
        let r: Role = serde_json::from_str("\"coordinator\"").unwrap();
        assert_eq!(r, Role::Coordinator);
    }

    #[test]
    fn location_update_decodes_broadcast_shape() {
        // Shape the server broadcasts to location clients.
        let json = r#"{
            "user_id": "u1",
            "callsign": "W5ABC",
            "role": "spotter",
            "latitude": 35.0,
            "longitude": -97.0,
            "altitude": 370.5,
            "heading": 210.0,
            "speed": 12.4,
            "timestamp": "2026-04-02T18:25:43.511"
        }"#;
        let p: LocationUpdatePayload = serde_json::from_str(json).unwrap();
        assert_eq!(p.identity(), Some("u1"));
        assert_eq!(p.latitude, 35.0);
        assert_eq!(p.role, Some(Role::Spotter));
        assert!(p.accuracy.is_none());
    }

    #[test]
    fn identity_falls_back_to_callsign() {
        let p: LocationUpdatePayload = serde_json::from_str(
            r#"{"callsign": "KD5XYZ", "latitude": 1.0, "longitude": 2.0}"#,
        )
        .unwrap();
        assert_eq!(p.identity(), Some("KD5XYZ"));
    }

    #[test]
    fn identity_none_when_anonymous() {
        let p: LocationUpdatePayload =
            serde_json::from_str(r#"{"latitude": 1.0, "longitude": 2.0}"#).unwrap();
        assert_eq!(p.identity(), None);
    }

    #[test]
    fn chat_message_decodes_channel_shape() {
        let json = r#"{
            "id": "m1",
            "content": "wall cloud SW of Minco",
            "sender": {"id": "u2", "callsign": "N0CALL", "role": "verified_spotter"},
            "channel_id": "c9",
            "recipient_id": null,
            "latitude": 35.27,
            "longitude": -97.95,
            "created_at": "2026-04-02T18:26:00.000"
        }"#;
        let p: ChatMessagePayload = serde_json::from_str(json).unwrap();
        assert_eq!(p.sender.role, Role::VerifiedSpotter);
        assert_eq!(p.channel_id.as_deref(), Some("c9"));
        assert!(p.recipient_id.is_none());
        assert!(p.edited_at.is_none());
    }

    #[test]
    fn location_stopped_decodes() {
        let p: LocationStoppedPayload = serde_json::from_str(r#"{"user_id": "u7"}"#).unwrap();
        assert_eq!(p.user_id.as_str(), "u7");
    }
}
