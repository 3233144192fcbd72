//! Chat channel session — channel membership and message send.
//!
//! Join/leave/send are pure outbound signals; the server owns membership and
//! decides which `chat_message` events this client receives afterwards.
//! Nothing is filtered locally beyond what a listener chooses to do with
//! `channel_id`.

use serde_json::Value;
use tracing::warn;

use skywatch_core::frames::OutboundFrame;
use skywatch_core::ids::{ChannelId, ReportId, UserId};
use skywatch_core::payloads::ChatMessagePayload;

use crate::connection::Connection;
use crate::dispatcher::Subscription;

/// A message about to be sent.
///
/// The protocol expects exactly one of channel / recipient; that constraint
/// is the server's to enforce, not validated here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutgoingMessage {
    /// Message body.
    pub content: String,
    /// Target channel.
    pub channel_id: Option<ChannelId>,
    /// Direct-message recipient.
    pub recipient_id: Option<UserId>,
    /// Attached position as `(latitude, longitude)`.
    pub position: Option<(f64, f64)>,
    /// Linked incident report.
    pub report_id: Option<ReportId>,
}

impl OutgoingMessage {
    /// Message to a channel.
    #[must_use]
    pub fn to_channel(content: impl Into<String>, channel_id: ChannelId) -> Self {
        Self {
            content: content.into(),
            channel_id: Some(channel_id),
            ..Self::default()
        }
    }

    /// Direct message to a user.
    #[must_use]
    pub fn direct(content: impl Into<String>, recipient_id: UserId) -> Self {
        Self {
            content: content.into(),
            recipient_id: Some(recipient_id),
            ..Self::default()
        }
    }

    /// Attach the sender's position.
    #[must_use]
    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.position = Some((latitude, longitude));
        self
    }

    /// Link an incident report.
    #[must_use]
    pub fn with_report(mut self, report_id: ReportId) -> Self {
        self.report_id = Some(report_id);
        self
    }
}

/// Drives chat over a chat-domain [`Connection`].
pub struct ChatSession {
    connection: Connection,
}

impl ChatSession {
    /// Create a session over an existing chat connection.
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// The connection this session speaks over.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Open the chat connection.
    pub async fn connect(&self) {
        self.connection.connect().await;
    }

    /// Ask the server to subscribe this client to a channel.
    pub fn join_channel(&self, channel_id: &ChannelId) -> bool {
        self.connection.send(&OutboundFrame::JoinChannel {
            channel_id: channel_id.clone(),
        })
    }

    /// Ask the server to unsubscribe this client from a channel.
    pub fn leave_channel(&self, channel_id: &ChannelId) -> bool {
        self.connection.send(&OutboundFrame::LeaveChannel {
            channel_id: channel_id.clone(),
        })
    }

    /// Send a message. Best-effort like every outbound frame.
    pub fn send_message(&self, message: OutgoingMessage) -> bool {
        let (latitude, longitude) = match message.position {
            Some((lat, lon)) => (Some(lat), Some(lon)),
            None => (None, None),
        };
        self.connection.send(&OutboundFrame::Message {
            content: message.content,
            channel_id: message.channel_id,
            recipient_id: message.recipient_id,
            latitude,
            longitude,
            report_id: message.report_id,
        })
    }

    /// Register a typed listener for inbound chat messages.
    ///
    /// Payloads that fail to decode are logged and skipped; the raw
    /// dispatcher remains available via [`Connection::dispatcher`] for
    /// consumers that want the untyped `data`.
    pub fn on_message(
        &self,
        listener: impl Fn(ChatMessagePayload) + Send + Sync + 'static,
    ) -> Subscription {
        self.connection
            .dispatcher()
            .on("chat_message", move |data: &Value| {
                match serde_json::from_value::<ChatMessagePayload>(data.clone()) {
                    Ok(payload) => listener(payload),
                    Err(e) => warn!(error = %e, "chat_message payload failed to decode"),
                }
            })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
