//! # skywatch-core
//!
//! Foundation types for the Skywatch realtime client.
//!
//! This crate provides the shared vocabulary the transport crates depend on:
//!
//! - **Branded IDs**: `UserId`, `ChannelId`, `MessageId`, `ReportId` as newtypes
//! - **Frames**: the outbound frame enum, the handshake frame, and the inbound envelope
//! - **Payloads**: typed `location_update` / `location_stopped` / `chat_message` data
//! - **Snapshot**: the live spotter snapshot and its pure reconciler
//! - **Backoff**: exponential reconnect delay math
//!
//! Everything here is sync and side-effect free. The async transport that
//! drives these types lives in `skywatch-realtime` (which has access to
//! tokio); this crate contains the portable building blocks.

#![deny(unsafe_code)]

pub mod backoff;
pub mod frames;
pub mod ids;
pub mod payloads;
pub mod snapshot;

pub use backoff::{ReconnectConfig, backoff_delay_ms};
pub use frames::{HandshakeFrame, InboundEnvelope, OutboundFrame};
pub use ids::{ChannelId, MessageId, ReportId, UserId};
pub use payloads::{
    ChatMessagePayload, LocationStoppedPayload, LocationUpdatePayload, Role, SenderInfo,
    Visibility,
};
pub use snapshot::{SpotterFeature, SpotterSnapshot};
