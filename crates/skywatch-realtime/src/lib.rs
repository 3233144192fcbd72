//! # skywatch-realtime
//!
//! Realtime transport core for the Skywatch client.
//!
//! Two independently multiplexed live channels — continuous position
//! broadcast and chat — over websockets, with:
//!
//! - **Connections**: one owned socket per channel domain, replaced on every
//!   reconnect, with an authenticated first-frame handshake
//! - **Dispatch**: per-type listener registry with disposer-based removal
//! - **Reconnection**: per-domain exponential backoff, bounded attempts
//! - **Sessions**: periodic position sharing; channel join/leave and
//!   message send
//! - **Tracking**: reconciliation of partial location updates into a live
//!   snapshot of active spotters
//!
//! Everything is fire-and-forget on one cooperative event loop: no call
//! blocks its caller, results surface through dispatcher listeners, and
//! transport failures never reach consumers as panics.

#![deny(unsafe_code)]

pub mod chat;
pub mod connection;
pub mod dispatcher;
pub mod errors;
pub mod geo;
pub mod location;
pub mod reconnect;
pub mod tracker;

pub use chat::{ChatSession, OutgoingMessage};
pub use connection::{ChannelDomain, Connection, ConnectionConfig, Lifecycle};
pub use dispatcher::{Dispatcher, Listener, Subscription};
pub use errors::TransportError;
pub use geo::{GeolocationError, GeolocationProvider, Position};
pub use location::LocationSession;
pub use reconnect::ReconnectPolicy;
pub use tracker::SpotterTracker;
