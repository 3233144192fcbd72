//! Transport error types.
//!
//! None of these escape to consumers as panics or exceptions: the connection
//! layer logs them and either gives up (missing credentials) or hands the
//! failure to the reconnect policy (socket trouble).

use thiserror::Error;

/// Errors raised while dialing or driving a channel socket.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No bearer token was available at connect time. Terminal for the
    /// attempt; retrying without credentials cannot succeed.
    #[error("no bearer token available")]
    MissingCredentials,

    /// The underlying websocket failed (dial, handshake write, or mid-stream).
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    /// An outbound frame failed to encode.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether the reconnect policy should see this failure.
    ///
    /// Missing credentials are not retryable — nothing changes until the
    /// auth collaborator deposits a token and someone calls connect again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MissingCredentials)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_credentials_not_retryable() {
        assert!(!TransportError::MissingCredentials.is_retryable());
    }

    #[test]
    fn socket_errors_are_retryable() {
        let err = TransportError::Socket(tokio_tungstenite::tungstenite::Error::ConnectionClosed);
        assert!(err.is_retryable());
    }

    #[test]
    fn encode_errors_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: TransportError = json_err.into();
        assert_matches!(err, TransportError::Encode(_));
        assert!(err.to_string().contains("encode"));
    }
}
