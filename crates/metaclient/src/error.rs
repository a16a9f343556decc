//! Unified error type for the metaclient crates.

use metaclient_protocol::ProtocolError;
use metaclient_session::SessionError;
use metaclient_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Applications using the `metaclient` crate deal with this single error
/// type. The `#[from]` attributes let `?` convert the layer errors.
#[derive(Debug, thiserror::Error)]
pub enum MetaclientError {
    /// A transport-level error (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (framing, field parsing).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (rejected login, timeout, wrong state).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A config file could not be read.
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// A config file is not valid JSON or has a field of the wrong type.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use metaclient_session::SessionState;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: MetaclientError = err.into();
        assert!(matches!(top, MetaclientError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::MissingField("client name");
        let top: MetaclientError = err.into();
        assert!(matches!(top, MetaclientError::Protocol(_)));
        assert!(top.to_string().contains("client name"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::InvalidState {
            operation: "join_game",
            state: SessionState::Offline,
        };
        let top: MetaclientError = err.into();
        assert!(matches!(top, MetaclientError::Session(_)));
        assert_eq!(top.to_string(), "join_game is not allowed while offline");
    }

    #[test]
    fn test_from_config_error() {
        let err = metaclient_session::SessionConfig::from_json_str("{ nope").unwrap_err();
        let top: MetaclientError = err.into();
        assert!(matches!(top, MetaclientError::Config(_)));
    }
}
