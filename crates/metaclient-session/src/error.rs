//! Error types for the session layer.

use metaclient_protocol::ProtocolError;
use metaclient_transport::TransportError;

use crate::SessionState;

/// Errors that can occur while driving a metaserver session.
///
/// Most of these never reach the caller during normal operation: broken
/// connections and missed replies schedule a relogin inside
/// [`Session::pump`](crate::Session::pump), and the user is told about them
/// through system chat. They are returned from the explicit operations
/// (`login`, `relogin`, `join_game`, ...) so callers can react too.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The socket could not be opened, read, or written.
    #[error(transparent)]
    Connection(#[from] TransportError),

    /// The server sent something we could not make sense of.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server explicitly refused a request (bad password, name taken,
    /// unsupported protocol version, ...).
    #[error("metaserver rejected {command}: {reason}")]
    ServerRejected {
        /// The command that was refused.
        command: String,
        /// The server's reason code.
        reason: String,
    },

    /// No reply arrived before the deadline.
    #[error("no answer from the metaserver to {command}")]
    Timeout {
        /// The command we were waiting on.
        command: String,
    },

    /// The operation is not allowed in the current state, e.g. joining a
    /// game while offline.
    #[error("{operation} is not allowed while {state}")]
    InvalidState {
        /// What the caller tried to do.
        operation: &'static str,
        /// The state the session was in.
        state: SessionState,
    },
}
