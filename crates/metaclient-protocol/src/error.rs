//! Error types for the protocol layer.
//!
//! Everything that can go wrong between "we have bytes" and "we have a
//! well-formed command with well-typed fields" lands here. Transport
//! failures live in `metaclient-transport`; state-machine failures live in
//! `metaclient-session`.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A frame could not be decoded: bad declared length, a string that
    /// runs past the frame boundary, or invalid UTF-8.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// A value could not be encoded into a frame (embedded NUL, or the
    /// frame would not fit the 16-bit length prefix).
    #[error("cannot encode packet: {0}")]
    Encode(String),

    /// A packet ended before a required field.
    #[error("packet is missing the {0} field")]
    MissingField(&'static str),

    /// A boolean field was something other than `"true"` or `"false"`.
    #[error("unable to determine truth value for \"{0}\"")]
    InvalidBool(String),

    /// A numeric field did not parse.
    #[error("invalid number \"{value}\" in {field} field")]
    InvalidNumber {
        /// Which field was being read.
        field: &'static str,
        /// The raw text received.
        value: String,
    },

    /// A chat message carried an unknown delivery type.
    #[error("invalid chat message type \"{0}\"")]
    InvalidChatType(String),

    /// The peer sent a command that makes no sense in the current state.
    /// This usually means the server speaks a different protocol version.
    #[error("unexpected {command} command while {state}")]
    UnexpectedCommand {
        /// The command name as received.
        command: String,
        /// Human-readable description of the local state.
        state: String,
    },
}
