//! Wire protocol for the metaserver client.
//!
//! This crate defines the "language" that the lobby client and the
//! metaserver speak:
//!
//! - **Codec** ([`encode_frame`], [`decode_frame`]): how a list of strings
//!   becomes one length-prefixed frame and back.
//! - **Packets** ([`Packet`], [`FieldReader`]): building outgoing packets
//!   and reading typed fields out of incoming ones.
//! - **Deserializer** ([`Deserializer`]): reassembling frames from a byte
//!   stream that arrives in arbitrary chunks.
//! - **Commands** ([`Command`]): the command vocabulary.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (state machine). It doesn't know about sockets or login state; it only
//! knows how to frame and unframe strings.
//!
//! ```text
//! Transport (bytes) → Protocol (Packet) → Session (state machine)
//! ```

mod codec;
mod command;
mod deserializer;
mod error;
mod packet;

pub use codec::{
    HEADER_LEN, MAX_FRAME_LEN, decode_bool, decode_frame, encode_bool,
    encode_frame, peek_frame_len,
};
pub use command::{Command, UnknownCommand};
pub use deserializer::Deserializer;
pub use error::ProtocolError;
pub use packet::{FieldReader, Packet};
