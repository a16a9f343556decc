//! Stream reassembly: turns arbitrary socket reads into whole packets.
//!
//! TCP is a byte stream, not a message stream. One read may return half a
//! packet, exactly one packet, or three and a bit. The [`Deserializer`]
//! buffers whatever it is fed and hands out a [`Packet`] only once every
//! byte of its frame has arrived. The leftover tail stays buffered for the
//! next [`feed`](Deserializer::feed).
//!
//! # Closure ordering
//!
//! A metaserver commonly sends `DISCONNECT` and then closes the socket, so
//! the final read carries a packet *and* the end-of-stream. The deserializer
//! records closure with [`mark_closed`](Deserializer::mark_closed) but
//! [`is_closed_and_drained`](Deserializer::is_closed_and_drained) only
//! reports it after every complete packet has been taken out. That way the
//! caller always sees the `DISCONNECT` before it sees the closure.

use crate::codec::{HEADER_LEN, MAX_FRAME_LEN, decode_frame, peek_frame_len};
use crate::{Packet, ProtocolError};

/// Buffers partial reads and yields complete packets.
#[derive(Debug, Clone)]
pub struct Deserializer {
    buf: Vec<u8>,
    max_frame_len: usize,
    closed: bool,
}

impl Default for Deserializer {
    fn default() -> Self {
        Self::new(MAX_FRAME_LEN)
    }
}

impl Deserializer {
    /// Creates an empty deserializer that rejects frames longer than
    /// `max_frame_len` bytes.
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_frame_len: max_frame_len.clamp(HEADER_LEN, MAX_FRAME_LEN),
            closed: false,
        }
    }

    /// Appends freshly read bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Removes and returns the next complete packet, if one is buffered.
    ///
    /// # Errors
    /// Returns [`ProtocolError::MalformedPacket`] if the next frame declares
    /// a length below the header size or above the configured maximum, or
    /// if its contents do not decode. The stream cannot be resynchronised
    /// after that, so callers should drop the connection.
    pub fn next_packet(&mut self) -> Result<Option<Packet>, ProtocolError> {
        let Some(len) = self.complete_frame_len()? else {
            return Ok(None);
        };
        let fields = decode_frame(&self.buf[..len]);
        self.buf.drain(..len);
        Ok(Some(Packet::from_fields(fields?)))
    }

    /// Returns `true` if at least one complete frame is buffered.
    pub fn has_packet(&self) -> bool {
        matches!(self.complete_frame_len(), Ok(Some(_)))
    }

    /// Records that the peer closed the stream.
    pub fn mark_closed(&mut self) {
        self.closed = true;
    }

    /// `true` once closure was recorded, even if packets remain buffered.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` once closure was recorded **and** no complete packet is left.
    ///
    /// A trailing partial frame does not hold closure back: it can never be
    /// completed.
    pub fn is_closed_and_drained(&self) -> bool {
        self.closed && !self.has_packet()
    }

    /// Number of bytes buffered but not yet returned as packets.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Length of the complete frame at the front of the buffer.
    fn complete_frame_len(&self) -> Result<Option<usize>, ProtocolError> {
        let Some(len) = peek_frame_len(&self.buf) else {
            return Ok(None);
        };
        if len < HEADER_LEN || len > self.max_frame_len {
            return Err(ProtocolError::MalformedPacket(format!(
                "declared frame length {len} outside {HEADER_LEN}..={}",
                self.max_frame_len
            )));
        }
        if self.buf.len() < len {
            return Ok(None);
        }
        Ok(Some(len))
    }
}
