//! One physical connection plus the buffer that reassembles its packets.

use metaclient_protocol::{Deserializer, Packet, ProtocolError};
use metaclient_transport::{Connection, ConnectionId, RecvStatus, TransportError};

use crate::SessionError;

/// Size of the scratch buffer for a single non-blocking read.
const READ_CHUNK: usize = 4096;

/// A live connection and its read buffer.
///
/// Owned exclusively by the [`Session`](crate::Session). A reconnect
/// throws the whole handle away and builds a new one; nothing carries over
/// from the old socket, not even half-received frames.
pub(crate) struct ConnectionHandle<T: Connection> {
    conn: T,
    deserializer: Deserializer,
}

impl<T: Connection> ConnectionHandle<T> {
    pub(crate) fn new(conn: T, max_frame_len: usize) -> Self {
        Self {
            conn,
            deserializer: Deserializer::new(max_frame_len),
        }
    }

    pub(crate) fn id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// Encodes and sends one packet.
    pub(crate) async fn send(&mut self, packet: &Packet) -> Result<(), SessionError> {
        let bytes = packet.encode()?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    /// Moves everything the socket has right now into the deserializer.
    ///
    /// Never waits. A zero-byte read is recorded as closure on the
    /// deserializer instead of being reported here, so packets that arrived
    /// just before the close are still delivered first.
    pub(crate) fn poll_read(&mut self) -> Result<(), TransportError> {
        let mut chunk = [0u8; READ_CHUNK];
        while !self.deserializer.is_closed() {
            match self.conn.try_recv(&mut chunk)? {
                RecvStatus::Data(n) => self.deserializer.feed(&chunk[..n]),
                RecvStatus::Pending => break,
                RecvStatus::Closed => self.deserializer.mark_closed(),
            }
        }
        Ok(())
    }

    pub(crate) fn next_packet(&mut self) -> Result<Option<Packet>, ProtocolError> {
        self.deserializer.next_packet()
    }

    /// `true` once the peer closed and every complete packet was taken.
    pub(crate) fn is_closed_and_drained(&self) -> bool {
        self.deserializer.is_closed_and_drained()
    }

    /// Waits until the socket has something to report.
    pub(crate) async fn readable(&self) -> Result<(), TransportError> {
        if self.deserializer.is_closed() || self.deserializer.has_packet() {
            return Ok(());
        }
        self.conn.readable().await
    }

    pub(crate) async fn close(&mut self) {
        self.conn.close().await;
    }
}
