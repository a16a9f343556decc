//! Transport abstraction layer for the metaserver client.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! how a byte stream to the metaserver is opened and driven, plus the
//! default TCP implementation ([`TcpConnector`], [`TcpConnection`]).
//!
//! The session layer is poll-driven: it never blocks waiting for bytes
//! except inside the bounded login handshake. That is why [`Connection`]
//! splits reading into a non-blocking [`Connection::try_recv`] and an async
//! [`Connection::readable`] readiness wait.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{TcpConnection, TcpConnector};

use std::fmt;

/// Opaque identifier for a connection.
///
/// Every physical connection gets a fresh id, so the session can tell an old
/// socket apart from the one that replaced it after a reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Result of a single non-blocking read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvStatus {
    /// `n` bytes were copied into the caller's buffer.
    Data(usize),
    /// Nothing is available right now; try again later.
    Pending,
    /// The peer shut the connection down (zero-byte read).
    Closed,
}

/// Opens connections to a metaserver.
pub trait Connector: 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Opens a new connection to `host:port`.
    async fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Self::Connection, TransportError>;
}

/// A single connection that can send and receive bytes.
pub trait Connection: 'static {
    /// Sends all of `data` to the remote peer.
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Copies whatever is currently available into `buf` without waiting.
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<RecvStatus, TransportError>;

    /// Waits until the connection has data (or an error/closure) to report.
    async fn readable(&self) -> Result<(), TransportError>;

    /// Shuts the connection down. Errors are not interesting to callers
    /// because the connection is being thrown away anyway.
    async fn close(&mut self);

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_equality() {
        let a = ConnectionId::new(1);
        let b = ConnectionId::new(1);
        let c = ConnectionId::new(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
