//! TCP transport implementation using `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::{Connection, ConnectionId, Connector, RecvStatus, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A [`Connector`] that opens plain TCP connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Connection = TcpConnection;

    async fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Self::Connection, TransportError> {
        let connect_failed = |source| TransportError::ConnectFailed {
            host: host.to_string(),
            port,
            source,
        };

        // `connect` resolves the host name itself and tries every address
        // it resolves to until one accepts.
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(connect_failed)?;
        stream.set_nodelay(true).map_err(connect_failed)?;
        let peer = stream.peer_addr().map_err(connect_failed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %peer, "opened metaserver connection");

        Ok(TcpConnection { id, stream, peer })
    }
}

/// A single TCP connection to the metaserver.
#[derive(Debug)]
pub struct TcpConnection {
    id: ConnectionId,
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpConnection {
    /// Returns the address of the remote peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpConnection {
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<RecvStatus, TransportError> {
        match self.stream.try_read(buf) {
            Ok(0) => Ok(RecvStatus::Closed),
            Ok(n) => Ok(RecvStatus::Data(n)),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Ok(RecvStatus::Pending)
            }
            Err(e) => Err(TransportError::ReceiveFailed(e)),
        }
    }

    async fn readable(&self) -> Result<(), TransportError> {
        self.stream
            .readable()
            .await
            .map_err(TransportError::ReceiveFailed)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::trace!(id = %self.id, error = %e, "shutdown failed");
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
