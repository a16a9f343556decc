//! Integration tests for the TCP transport.
//!
//! These tests open a real listener on a random port and check that bytes
//! flow both ways and that a peer shutdown is reported as
//! [`RecvStatus::Closed`] rather than an error.

use std::time::Duration;

use metaclient_transport::{
    Connection, Connector, RecvStatus, TcpConnector, TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Reads from `conn` until `want` bytes arrived or the connection closed.
async fn recv_exact(conn: &mut impl Connection, want: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 64];
    while out.len() < want {
        tokio::time::timeout(Duration::from_secs(5), conn.readable())
            .await
            .expect("should become readable")
            .expect("readable should not fail");
        match conn.try_recv(&mut buf).expect("recv should succeed") {
            RecvStatus::Data(n) => out.extend_from_slice(&buf[..n]),
            RecvStatus::Pending => continue,
            RecvStatus::Closed => break,
        }
    }
    out
}

#[tokio::test]
async fn test_tcp_connect_send_and_receive() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 5];
        socket.read_exact(&mut buf).await.unwrap();
        socket.write_all(b"world").await.unwrap();
        buf
    });

    let mut conn = TcpConnector
        .connect("127.0.0.1", port)
        .await
        .expect("should connect");
    assert!(conn.id().into_inner() > 0);
    assert_eq!(conn.peer_addr().port(), port);

    conn.send(b"hello").await.expect("send should succeed");
    let reply = recv_exact(&mut conn, 5).await;

    assert_eq!(reply, b"world");
    assert_eq!(&server.await.unwrap(), b"hello");
}

#[tokio::test]
async fn test_tcp_try_recv_without_data_is_pending() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move { listener.accept().await.unwrap() });

    let mut conn = TcpConnector.connect("127.0.0.1", port).await.unwrap();
    let _peer = server.await.unwrap();

    let mut buf = [0u8; 16];
    let status = conn.try_recv(&mut buf).expect("should not error");
    assert_eq!(status, RecvStatus::Pending);
}

#[tokio::test]
async fn test_tcp_peer_shutdown_reports_closed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(b"bye").await.unwrap();
        socket.shutdown().await.unwrap();
    });

    let mut conn = TcpConnector.connect("127.0.0.1", port).await.unwrap();
    server.await.unwrap();

    // The buffered bytes are delivered before the closure.
    let data = recv_exact(&mut conn, 3).await;
    assert_eq!(data, b"bye");

    let mut buf = [0u8; 16];
    tokio::time::timeout(Duration::from_secs(5), conn.readable())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conn.try_recv(&mut buf).unwrap(), RecvStatus::Closed);
}

#[tokio::test]
async fn test_tcp_connect_refused_returns_connect_failed() {
    // Bind and immediately drop to get a port nobody listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = TcpConnector.connect("127.0.0.1", port).await;

    assert!(
        matches!(result, Err(TransportError::ConnectFailed { port: p, .. }) if p == port),
        "should report the failed address"
    );
}
