//! # Byte-stream plumbing
//!
//! Protocol-agnostic pieces the RTSP session is built on:
//!
//! - [`FramedConnection`]: owns a byte-stream socket, cuts it into messages
//!   with a [`FramingStrategy`] and runs the read and write loops
//! - [`Transport`]: anything that reads, writes and closes like a socket
//! - [`Dialer`]: how a session obtains a [`Transport`] for a host and port
//!
//! Plugging in another transport (a WebSocket tunnel, a TLS stream) only
//! takes a [`Dialer`] that returns it, or handing it directly to
//! [`RtspSession::play_with`](crate::format::rtsp::RtspSession::play_with).

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::{Result, RtspError};

/// Framed connection and its events
pub mod connection;

/// Framing strategies
pub mod framing;

pub use connection::{ConnEvent, ConnStatus, FramedConnection};
pub use framing::{FrameHeader, FramingStrategy, InterleavedFraming, RawFraming};

/// A byte-stream socket.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// Opens a [`Transport`] to an RTSP server.
#[async_trait]
pub trait Dialer: Send + Sync + fmt::Debug {
    /// Connects to `host:port`, giving up after `timeout`.
    async fn dial(&self, host: &str, port: u16, timeout: Duration) -> Result<Box<dyn Transport>>;
}

/// Plain TCP dialer.
#[derive(Debug, Default, Clone)]
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, host: &str, port: u16, timeout: Duration) -> Result<Box<dyn Transport>> {
        let addr = format!("{}:{}", host, port);
        let stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| RtspError::Transport(format!("connect {} timed out", addr)))?
            .map_err(|e| RtspError::Transport(format!("Failed to connect to {}: {}", addr, e)))?;

        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_dialer_connects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });

        let dialer = TcpDialer;
        assert!(dialer
            .dial("127.0.0.1", port, Duration::from_secs(1))
            .await
            .is_ok());
        assert!(accept.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_tcp_dialer_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpDialer.dial("127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(RtspError::Transport(_))));
    }
}
