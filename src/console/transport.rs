//! Non-blocking connection seam between the console core and the network.
//!
//! The core only ever asks a connection for bytes that have already
//! arrived and hands it bytes to send without waiting. `WouldBlock` means
//! "nothing right now" and is never an error.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use tokio::net::TcpStream;

/// A non-blocking, byte-oriented client connection.
pub trait Connection: fmt::Debug {
    /// Reads already-buffered bytes.
    ///
    /// `Ok(0)` means the peer closed the connection; an
    /// [`io::ErrorKind::WouldBlock`] error means no data is available yet.
    ///
    /// # Errors
    ///
    /// Any I/O error other than `WouldBlock` is a transport failure.
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes as many bytes as the transport accepts without waiting.
    ///
    /// # Errors
    ///
    /// `WouldBlock` when the send buffer is full; anything else is a
    /// transport failure.
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Remote address, for logging.
    fn peer_addr(&self) -> Option<SocketAddr>;
}

/// [`Connection`] over a tokio TCP stream.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    peer: Option<SocketAddr>,
}

impl TcpConnection {
    /// Wraps an accepted stream, disabling Nagle so short replies go out
    /// immediately.
    #[must_use]
    pub fn new(stream: TcpStream) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "failed to set TCP_NODELAY");
        }
        let peer = stream.peer_addr().ok();
        Self { stream, peer }
    }
}

impl Connection for TcpConnection {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }

    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.try_write(buf)
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}
