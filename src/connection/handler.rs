//! Connection Handler Module
//!
//! This module handles individual client connections to stashkv.
//! Each client gets its own handler task that runs in a loop,
//! reading request lines and sending reply lines.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  Read bytes from socket      │
//!    │  Parse request line          │
//!    │  Execute command             │
//!    │  Send reply line             │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Client disconnects / EXIT / idle timeout
//!        │
//!        ▼
//! 5. Handler task ends
//! ```
//!
//! ## Buffer Management
//!
//! We use a BytesMut buffer to accumulate incoming data. TCP is a stream
//! protocol, so a read may deliver a partial line or several whole lines;
//! the parser consumes one complete line per call and leaves the rest
//! buffered. A line that exceeds the buffer cap without a newline
//! terminates the connection.

use crate::commands::CommandHandler;
use crate::protocol::{parse_line, Reply};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, error, info, trace, warn};

/// Maximum size for the read buffer (64 KB)
const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// This struct manages the read buffer, line parsing, and reply sending
/// for one connected client.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The command handler (shared across connections)
    command_handler: CommandHandler,

    /// How long the connection may sit idle before it is closed
    /// (None = no limit)
    idle_timeout: Option<Duration>,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The TCP stream for this connection
    /// * `addr` - The client's socket address
    /// * `command_handler` - The command handler for executing commands
    /// * `idle_timeout` - Idle read deadline; `None` disables it
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        command_handler: CommandHandler,
        idle_timeout: Option<Duration>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            idle_timeout,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// This method reads request lines from the client, executes them,
    /// and sends back replies until the client disconnects, sends `EXIT`,
    /// goes idle past the deadline, or an error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected gracefully"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    debug!(client = %self.addr, "Client disconnected")
                }
                ConnectionError::IdleTimeout => {
                    info!(client = %self.addr, "Connection idle past deadline, closing")
                }
                ConnectionError::IoError(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            // Drain every complete line already buffered
            while let Some(frames) = parse_line(&mut self.buffer) {
                if frames.is_empty() {
                    // Blank line, nothing to do
                    continue;
                }

                // EXIT closes the connection without touching the store
                if frames[0].eq_ignore_ascii_case(b"exit") {
                    debug!(client = %self.addr, "Client requested exit");
                    return Ok(());
                }

                let reply = self.command_handler.execute(&frames);
                self.stats.command_processed();
                trace!(client = %self.addr, reply = %reply, "Executed command");

                self.send_reply(&reply).await?;
            }

            // Need more data - read from the socket
            self.read_more_data().await?;
        }
    }

    /// Reads more data from the socket into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        // A full buffer with no newline means an over-long request line
        if self.buffer.len() >= MAX_BUFFER_SIZE {
            error!(
                client = %self.addr,
                size = self.buffer.len(),
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        // Ensure we have some capacity
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let read = self.stream.get_mut().read_buf(&mut self.buffer);
        let n = match self.idle_timeout {
            Some(deadline) => tokio::time::timeout(deadline, read)
                .await
                .map_err(|_| ConnectionError::IdleTimeout)??,
            None => read.await?,
        };

        if n == 0 {
            // Connection closed by client
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                // Partial line in buffer
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Sends a reply line to the client.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        let bytes = reply.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent reply"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// No traffic arrived before the idle deadline
    #[error("Connection idle past deadline")]
    IdleTimeout,

    /// Unexpected end of stream (partial line)
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// Buffer size limit exceeded
    #[error("Buffer size limit exceeded")]
    BufferFull,
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion.
///
/// # Arguments
///
/// * `stream` - The TCP stream for this connection
/// * `addr` - The client's socket address
/// * `command_handler` - The command handler for executing commands
/// * `idle_timeout` - Idle read deadline; `None` disables it
/// * `stats` - Shared connection statistics
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    idle_timeout: Option<Duration>,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, idle_timeout, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IdleTimeout => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Store;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn create_test_server(
        idle_timeout: Option<Duration>,
    ) -> (SocketAddr, Arc<Store>, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = Arc::new(Store::new());
        let stats = Arc::new(ConnectionStats::new());

        let store_clone = Arc::clone(&store);
        let stats_clone = Arc::clone(&stats);

        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let handler = CommandHandler::new(Arc::clone(&store_clone));
                let stats = Arc::clone(&stats_clone);
                tokio::spawn(handle_connection(
                    stream,
                    client_addr,
                    handler,
                    idle_timeout,
                    stats,
                ));
            }
        });

        (addr, store, stats)
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let (addr, _, _) = create_test_server(None).await;

        let mut client = TcpStream::connect(addr).await.unwrap();

        client.write_all(b"ping\r\n").await.unwrap();

        let mut buf = [0u8; 64];
        let n = client.read(&mut buf).await.unwrap();

        assert_eq!(&buf[..n], b"PONG\r\n");
    }

    #[tokio::test]
    async fn test_set_get_session() {
        let (addr, _, _) = create_test_server(None).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 64];

        client.write_all(b"set name ariz\r\n").await.unwrap();
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"OK\r\n");

        client.write_all(b"app name dev\r\n").await.unwrap();
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"OK\r\n");

        client.write_all(b"get name\r\n").await.unwrap();
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ariz dev\r\n");
    }

    #[tokio::test]
    async fn test_get_missing_key_is_blank_line() {
        let (addr, _, _) = create_test_server(None).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 64];

        client.write_all(b"get nothing\r\n").await.unwrap();
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"\r\n");
    }

    #[tokio::test]
    async fn test_pipelined_commands() {
        let (addr, _, _) = create_test_server(None).await;

        let mut client = TcpStream::connect(addr).await.unwrap();

        // Several commands in one write
        client
            .write_all(b"set k1 v1\r\nset k2 v2\r\nget k1\r\nget k2\r\n")
            .await
            .unwrap();

        let mut buf = vec![0u8; 256];
        let mut total = 0;

        // Expected: OK\r\nOK\r\nv1\r\nv2\r\n (16 bytes)
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while total < 16 && tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(100), client.read(&mut buf[total..]))
                .await
            {
                Ok(Ok(n)) if n > 0 => total += n,
                _ => break,
            }
        }

        assert_eq!(&buf[..total], b"OK\r\nOK\r\nv1\r\nv2\r\n");
    }

    #[tokio::test]
    async fn test_exit_closes_connection() {
        let (addr, _, _) = create_test_server(None).await;

        let mut client = TcpStream::connect(addr).await.unwrap();

        client.write_all(b"exit\r\n").await.unwrap();

        // Server closes its end without a reply
        let mut buf = [0u8; 16];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_idle_timeout_closes_connection() {
        let (addr, _, _) = create_test_server(Some(Duration::from_millis(50))).await;

        let mut client = TcpStream::connect(addr).await.unwrap();

        // Stay silent past the deadline
        let mut buf = [0u8; 16];
        let n = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf))
            .await
            .expect("server should close the idle connection");
        assert_eq!(n.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connection_stats() {
        let (addr, _, stats) = create_test_server(None).await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);

        let mut client = TcpStream::connect(addr).await.unwrap();

        // Give the server time to accept the connection
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        client.write_all(b"ping\r\n").await.unwrap();
        let mut buf = [0u8; 64];
        let _ = client.read(&mut buf).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(stats.commands_processed.load(Ordering::Relaxed) >= 1);
        assert!(stats.bytes_read.load(Ordering::Relaxed) > 0);
        assert!(stats.bytes_written.load(Ordering::Relaxed) > 0);

        drop(client);

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }
}
