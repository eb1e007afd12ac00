//! Line Channel
//!
//! Wraps a duplex byte stream as a "send one line / receive one line"
//! channel. DICT is strictly line-oriented, so this is the only place that
//! sees raw bytes.
//!
//! ## Buffer Management
//!
//! Incoming data accumulates in a `BytesMut` buffer. TCP is a stream
//! protocol, so one read can deliver half a line or several lines at once;
//! complete lines are split off the front of the buffer and anything left
//! over waits for the next read.
//!
//! Outgoing lines are written through a `BufWriter` and flushed right away,
//! so the server always sees a full command before we wait for its reply.

use crate::protocol::CRLF;
use bytes::{Buf, BytesMut};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{trace, warn};

/// Longest line we are willing to buffer (64 KB)
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Traffic counters for one connection
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Commands written to the server
    pub commands_sent: AtomicU64,
    /// Lines received from the server
    pub lines_read: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command_sent(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// A line-oriented view of a byte stream.
pub struct LineChannel<S> {
    /// The underlying stream, buffered for writes
    stream: BufWriter<S>,

    /// Bytes read but not yet returned as lines
    buffer: BytesMut,

    /// Set once the peer has closed its side
    eof: bool,

    /// Connection statistics (shared with the owning connection)
    stats: Arc<ConnectionStats>,
}

impl<S> LineChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, stats: Arc<ConnectionStats>) -> Self {
        Self {
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            eof: false,
            stats,
        }
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Writes `line` followed by CRLF and flushes.
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(CRLF.as_bytes()).await?;
        self.stream.flush().await?;

        let written = line.len() + CRLF.len();
        self.stats.bytes_written(written);
        trace!(bytes = written, line, "Sent line");
        Ok(())
    }

    /// Reads the next line without its terminator.
    ///
    /// Returns `Ok(None)` once the peer has closed the stream and every
    /// buffered line has been handed out. A final line without a newline is
    /// still returned before that.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(line) = self.try_split_line() {
                return Ok(Some(line));
            }

            if self.eof {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let rest = self.buffer.split();
                return Ok(Some(self.decode(&rest)));
            }

            self.read_more_data().await?;
        }
    }

    /// Closes the write side of the stream.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }

    /// Splits one complete line off the front of the buffer.
    fn try_split_line(&mut self) -> Option<String> {
        let newline = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line = self.buffer.split_to(newline + 1);
        line.truncate(newline);
        if line.last() == Some(&b'\r') {
            line.truncate(newline - 1);
        }
        Some(self.decode(&line))
    }

    fn decode(&self, raw: &[u8]) -> String {
        self.stats.line_read();
        let line = String::from_utf8_lossy(raw).into_owned();
        trace!(line = %line, "Received line");
        line
    }

    /// Reads more data from the socket into the buffer.
    async fn read_more_data(&mut self) -> io::Result<()> {
        if self.buffer.len() >= MAX_LINE_LENGTH {
            warn!(size = self.buffer.len(), "Line length limit exceeded");
            self.buffer.advance(self.buffer.len());
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line longer than {} bytes", MAX_LINE_LENGTH),
            ));
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;
        if n == 0 {
            self.eof = true;
        } else {
            self.stats.bytes_read(n);
            trace!(bytes = n, "Read data");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn channel(mock: tokio_test::io::Mock) -> LineChannel<tokio_test::io::Mock> {
        LineChannel::new(mock, Arc::new(ConnectionStats::new()))
    }

    #[tokio::test]
    async fn test_send_line_appends_crlf() {
        let mock = Builder::new().write(b"SHOW DB\r\n").build();
        let mut channel = channel(mock);

        channel.send_line("SHOW DB").await.unwrap();

        assert_eq!(channel.stats().bytes_written.load(Ordering::Relaxed), 9);
    }

    #[tokio::test]
    async fn test_read_lines_strip_terminators() {
        let mock = Builder::new().read(b"220 hello\r\nbare newline\n\r\n").build();
        let mut channel = channel(mock);

        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some("220 hello"));
        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some("bare newline"));
        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(channel.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        let mock = Builder::new()
            .read(b"150 1 defin")
            .read(b"itions retrieved\r")
            .read(b"\n")
            .build();
        let mut channel = channel(mock);

        assert_eq!(
            channel.read_line().await.unwrap().as_deref(),
            Some("150 1 definitions retrieved")
        );
        assert_eq!(channel.read_line().await.unwrap(), None);
        assert_eq!(channel.stats().lines_read.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_unterminated_final_line() {
        let mock = Builder::new().read(b"221 bye").build();
        let mut channel = channel(mock);

        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some("221 bye"));
        assert_eq!(channel.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let mock = Builder::new().read(b"caf\xe9\r\n").build();
        let mut channel = channel(mock);

        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some("caf\u{fffd}"));
    }

    #[tokio::test]
    async fn test_read_error_surfaces() {
        let mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut channel = channel(mock);

        let err = channel.read_line().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
