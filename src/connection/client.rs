//! DICT Client Connection
//!
//! A `DictConnection` owns one stream to a DICT server and runs one
//! operation at a time on it.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. connect(host, port)
//!        │
//!        ▼
//! 2. Read greeting ── 4yz/5yz, no status, or EOF ──> ConnectionRejected
//!        │                                            (socket released)
//!        │ 2yz
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │  Connected                   │
//!    │                              │
//!    │  lock ─> one operation ─>    │
//!    │  unlock                      │
//!    │                              │
//!    │  (a transport error drops    │
//!    │   the stream)                │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. close(): QUIT, read one reply, shut the stream down
//!        │
//!        ▼
//! 5. Closed: further operations fail with NotConnected
//! ```
//!
//! The stream sits behind a `tokio::sync::Mutex`, so a connection can be
//! shared through an `Arc` and concurrent calls simply queue up.

use super::channel::{ConnectionStats, LineChannel};
use crate::commands::{define, details, listing, matching};
use crate::error::{DictError, Result};
use crate::protocol::{Command, Database, Definition, MatchingStrategy, StatusLine};
use crate::DEFAULT_PORT;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A live connection to a DICT server.
pub struct DictConnection<S = TcpStream> {
    /// The line channel, `None` once closed
    channel: Mutex<Option<LineChannel<S>>>,

    /// Server address (for logging)
    peer: String,

    /// Greeting text after the status code
    banner: String,

    /// Connection statistics (shared with the channel)
    stats: Arc<ConnectionStats>,
}

impl DictConnection<TcpStream> {
    /// Connects to `host` on the default DICT port (2628).
    pub async fn connect(host: &str) -> Result<Self> {
        Self::connect_with_port(host, DEFAULT_PORT).await
    }

    /// Connects to `host:port` and reads the server's greeting.
    ///
    /// Fails with [`DictError::ConnectionRejected`] if the host cannot be
    /// reached or the greeting is not a success status.
    pub async fn connect_with_port(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        debug!(server = %addr, "Connecting");

        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| DictError::ConnectionRejected(format!("{}: {}", addr, e)))?;

        Self::handshake(stream, addr).await
    }
}

impl<S> DictConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Reads the greeting on an already-open stream.
    ///
    /// `peer` is only used in log and error messages. On rejection the stream
    /// is shut down and dropped before returning.
    pub async fn handshake(stream: S, peer: impl Into<String>) -> Result<Self> {
        let peer = peer.into();
        let stats = Arc::new(ConnectionStats::new());
        let mut channel = LineChannel::new(stream, Arc::clone(&stats));

        let greeting = match channel.read_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                return Err(reject(channel, &peer, "closed before greeting".to_string()).await)
            }
            Err(e) => return Err(reject(channel, &peer, format!("reading greeting: {}", e)).await),
        };

        let banner = match StatusLine::parse(&greeting) {
            Some(status) if status.code.is_success() => status.text,
            Some(status) => {
                return Err(reject(channel, &peer, format!("server refused: {}", status)).await)
            }
            None => {
                return Err(reject(channel, &peer, format!("unexpected greeting {:?}", greeting)).await)
            }
        };

        info!(server = %peer, banner = %banner, "Connected");

        Ok(Self {
            channel: Mutex::new(Some(channel)),
            peer,
            banner,
            stats,
        })
    }

    /// The greeting text, without its status code.
    pub fn banner(&self) -> &str {
        &self.banner
    }

    /// The `<msg-id>` token at the end of the greeting, if the server sent one.
    pub fn message_id(&self) -> Option<&str> {
        let start = self.banner.rfind('<')?;
        let end = start + self.banner[start..].find('>')?;
        Some(&self.banner[start..=end])
    }

    /// The address this connection was opened to.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Returns `false` after `close` or a transport failure.
    pub async fn is_open(&self) -> bool {
        self.channel.lock().await.is_some()
    }

    /// Retrieves every definition of `word`.
    ///
    /// `database` may be a concrete database or one of the selectors
    /// [`Database::all`] and [`Database::first_match`]. No definitions is an
    /// empty vector, not an error.
    pub async fn define(&self, word: &str, database: &Database) -> Result<Vec<Definition>> {
        let mut guard = self.channel.lock().await;
        let channel = guard.as_mut().ok_or_else(DictError::not_connected)?;
        let result = define::run(channel, word, database).await;
        self.check_transport(&mut guard, &result);
        result
    }

    /// Retrieves the headwords matching `word` under `strategy`, in server
    /// order and without duplicates.
    pub async fn match_words(
        &self,
        word: &str,
        strategy: &MatchingStrategy,
        database: &Database,
    ) -> Result<Vec<String>> {
        let mut guard = self.channel.lock().await;
        let channel = guard.as_mut().ok_or_else(DictError::not_connected)?;
        let result = matching::run(channel, word, strategy, database).await;
        self.check_transport(&mut guard, &result);
        result
    }

    /// Lists the databases the server offers, keyed by name.
    pub async fn databases(&self) -> Result<HashMap<String, Database>> {
        let mut guard = self.channel.lock().await;
        let channel = guard.as_mut().ok_or_else(DictError::not_connected)?;
        let result = listing::databases(channel).await;
        self.check_transport(&mut guard, &result);
        result
    }

    /// Lists the matching strategies the server offers.
    pub async fn strategies(&self) -> Result<Vec<MatchingStrategy>> {
        let mut guard = self.channel.lock().await;
        let channel = guard.as_mut().ok_or_else(DictError::not_connected)?;
        let result = listing::strategies(channel).await;
        self.check_transport(&mut guard, &result);
        result
    }

    /// Returns the server's description of `database`.
    pub async fn database_info(&self, database: &Database) -> Result<String> {
        let mut guard = self.channel.lock().await;
        let channel = guard.as_mut().ok_or_else(DictError::not_connected)?;
        let result = details::database_info(channel, database.name()).await;
        self.check_transport(&mut guard, &result);
        result
    }

    /// Returns the server's description of itself.
    pub async fn server_info(&self) -> Result<String> {
        let mut guard = self.channel.lock().await;
        let channel = guard.as_mut().ok_or_else(DictError::not_connected)?;
        let result = details::server_info(channel).await;
        self.check_transport(&mut guard, &result);
        result
    }

    /// Sends `QUIT`, reads one reply and shuts the stream down.
    ///
    /// Never fails: problems along the way are logged and the connection is
    /// closed regardless. Closing twice is a no-op.
    pub async fn close(&self) {
        let Some(mut channel) = self.channel.lock().await.take() else {
            debug!(server = %self.peer, "Already closed");
            return;
        };

        match channel.send_line(&Command::Quit.to_line()).await {
            Ok(()) => {
                channel.stats().command_sent();
                match channel.read_line().await {
                    Ok(Some(reply)) => debug!(server = %self.peer, reply = %reply, "QUIT acknowledged"),
                    Ok(None) => debug!(server = %self.peer, "Closed without a QUIT reply"),
                    Err(e) => warn!(server = %self.peer, error = %e, "Failed to read QUIT reply"),
                }
            }
            Err(e) => warn!(server = %self.peer, error = %e, "Failed to send QUIT"),
        }

        if let Err(e) = channel.shutdown().await {
            debug!(server = %self.peer, error = %e, "Shutdown failed");
        }
        info!(server = %self.peer, "Disconnected");
    }

    /// Drops the stream after an I/O failure; nothing more can be read from it
    /// reliably.
    fn check_transport<T>(&self, slot: &mut Option<LineChannel<S>>, result: &Result<T>) {
        if let Err(DictError::Transport(e)) = result {
            warn!(server = %self.peer, error = %e, "Transport failure, dropping connection");
            *slot = None;
        }
    }
}

/// Releases a stream whose greeting was refused.
async fn reject<S>(mut channel: LineChannel<S>, peer: &str, reason: String) -> DictError
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    warn!(server = %peer, reason = %reason, "Connection rejected");
    if let Err(e) = channel.shutdown().await {
        debug!(server = %peer, error = %e, "Shutdown after rejection failed");
    }
    DictError::ConnectionRejected(reason)
}
