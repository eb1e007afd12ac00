//! Connection Module
//!
//! This module owns the socket side of the client: framing bytes into lines
//! and managing the lifetime of a connection to a DICT server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     DictConnection                          │
//! │                                                             │
//! │  connect() ──> greeting ──> operations ──> close()          │
//! │                                 │                           │
//! │                         Mutex<LineChannel>                  │
//! │                                 │                           │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │ send_line   │───>│  TcpStream  │───>│ read_line   │      │
//! │  └─────────────┘    └─────────────┘    └─────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use dictwire::connection::DictConnection;
//! use dictwire::protocol::Database;
//!
//! let conn = DictConnection::connect("dict.org").await?;
//! for definition in conn.define("cat", &Database::all()).await? {
//!     println!("{}", definition);
//! }
//! conn.close().await;
//! ```

pub mod channel;
pub mod client;

// Re-export commonly used types
pub use channel::{ConnectionStats, LineChannel};
pub use client::DictConnection;
