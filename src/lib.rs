//! # dictwire - An Async DICT Protocol Client
//!
//! dictwire talks to dictionary servers that speak the DICT protocol
//! (RFC 2229), such as `dict.org`. It keeps one TCP connection open, sends
//! textual commands, and turns the status-coded, multi-line replies into
//! definitions, match lists, databases and strategies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                             dictwire                                │
//! │                                                                     │
//! │  ┌────────────────┐    ┌─────────────────┐    ┌─────────────────┐   │
//! │  │ DictConnection │───>│   Operations    │───>│   LineChannel   │   │
//! │  │  (lifecycle)   │    │ DEFINE / MATCH  │    │  (BytesMut +    │   │
//! │  │                │    │ SHOW DB / STRAT │    │   BufWriter)    │   │
//! │  └────────────────┘    └────────┬────────┘    └─────────────────┘   │
//! │                                 │                                   │
//! │                                 ▼                                   │
//! │                  ┌──────────────────────────────┐                   │
//! │                  │          protocol            │                   │
//! │                  │  StatusCode   quoted_fields  │                   │
//! │                  │  Command      leading_token  │                   │
//! │                  └──────────────────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use dictwire::{Database, DictConnection, MatchingStrategy};
//!
//! #[tokio::main]
//! async fn main() -> dictwire::Result<()> {
//!     let conn = DictConnection::connect("dict.org").await?;
//!
//!     for definition in conn.define("cat", &Database::all()).await? {
//!         println!("{}\n", definition);
//!     }
//!
//!     let prefix = MatchingStrategy::new("prefix", "Match prefixes");
//!     let words = conn.match_words("cat", &prefix, &Database::all()).await?;
//!     println!("{}", words.join(", "));
//!
//!     conn.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `DEFINE database word`
//! - `MATCH database strategy word`
//! - `SHOW DB` / `SHOW STRAT`
//! - `SHOW INFO database` / `SHOW SERVER`
//! - `QUIT`
//!
//! ## Module Overview
//!
//! - [`protocol`]: Commands, status codes and field extraction
//! - [`connection`]: Line framing and connection lifecycle
//! - [`error`]: The error type shared by every operation
//!
//! ## Design Highlights
//!
//! ### One Operation at a Time
//!
//! A DICT connection answers commands strictly in order, so every operation
//! locks the connection for its whole request/response exchange. Sharing a
//! connection between tasks is safe; the calls simply queue.
//!
//! ### Empty Is Not an Error
//!
//! "No match", "invalid database" and similar refusals come back as empty
//! results. Errors are reserved for unreachable servers, broken sockets and
//! replies that do not follow the protocol.

mod commands;
pub mod connection;
pub mod error;
pub mod protocol;

// Re-export commonly used types for convenience
pub use connection::{ConnectionStats, DictConnection};
pub use error::{DictError, Result};
pub use protocol::{Database, Definition, MatchingStrategy};

/// The default DICT port (RFC 2229)
pub const DEFAULT_PORT: u16 = 2628;

/// The default server the command-line client talks to
pub const DEFAULT_HOST: &str = "dict.org";

/// Version of dictwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
