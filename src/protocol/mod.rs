//! DICT Protocol Implementation
//!
//! This module holds the wire-level pieces of the DICT protocol (RFC 2229):
//! what a command line looks like, how a status code is classified, and how
//! fields are pulled out of a response line. Nothing here does I/O.
//!
//! ## Modules
//!
//! - `types`: Commands and the values the server describes
//! - `status`: Status code parsing and family classification
//! - `fields`: Quoted-field and leading-token extraction
//!
//! ## Example
//!
//! ```
//! use dictwire::protocol::{quoted_fields, Command, StatusCode};
//!
//! let cmd = Command::Define { database: "wn".into(), word: "cat".into() };
//! assert_eq!(cmd.to_line(), "DEFINE wn \"cat\"");
//!
//! let status = StatusCode::parse("552 no match").unwrap();
//! assert!(status.is_failure());
//!
//! assert_eq!(quoted_fields("wn \"cat\""), vec!["cat"]);
//! ```

pub mod fields;
pub mod status;
pub mod types;

// Re-export commonly used types for convenience
pub use fields::{definition_header, leading_token, quoted_fields, tokens, Field};
pub use status::{codes, StatusCode, StatusFamily, StatusLine};
pub use types::{Command, Database, Definition, MatchingStrategy, BLOCK_TERMINATOR, CRLF};
