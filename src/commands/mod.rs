//! DICT Operations
//!
//! Each operation sends one command and drives a small state machine over
//! the line channel until it reaches a final status:
//!
//! ```text
//!        send command
//!             │
//!             ▼
//!      ┌─────────────┐   4yz/5yz   ┌──────────────┐
//!      │ read header │────────────>│ empty result │
//!      └──────┬──────┘             └──────────────┘
//!             │ 1yz
//!             ▼
//!      ┌─────────────┐
//!      │ text blocks │  content lines until "."
//!      └──────┬──────┘
//!             │
//!             ▼
//!      ┌─────────────┐
//!      │ completion  │  2yz
//!      └─────────────┘
//! ```
//!
//! The functions here take the channel by `&mut`, so the caller's lock is
//! what keeps two operations from interleaving on one connection.
//!
//! - `define`: `DEFINE`, one text block per definition
//! - `matching`: `MATCH`, one block of matching headwords
//! - `listing`: `SHOW DB` and `SHOW STRAT`
//! - `details`: `SHOW INFO` and `SHOW SERVER`
//! - `reply`: header, text block and completion readers shared by all of them

pub(crate) mod define;
pub(crate) mod details;
pub(crate) mod listing;
pub(crate) mod matching;
pub(crate) mod reply;
