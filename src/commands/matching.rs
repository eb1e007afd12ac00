//! Match-list retrieval (`MATCH`).
//!
//! ```text
//! C: MATCH * prefix "cat"
//! S: 152 3 matches found
//! S: wn "cat"
//! S: wn "catapult"
//! S: gcide "cat"
//! S: .
//! S: 250 ok
//! ```
//!
//! Every quoted field in the block is a matching headword. The result keeps
//! the first occurrence of each word in arrival order.

use super::reply::{self, Completion};
use crate::connection::LineChannel;
use crate::error::Result;
use crate::protocol::{quoted_fields, Command, Database, MatchingStrategy};
use std::borrow::Cow;
use std::collections::HashSet;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Lists the headwords in `database` that match `word` under `strategy`.
pub(crate) async fn run<S>(
    channel: &mut LineChannel<S>,
    word: &str,
    strategy: &MatchingStrategy,
    database: &Database,
) -> Result<Vec<String>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let command = Command::Match {
        database: database.name().to_string(),
        strategy: strategy.name().to_string(),
        word: word.to_string(),
    };
    reply::send(channel, &command).await?;

    let header = match reply::read_header(channel, &command).await? {
        Some(header) if !header.code.is_success() => header,
        _ => return Ok(Vec::new()),
    };
    debug!(announced = ?header.leading_count(), "Reading matches");

    let lines = reply::read_text_block(channel).await?;
    if let Completion::Failed(_) = reply::read_completion(channel).await? {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let matches = lines
        .iter()
        .flat_map(|line| quoted_fields(line))
        .filter(|word| seen.insert(word.clone()))
        .map(Cow::into_owned)
        .collect();

    Ok(matches)
}
