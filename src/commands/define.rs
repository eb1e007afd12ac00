//! Definition retrieval (`DEFINE`).
//!
//! ```text
//! C: DEFINE wn "cat"
//! S: 150 2 definitions retrieved          AwaitHeader
//! S: 151 "cat" wn "WordNet (r) 3.0"       AwaitBlockOpen
//! S: <definition text>                    AccumulateBody
//! S: .
//! S: 151 "Cat" wn "WordNet (r) 3.0"       AwaitBlockOpen
//! S: ...
//! S: .
//! S: 250 ok                               Done
//! ```
//!
//! The count in the 150 header bounds the loop but is not trusted on its
//! own: the loop also ends on a completion status or end of stream. A count
//! of zero, or none at all, leaves termination entirely to the replies. A
//! server that skips the 150 line and opens with a 151 block is read the
//! same way, with no count.

use super::reply::{self, Completion};
use crate::connection::LineChannel;
use crate::error::{DictError, Result};
use crate::protocol::{codes, definition_header, Command, Database, Definition, StatusLine};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

/// Upper bound on capacity reserved from the announced count
const MAX_PREALLOCATED: usize = 64;

enum State {
    AwaitHeader,
    AwaitBlockOpen,
    AccumulateBody(Definition),
    Done,
}

/// Fetches every definition of `word` from `database`.
pub(crate) async fn run<S>(
    channel: &mut LineChannel<S>,
    word: &str,
    database: &Database,
) -> Result<Vec<Definition>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let command = Command::Define {
        database: database.name().to_string(),
        word: word.to_string(),
    };
    reply::send(channel, &command).await?;

    let mut definitions = Vec::new();
    let mut expected: Option<usize> = None;
    let mut state = State::AwaitHeader;

    loop {
        state = match state {
            State::AwaitHeader => match reply::read_header(channel, &command).await? {
                None => return Ok(Vec::new()),
                Some(header) if header.code.is_success() => State::Done,
                Some(header) => match header.code.as_u16() {
                    codes::DEFINITIONS_RETRIEVED => {
                        expected = header.leading_count().filter(|&n| n > 0);
                        if let Some(n) = expected {
                            definitions.reserve(n.min(MAX_PREALLOCATED));
                        }
                        State::AwaitBlockOpen
                    }
                    codes::DEFINITION_FOLLOWS => {
                        debug!("Definition block without a count header");
                        State::AccumulateBody(open_block(&header)?)
                    }
                    _ => {
                        debug!(status = %header, "Informational status before definitions");
                        State::AwaitBlockOpen
                    }
                },
            },

            State::AwaitBlockOpen => {
                if expected.is_some_and(|n| definitions.len() >= n) {
                    finish(channel).await?;
                    State::Done
                } else {
                    match channel.read_line().await? {
                        None => {
                            debug!(received = definitions.len(), "Stream ended between definitions");
                            State::Done
                        }
                        Some(line) => next_block(&line, &command)?,
                    }
                }
            }

            State::AccumulateBody(definition) => {
                let body = reply::read_text_block(channel).await?;
                definitions.push(definition.with_body(body.join("\n")));
                State::AwaitBlockOpen
            }

            State::Done => break,
        };
    }

    if let Some(n) = expected {
        if n != definitions.len() {
            warn!(expected = n, received = definitions.len(), "Definition count mismatch");
        }
    }

    Ok(definitions)
}

/// Decides what a line read between definition blocks means.
fn next_block(line: &str, command: &Command) -> Result<State> {
    let Some(status) = StatusLine::parse(line) else {
        warn!(line = %line, "Ignoring content line outside a definition block");
        return Ok(State::AwaitBlockOpen);
    };

    if status.code.as_u16() == codes::DEFINITION_FOLLOWS {
        return open_block(&status).map(State::AccumulateBody);
    }
    if status.code.is_success() {
        return Ok(State::Done);
    }
    if status.code.is_failure() {
        return Err(DictError::protocol(format!(
            "{} failed after its header: {}",
            command.name(),
            status
        )));
    }

    debug!(status = %status, "Informational status");
    Ok(State::AwaitBlockOpen)
}

/// Builds an empty definition from a `151` line.
fn open_block(status: &StatusLine) -> Result<Definition> {
    let header = definition_header(&status.text).ok_or_else(|| {
        DictError::protocol(format!("malformed definition header: {}", status))
    })?;

    let definition = Definition::new(header.word, header.database);
    Ok(match header.description {
        Some(description) => definition.with_database_description(description),
        None => definition,
    })
}

/// Consumes the completion status once every announced block is closed.
async fn finish<S>(channel: &mut LineChannel<S>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match reply::read_completion(channel).await? {
        Completion::Done | Completion::EndOfStream => Ok(()),
        Completion::Failed(status) => {
            warn!(status = %status, "Failure status after all definitions");
            Ok(())
        }
    }
}
