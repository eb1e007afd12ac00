//! Reply reading shared by every operation.
//!
//! A DICT exchange has the same skeleton no matter the command:
//!
//! ```text
//! C: <command line>
//! S: <status> <text>            header: 1yz opens a block, 2yz/4yz/5yz end it
//! S: <content line>             zero or more text blocks, each closed by "."
//! S: .
//! S: 250 ok                     completion
//! ```

use crate::connection::LineChannel;
use crate::error::{DictError, Result};
use crate::protocol::{Command, StatusLine, BLOCK_TERMINATOR};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

/// How the tail of a reply ended.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Completion {
    /// A 2yz status arrived.
    Done,
    /// A 4yz/5yz status arrived instead.
    Failed(StatusLine),
    /// The server closed the stream first.
    EndOfStream,
}

/// Sends one command line.
///
/// A command that would not render as a single line is refused before
/// anything is written.
pub(crate) async fn send<S>(channel: &mut LineChannel<S>, command: &Command) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    command.validate()?;
    debug!(command = command.name(), "Sending command");
    channel.send_line(&command.to_line()).await?;
    channel.stats().command_sent();
    Ok(())
}

/// Reads the status line that answers `command`.
///
/// Returns `Ok(None)` for a failure status that means "nothing to report";
/// the operation should return an empty result. A refusal of the command
/// itself (500-503) is a protocol error, as is a header without a status.
pub(crate) async fn read_header<S>(
    channel: &mut LineChannel<S>,
    command: &Command,
) -> Result<Option<StatusLine>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let line = channel
        .read_line()
        .await?
        .ok_or_else(|| DictError::unexpected_eof("before replying"))?;

    let status = StatusLine::parse(&line).ok_or_else(|| {
        DictError::protocol(format!(
            "expected a status reply to {}, got {:?}",
            command.name(),
            line
        ))
    })?;
    debug!(command = command.name(), status = %status, "Received header");

    if status.code.is_command_rejected() {
        return Err(DictError::protocol(format!(
            "server rejected {}: {}",
            command.name(),
            status
        )));
    }
    if status.code.is_failure() {
        return Ok(None);
    }
    Ok(Some(status))
}

/// Reads content lines up to the `.` terminator.
///
/// The terminator is consumed and not returned. A leading `..` is unstuffed
/// to `.`. End of stream before the terminator is a protocol error.
pub(crate) async fn read_text_block<S>(channel: &mut LineChannel<S>) -> Result<Vec<String>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut lines = Vec::new();

    loop {
        let line = channel.read_line().await?.ok_or_else(|| {
            DictError::protocol(format!(
                "text block ended after {} lines without a terminator",
                lines.len()
            ))
        })?;

        if line == BLOCK_TERMINATOR {
            return Ok(lines);
        }

        match line.strip_prefix("..") {
            Some(rest) => lines.push(format!(".{}", rest)),
            None => lines.push(line),
        }
    }
}

/// Reads until the final status of a reply.
///
/// Preliminary statuses are logged and skipped; stray content lines are
/// skipped with a warning.
pub(crate) async fn read_completion<S>(channel: &mut LineChannel<S>) -> Result<Completion>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let Some(line) = channel.read_line().await? else {
            debug!("Stream ended before completion status");
            return Ok(Completion::EndOfStream);
        };

        match StatusLine::parse(&line) {
            Some(status) if status.code.is_success() => {
                debug!(status = %status, "Completed");
                return Ok(Completion::Done);
            }
            Some(status) if status.code.is_failure() => {
                debug!(status = %status, "Failed");
                return Ok(Completion::Failed(status));
            }
            Some(status) => debug!(status = %status, "Informational status"),
            None => warn!(line = %line, "Ignoring content line outside a text block"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionStats;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio_test::io::{Builder, Mock};

    fn channel(mock: Mock) -> LineChannel<Mock> {
        LineChannel::new(mock, Arc::new(ConnectionStats::new()))
    }

    #[tokio::test]
    async fn test_multi_line_command_is_not_sent() {
        // The mock expects no writes, so any byte on the wire would fail as
        // a transport error rather than a protocol one.
        let mut channel = channel(Builder::new().build());
        let command = Command::Define {
            database: "wn".to_string(),
            word: "cat\r\nSHOW SERVER".to_string(),
        };

        let err = send(&mut channel, &command).await.unwrap_err();

        assert!(matches!(err, DictError::Protocol(_)));
        assert_eq!(channel.stats().commands_sent.load(Ordering::Relaxed), 0);
        assert_eq!(channel.stats().bytes_written.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_header_failure_is_empty() {
        let mut channel = channel(Builder::new().read(b"552 no match\r\n").build());
        let header = read_header(&mut channel, &Command::ShowDatabases)
            .await
            .unwrap();
        assert!(header.is_none());
    }

    #[tokio::test]
    async fn test_header_rejected_command() {
        let mut channel = channel(Builder::new().read(b"501 syntax error\r\n").build());
        let err = read_header(&mut channel, &Command::ShowDatabases)
            .await
            .unwrap_err();
        assert!(matches!(err, DictError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_header_without_status() {
        let mut channel = channel(Builder::new().read(b"hello there\r\n").build());
        let err = read_header(&mut channel, &Command::ShowServer)
            .await
            .unwrap_err();
        assert!(matches!(err, DictError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_header_eof_is_transport_error() {
        let mut channel = channel(Builder::new().build());
        let err = read_header(&mut channel, &Command::ShowServer)
            .await
            .unwrap_err();
        assert!(
            matches!(err, DictError::Transport(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
        );
    }

    #[tokio::test]
    async fn test_text_block_unstuffs_dots() {
        let mut channel = channel(
            Builder::new()
                .read(b"first\r\n..hidden\r\n\r\n.not a terminator\r\n.\r\n")
                .build(),
        );
        let lines = read_text_block(&mut channel).await.unwrap();
        assert_eq!(lines, vec!["first", ".hidden", "", ".not a terminator"]);
    }

    #[tokio::test]
    async fn test_text_block_requires_terminator() {
        let mut channel = channel(Builder::new().read(b"first\r\nsecond\r\n").build());
        let err = read_text_block(&mut channel).await.unwrap_err();
        assert!(matches!(err, DictError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_completion_outcomes() {
        let mut channel = channel(
            Builder::new()
                .read(b"stray\r\n110 note\r\n250 ok\r\n")
                .read(b"420 busy\r\n")
                .build(),
        );
        assert_eq!(read_completion(&mut channel).await.unwrap(), Completion::Done);
        assert!(matches!(
            read_completion(&mut channel).await.unwrap(),
            Completion::Failed(status) if status.code.as_u16() == 420
        ));
        assert_eq!(
            read_completion(&mut channel).await.unwrap(),
            Completion::EndOfStream
        );
    }
}
