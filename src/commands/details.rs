//! Free-text information replies (`SHOW INFO`, `SHOW SERVER`).

use super::reply::{self, Completion};
use crate::connection::LineChannel;
use crate::error::Result;
use crate::protocol::Command;
use tokio::io::{AsyncRead, AsyncWrite};

/// Returns the server's description of one database, or an empty string if
/// the database is unknown.
pub(crate) async fn database_info<S>(channel: &mut LineChannel<S>, database: &str) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let command = Command::ShowInfo {
        database: database.to_string(),
    };
    read_text(channel, &command).await
}

/// Returns the server's free-form description of itself.
pub(crate) async fn server_info<S>(channel: &mut LineChannel<S>) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    read_text(channel, &Command::ShowServer).await
}

async fn read_text<S>(channel: &mut LineChannel<S>, command: &Command) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    reply::send(channel, command).await?;

    match reply::read_header(channel, command).await? {
        Some(header) if !header.code.is_success() => {}
        _ => return Ok(String::new()),
    }

    let lines = reply::read_text_block(channel).await?;
    match reply::read_completion(channel).await? {
        Completion::Failed(_) => Ok(String::new()),
        Completion::Done | Completion::EndOfStream => Ok(lines.join("\n")),
    }
}
