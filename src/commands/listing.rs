//! Database and strategy enumeration (`SHOW DB`, `SHOW STRAT`).
//!
//! Both listings share one shape: a short name, then its description in
//! quotes.
//!
//! ```text
//! C: SHOW DB                          C: SHOW STRAT
//! S: 110 2 databases present          S: 111 2 strategies available
//! S: wn "WordNet (r) 3.0"             S: exact "Match headwords exactly"
//! S: gcide "Collaborative Dict."      S: prefix "Match prefixes"
//! S: .                                S: .
//! S: 250 ok                           S: 250 ok
//! ```

use super::reply::{self, Completion};
use crate::connection::LineChannel;
use crate::error::Result;
use crate::protocol::{leading_token, quoted_fields, Command, Database, MatchingStrategy};
use std::collections::{HashMap, HashSet};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

/// Lists the server's databases keyed by name. A repeated name keeps its
/// last description.
pub(crate) async fn databases<S>(channel: &mut LineChannel<S>) -> Result<HashMap<String, Database>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let entries = read_listing(channel, &Command::ShowDatabases).await?;

    let mut databases = HashMap::with_capacity(entries.len());
    for (name, description) in entries {
        databases.insert(name.clone(), Database::new(name, description));
    }
    Ok(databases)
}

/// Lists the server's matching strategies in arrival order, without
/// duplicates.
pub(crate) async fn strategies<S>(channel: &mut LineChannel<S>) -> Result<Vec<MatchingStrategy>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let entries = read_listing(channel, &Command::ShowStrategies).await?;

    let mut seen = HashSet::new();
    let strategies = entries
        .into_iter()
        .map(|(name, description)| MatchingStrategy::new(name, description))
        .filter(|strategy| seen.insert(strategy.clone()))
        .collect();
    Ok(strategies)
}

/// Sends a listing command and returns its `(name, description)` pairs.
///
/// A line with several quoted fields produces one pair per field, all under
/// the same name. A failure status at either end yields no pairs.
async fn read_listing<S>(
    channel: &mut LineChannel<S>,
    command: &Command,
) -> Result<Vec<(String, String)>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    reply::send(channel, command).await?;

    let header = match reply::read_header(channel, command).await? {
        Some(header) if !header.code.is_success() => header,
        _ => return Ok(Vec::new()),
    };
    debug!(command = command.name(), announced = ?header.leading_count(), "Reading listing");

    let lines = reply::read_text_block(channel).await?;
    if let Completion::Failed(_) = reply::read_completion(channel).await? {
        return Ok(Vec::new());
    }

    let mut entries = Vec::with_capacity(lines.len());
    for line in &lines {
        let Some(name) = leading_token(line) else {
            trace!(line = %line, "Skipping listing line without a name");
            continue;
        };
        for description in quoted_fields(line) {
            entries.push((name.to_string(), description.into_owned()));
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionStats;
    use crate::error::DictError;
    use std::sync::Arc;
    use tokio_test::io::{Builder, Mock};

    fn channel(mock: Mock) -> LineChannel<Mock> {
        LineChannel::new(mock, Arc::new(ConnectionStats::new()))
    }

    #[tokio::test]
    async fn test_databases() {
        let mock = Builder::new()
            .write(b"SHOW DB\r\n")
            .read(b"110 2 databases present\r\n")
            .read(b"wn \"WordNet (r) 3.0 (2006)\"\r\n")
            .read(b"gcide \"The Collaborative International Dictionary of English\"\r\n")
            .read(b".\r\n250 ok\r\n")
            .build();
        let mut channel = channel(mock);

        let databases = databases(&mut channel).await.unwrap();

        assert_eq!(databases.len(), 2);
        assert_eq!(databases["wn"].name(), "wn");
        assert_eq!(databases["wn"].description(), "WordNet (r) 3.0 (2006)");
        assert_eq!(
            databases["gcide"].description(),
            "The Collaborative International Dictionary of English"
        );
    }

    #[tokio::test]
    async fn test_repeated_database_last_wins() {
        let mock = Builder::new()
            .write(b"SHOW DB\r\n")
            .read(b"110 2 databases present\r\nwn \"old\"\r\nwn \"new\"\r\n.\r\n250 ok\r\n")
            .build();
        let mut channel = channel(mock);

        let databases = databases(&mut channel).await.unwrap();

        assert_eq!(databases.len(), 1);
        assert_eq!(databases["wn"].description(), "new");
    }

    #[tokio::test]
    async fn test_no_databases_is_empty() {
        let mock = Builder::new()
            .write(b"SHOW DB\r\n")
            .read(b"554 no databases present\r\n")
            .build();
        let mut channel = channel(mock);

        assert!(databases(&mut channel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_strategies_without_duplicates() {
        let mock = Builder::new()
            .write(b"SHOW STRAT\r\n")
            .read(b"111 3 strategies available\r\n")
            .read(b"exact \"Match headwords exactly\"\r\n")
            .read(b"prefix \"Match prefixes\"\r\n")
            .read(b"exact \"Match headwords exactly\"\r\n")
            .read(b".\r\n250 ok\r\n")
            .build();
        let mut channel = channel(mock);

        let strategies = strategies(&mut channel).await.unwrap();

        assert_eq!(
            strategies,
            vec![
                MatchingStrategy::new("exact", "Match headwords exactly"),
                MatchingStrategy::new("prefix", "Match prefixes"),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_strategies_is_empty() {
        let mock = Builder::new()
            .write(b"SHOW STRAT\r\n")
            .read(b"555 no strategies available\r\n")
            .build();
        let mut channel = channel(mock);

        assert!(strategies(&mut channel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_skips_nameless_lines() {
        let mock = Builder::new()
            .write(b"SHOW STRAT\r\n")
            .read(b"111 1 strategies available\r\n\r\n \"orphan\"\r\nsoundex \"Match using SOUNDEX\"\r\n.\r\n250 ok\r\n")
            .build();
        let mut channel = channel(mock);

        let strategies = strategies(&mut channel).await.unwrap();

        assert_eq!(strategies.len(), 1);
        assert_eq!(strategies[0].name(), "soundex");
    }

    #[tokio::test]
    async fn test_listing_rejected_command() {
        let mock = Builder::new()
            .write(b"SHOW DB\r\n")
            .read(b"502 command not implemented\r\n")
            .build();
        let mut channel = channel(mock);

        let err = databases(&mut channel).await.unwrap_err();
        assert!(matches!(err, DictError::Protocol(_)));
    }
}
