//! dictwire - A Command-Line DICT Client
//!
//! This is the entry point for the `dictwire` binary. It parses arguments,
//! opens one connection, runs a single lookup and prints the result.

use anyhow::{bail, Context};
use dictwire::{Database, DictConnection, MatchingStrategy};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// What the user asked for
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Define { word: String, database: String },
    Match {
        word: String,
        strategy: String,
        database: String,
    },
    Databases,
    Strategies,
    Info { database: String },
    Server,
}

/// Client configuration
#[derive(Debug)]
struct Config {
    /// Server to connect to
    host: String,
    /// Port the server listens on
    port: u16,
    /// Log at debug level
    verbose: bool,
    /// The lookup to run
    action: Action,
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args)
    }

    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut host = dictwire::DEFAULT_HOST.to_string();
        let mut port = dictwire::DEFAULT_PORT;
        let mut verbose = false;
        let mut positional = Vec::new();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    host = args
                        .get(i + 1)
                        .context("--host requires a value")?
                        .clone();
                    i += 2;
                }
                "--port" | "-p" => {
                    let value = args.get(i + 1).context("--port requires a value")?;
                    port = value
                        .parse()
                        .with_context(|| format!("invalid port number: {}", value))?;
                    i += 2;
                }
                "--verbose" => {
                    verbose = true;
                    i += 1;
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("dictwire version {}", dictwire::VERSION);
                    std::process::exit(0);
                }
                other if other.starts_with('-') && other.len() > 1 => {
                    bail!("unknown argument: {}", other);
                }
                other => {
                    positional.push(other.to_string());
                    i += 1;
                }
            }
        }

        let action = parse_action(&positional)?;
        Ok(Self {
            host,
            port,
            verbose,
            action,
        })
    }
}

fn parse_action(positional: &[String]) -> anyhow::Result<Action> {
    let arg = |n: usize, default: &str| {
        positional
            .get(n)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };
    let word = || positional.get(1).cloned().context("missing word");

    let action = match positional.first().map(String::as_str) {
        Some("define") => Action::Define {
            word: word()?,
            database: arg(2, Database::ALL),
        },
        Some("match") => Action::Match {
            word: word()?,
            strategy: arg(2, MatchingStrategy::SERVER_DEFAULT),
            database: arg(3, Database::ALL),
        },
        Some("databases") => Action::Databases,
        Some("strategies") => Action::Strategies,
        Some("info") => Action::Info {
            database: positional.get(1).cloned().context("missing database")?,
        },
        Some("server") => Action::Server,
        Some(other) => bail!("unknown command: {}", other),
        None => bail!("no command given (try --help)"),
    };
    Ok(action)
}

fn print_help() {
    println!(
        r#"
dictwire - A DICT protocol (RFC 2229) client

USAGE:
    dictwire [OPTIONS] <COMMAND> [ARGS]

COMMANDS:
    define <word> [database]              Look up definitions (default database: *)
    match <word> [strategy] [database]    List matching headwords (default strategy: .)
    databases                             List the server's databases
    strategies                            List the server's matching strategies
    info <database>                       Show information about a database
    server                                Show information about the server

OPTIONS:
    -h, --host <HOST>    Server to connect to (default: dict.org)
    -p, --port <PORT>    Port to connect to (default: 2628)
        --verbose        Log protocol traffic
    -v, --version        Print version information
        --help           Print this help message

EXAMPLES:
    dictwire define cat
    dictwire define cat wn
    dictwire match cat prefix
    dictwire --host localhost databases
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args()?;

    // Set up logging
    let filter = if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!(?config, "Starting");

    let conn = DictConnection::connect_with_port(&config.host, config.port)
        .await
        .with_context(|| format!("could not connect to {}:{}", config.host, config.port))?;

    let result = run(&conn, &config.action).await;
    conn.close().await;
    result
}

/// Runs one action and prints its result to stdout.
async fn run(conn: &DictConnection, action: &Action) -> anyhow::Result<()> {
    match action {
        Action::Define { word, database } => {
            let definitions = conn.define(word, &Database::new(database.as_str(), "")).await?;
            if definitions.is_empty() {
                println!("No definitions found for \"{}\"", word);
            }
            for definition in definitions {
                println!("{}\n", definition);
            }
        }
        Action::Match {
            word,
            strategy,
            database,
        } => {
            let strategy = MatchingStrategy::new(strategy.as_str(), "");
            let matches = conn
                .match_words(word, &strategy, &Database::new(database.as_str(), ""))
                .await?;
            if matches.is_empty() {
                println!("No matches found for \"{}\"", word);
            }
            for word in matches {
                println!("{}", word);
            }
        }
        Action::Databases => {
            let mut databases: Vec<_> = conn.databases().await?.into_values().collect();
            databases.sort_by(|a, b| a.name().cmp(b.name()));
            for database in databases {
                println!("{:<16} {}", database.name(), database.description());
            }
        }
        Action::Strategies => {
            for strategy in conn.strategies().await? {
                println!("{:<16} {}", strategy.name(), strategy.description());
            }
        }
        Action::Info { database } => {
            let info = conn.database_info(&Database::new(database.as_str(), "")).await?;
            println!("{}", info);
        }
        Action::Server => {
            println!("{}", conn.server_info().await?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_define_defaults() {
        let config = Config::parse(&args(&["define", "cat"])).unwrap();
        assert_eq!(config.host, "dict.org");
        assert_eq!(config.port, 2628);
        assert_eq!(
            config.action,
            Action::Define {
                word: "cat".to_string(),
                database: "*".to_string()
            }
        );
    }

    #[test]
    fn test_match_with_options() {
        let config = Config::parse(&args(&[
            "--host", "localhost", "-p", "2629", "match", "cat", "prefix", "wn",
        ]))
        .unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 2629);
        assert_eq!(
            config.action,
            Action::Match {
                word: "cat".to_string(),
                strategy: "prefix".to_string(),
                database: "wn".to_string()
            }
        );
    }

    #[test]
    fn test_listing_commands() {
        assert_eq!(
            Config::parse(&args(&["databases"])).unwrap().action,
            Action::Databases
        );
        assert_eq!(
            Config::parse(&args(&["strategies", "--verbose"]))
                .unwrap()
                .action,
            Action::Strategies
        );
    }

    #[test]
    fn test_first_match_selector_is_positional() {
        let config = Config::parse(&args(&["define", "cat", "!"])).unwrap();
        assert!(matches!(config.action, Action::Define { ref database, .. } if database == "!"));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Config::parse(&args(&[])).is_err());
        assert!(Config::parse(&args(&["define"])).is_err());
        assert!(Config::parse(&args(&["info"])).is_err());
        assert!(Config::parse(&args(&["lookup", "cat"])).is_err());
        assert!(Config::parse(&args(&["--port", "http", "server"])).is_err());
        assert!(Config::parse(&args(&["--bogus", "server"])).is_err());
    }
}
