//! DICT Commands and Value Types
//!
//! Commands are single text lines. Words are always sent quoted so that
//! multi-word headwords ("New York") survive as one parameter; database and
//! strategy names are bare tokens.
//!
//! A command must stay one line: [`Command::validate`] refuses words with a
//! line break and selectors that are empty or contain whitespace, quotes or
//! control characters.
//!
//! ## Examples
//!
//! ```text
//! DEFINE wn "cat"
//! MATCH * prefix "cat"
//! SHOW DB
//! SHOW STRAT
//! SHOW INFO wn
//! SHOW SERVER
//! QUIT
//! ```

use crate::error::{DictError, Result};
use std::fmt;

/// The line terminator used on the wire.
pub const CRLF: &str = "\r\n";

/// The line that closes a multi-line text block.
pub const BLOCK_TERMINATOR: &str = ".";

/// A command the client can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Define { database: String, word: String },
    Match {
        database: String,
        strategy: String,
        word: String,
    },
    ShowDatabases,
    ShowStrategies,
    ShowInfo { database: String },
    ShowServer,
    Quit,
}

impl Command {
    /// Renders the command line without its terminator.
    pub fn to_line(&self) -> String {
        match self {
            Command::Define { database, word } => {
                format!("DEFINE {} {}", database, quote(word))
            }
            Command::Match {
                database,
                strategy,
                word,
            } => format!("MATCH {} {} {}", database, strategy, quote(word)),
            Command::ShowDatabases => "SHOW DB".to_string(),
            Command::ShowStrategies => "SHOW STRAT".to_string(),
            Command::ShowInfo { database } => format!("SHOW INFO {}", database),
            Command::ShowServer => "SHOW SERVER".to_string(),
            Command::Quit => "QUIT".to_string(),
        }
    }

    /// Checks that the command renders as exactly one well-formed line.
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::Define { database, word } => {
                check_selector("database", database)?;
                check_word(word)
            }
            Command::Match {
                database,
                strategy,
                word,
            } => {
                check_selector("database", database)?;
                check_selector("strategy", strategy)?;
                check_word(word)
            }
            Command::ShowInfo { database } => check_selector("database", database),
            Command::ShowDatabases
            | Command::ShowStrategies
            | Command::ShowServer
            | Command::Quit => Ok(()),
        }
    }

    /// The command keyword, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Define { .. } => "DEFINE",
            Command::Match { .. } => "MATCH",
            Command::ShowDatabases => "SHOW DB",
            Command::ShowStrategies => "SHOW STRAT",
            Command::ShowInfo { .. } => "SHOW INFO",
            Command::ShowServer => "SHOW SERVER",
            Command::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

fn check_word(word: &str) -> Result<()> {
    if word.contains(['\r', '\n']) {
        return Err(DictError::protocol(format!(
            "word {:?} contains a line break",
            word
        )));
    }
    Ok(())
}

fn check_selector(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DictError::protocol(format!("empty {} name", kind)));
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '"')
    {
        return Err(DictError::protocol(format!(
            "{} name {:?} is not a single token",
            kind, name
        )));
    }
    Ok(())
}

/// Wraps a word in double quotes. Embedded quotes are escaped with a
/// backslash, which RFC 2229 servers accept inside quoted strings.
fn quote(word: &str) -> String {
    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// A database offered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Database {
    name: String,
    description: String,
}

impl Database {
    /// Selector that searches every database.
    pub const ALL: &'static str = "*";

    /// Selector that stops at the first database with a result.
    pub const FIRST_MATCH: &'static str = "!";

    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// The `*` selector.
    pub fn all() -> Self {
        Self::new(Self::ALL, "All databases")
    }

    /// The `!` selector.
    pub fn first_match() -> Self {
        Self::new(Self::FIRST_MATCH, "First database with a result")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.name)
    }
}

/// A matching strategy offered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchingStrategy {
    name: String,
    description: String,
}

impl MatchingStrategy {
    /// Selector for the server's default strategy.
    pub const SERVER_DEFAULT: &'static str = ".";

    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// The `.` selector.
    pub fn server_default() -> Self {
        Self::new(Self::SERVER_DEFAULT, "Server default")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for MatchingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.name)
    }
}

/// One definition returned by `DEFINE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    word: String,
    database: String,
    database_description: Option<String>,
    body: String,
}

impl Definition {
    pub fn new(word: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            database: database.into(),
            database_description: None,
            body: String::new(),
        }
    }

    pub fn with_database_description(mut self, description: impl Into<String>) -> Self {
        self.database_description = Some(description.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// The headword as the server spelled it.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The name of the database the definition came from.
    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn database_description(&self) -> Option<&str> {
        self.database_description.as_deref()
    }

    /// The definition text, lines joined with `\n`.
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.database_description {
            Some(description) => writeln!(f, "From {} [{}]:", description, self.database)?,
            None => writeln!(f, "From [{}]:", self.database)?,
        }
        write!(f, "{}", self.body)
    }
}
