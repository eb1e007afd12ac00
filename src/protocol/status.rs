//! DICT Status Codes
//!
//! Every reply that opens a block on a DICT connection starts with a
//! three-digit status code. The first digit places the reply in a family,
//! and that family is what drives control flow in every operation:
//!
//! ```text
//! 1yz  Preliminary       more lines follow before the final status
//! 2yz  Completion        the command finished (or a block-opening success)
//! 3yz  Intermediate      the server wants more input (authentication only)
//! 4yz  Transient failure the command failed, retrying later may help
//! 5yz  Permanent failure the command failed
//! ```
//!
//! Content lines inside a text block carry no status. Callers only ask for a
//! status when the operation expects a new block or a final reply.

use std::fmt;

/// Well-known status codes from RFC 2229.
pub mod codes {
    pub const DATABASES_PRESENT: u16 = 110;
    pub const STRATEGIES_AVAILABLE: u16 = 111;
    pub const DATABASE_INFO: u16 = 112;
    pub const SERVER_INFO: u16 = 114;
    pub const DEFINITIONS_RETRIEVED: u16 = 150;
    pub const DEFINITION_FOLLOWS: u16 = 151;
    pub const MATCHES_FOUND: u16 = 152;
    pub const GREETING: u16 = 220;
    pub const CLOSING: u16 = 221;
    pub const OK: u16 = 250;
    pub const SERVER_UNAVAILABLE: u16 = 420;
    pub const SHUTTING_DOWN: u16 = 421;
    pub const SYNTAX_ERROR: u16 = 500;
    pub const ILLEGAL_PARAMETERS: u16 = 501;
    pub const COMMAND_NOT_IMPLEMENTED: u16 = 502;
    pub const PARAMETER_NOT_IMPLEMENTED: u16 = 503;
    pub const INVALID_DATABASE: u16 = 550;
    pub const INVALID_STRATEGY: u16 = 551;
    pub const NO_MATCH: u16 = 552;
    pub const NO_DATABASES: u16 = 554;
    pub const NO_STRATEGIES: u16 = 555;
}

/// The category a status code belongs to, taken from its leading digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFamily {
    Preliminary,
    Completion,
    Intermediate,
    TransientFailure,
    PermanentFailure,
}

/// A three-digit reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Wraps a raw code. Returns `None` outside `100..=599`.
    pub fn new(code: u16) -> Option<Self> {
        (100..=599).contains(&code).then_some(Self(code))
    }

    /// Reads the status prefix of a line.
    ///
    /// The line must start with exactly three ASCII digits followed by either
    /// the end of the line or a space. Anything else (a content line, the
    /// block terminator, a token such as `1234`) is not a status line.
    pub fn parse(line: &str) -> Option<Self> {
        let bytes = line.as_bytes();
        if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
            return None;
        }
        if bytes.len() > 3 && bytes[3] != b' ' {
            return None;
        }

        let code = bytes[..3]
            .iter()
            .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
        Self::new(code)
    }

    /// Returns the numeric code.
    pub fn as_u16(self) -> u16 {
        self.0
    }

    pub fn family(self) -> StatusFamily {
        match self.0 / 100 {
            1 => StatusFamily::Preliminary,
            2 => StatusFamily::Completion,
            3 => StatusFamily::Intermediate,
            4 => StatusFamily::TransientFailure,
            _ => StatusFamily::PermanentFailure,
        }
    }

    pub fn is_preliminary(self) -> bool {
        self.family() == StatusFamily::Preliminary
    }

    pub fn is_success(self) -> bool {
        self.family() == StatusFamily::Completion
    }

    /// True for both transient (4yz) and permanent (5yz) failures.
    pub fn is_failure(self) -> bool {
        matches!(
            self.family(),
            StatusFamily::TransientFailure | StatusFamily::PermanentFailure
        )
    }

    /// True when the server refused the command itself (syntax error,
    /// illegal parameters, or an unimplemented command or parameter), as
    /// opposed to refusing to find anything for it.
    pub fn is_command_rejected(self) -> bool {
        (codes::SYNTAX_ERROR..=codes::PARAMETER_NOT_IMPLEMENTED).contains(&self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reply line that starts with a status code, split into code and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub code: StatusCode,
    /// Everything after the code and its separating space.
    pub text: String,
}

impl StatusLine {
    /// Splits a status line. Returns `None` if the line has no status prefix.
    pub fn parse(line: &str) -> Option<Self> {
        let code = StatusCode::parse(line)?;
        let text = line.get(4..).unwrap_or_default().to_string();
        Some(Self { code, text })
    }

    /// The first run of decimal digits in the text, if any.
    ///
    /// Headers such as `150 12 definitions retrieved` and
    /// `152 3 matches found` carry a count here. The width of the number is
    /// not fixed.
    pub fn leading_count(&self) -> Option<usize> {
        let start = self.text.find(|c: char| c.is_ascii_digit())?;
        let digits: String = self.text[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.text)
        }
    }
}
