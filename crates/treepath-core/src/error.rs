use std::fmt;

use crate::decode::DecodeError;
use crate::matcher::MatcherError;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidExpression,
    InputReadFailed,
    InputDecodeFailed,
    NoMatch,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidExpression => "E2001",
            Self::InputReadFailed => "E3001",
            Self::InputDecodeFailed => "E3002",
            Self::NoMatch => "E4001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidExpression => "Invalid predicate expression",
            Self::InputReadFailed => "Input could not be read",
            Self::InputDecodeFailed => "Input could not be decoded",
            Self::NoMatch => "No node matched",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .treepath.toml and retry."),
            Self::InvalidExpression => {
                Some("Write clauses as FIELD OP VALUE, e.g. `id==4` or `name~child`.")
            }
            Self::InputReadFailed => Some("Check the input path and read permissions."),
            Self::InputDecodeFailed => {
                Some("Pass --input-format if the file extension does not match its contents.")
            }
            Self::NoMatch => None,
        }
    }

    /// Lowercase identifier used in JSON error payloads.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::ConfigParseError => "config_parse_error",
            Self::InvalidExpression => "invalid_expression",
            Self::InputReadFailed => "input_read_failed",
            Self::InputDecodeFailed => "input_decode_failed",
            Self::NoMatch => "no_match",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures raised by the layers around the search itself.
///
/// The search never fails on malformed trees; these cover expression parsing,
/// input handling and the optional miss-is-an-error mode.
#[derive(Debug, thiserror::Error)]
pub enum TreepathError {
    #[error(transparent)]
    Expression(#[from] MatcherError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to read input {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no node matched {0}")]
    NoMatch(String),
}

impl TreepathError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Expression(_) => ErrorCode::InvalidExpression,
            Self::Decode(_) => ErrorCode::InputDecodeFailed,
            Self::Read { .. } => ErrorCode::InputReadFailed,
            Self::NoMatch(_) => ErrorCode::NoMatch,
        }
    }
}
