use std::fmt;

use serde::Serialize;

/// Result of a row parse or a dashboard query.
///
/// Every query either produces data or says why it could not; nothing in the
/// core raises for missing or partial input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    Empty(EmptyReason),
    Malformed(RowIssue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum EmptyReason {
    /// The underlying table has no rows at all.
    NoData,
    /// A line with no content.
    BlankRow,
    /// The team name could not be resolved in the player table.
    UnknownTeam(String),
    /// The team exists but nothing is left after venue/window/season filters.
    NoMatches,
    /// No player table was loaded.
    NoPlayerData,
    /// The two teams never met.
    NoMeetings,
}

/// A skipped input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub file: String,
    pub line: u64,
    pub reason: String,
}

impl<T> Outcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    /// Lifts an optional query result, tagging absence with `reason`.
    pub fn from_option(value: Option<T>, reason: EmptyReason) -> Self {
        match value {
            Some(value) => Outcome::Ready(value),
            None => Outcome::Empty(reason),
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoData => write!(f, "no data loaded"),
            EmptyReason::BlankRow => write!(f, "blank row"),
            EmptyReason::UnknownTeam(team) => write!(f, "no player data for '{team}'"),
            EmptyReason::NoMatches => write!(f, "insufficient data"),
            EmptyReason::NoPlayerData => write!(f, "no player data loaded"),
            EmptyReason::NoMeetings => write!(f, "no previous meetings"),
        }
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.reason)
    }
}
