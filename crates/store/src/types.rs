//! Value types exchanged with the store.

use std::fmt;

/// A sorted-set member with its stored score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    /// Member identity.
    pub member: String,
    /// Stored score.
    pub score: f64,
}

impl ScoredMember {
    /// Creates a scored member.
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self { member: member.into(), score }
    }
}

/// One row of a ranking script reply: `(member, rank, score)`.
///
/// Score is the stored (inverted) score; callers restore it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRow {
    /// Member identity.
    pub member: String,
    /// 1-based rank computed by the script.
    pub rank: u64,
    /// Stored score.
    pub score: f64,
}

/// A score boundary for counting and range queries.
///
/// Mirrors the store's `-inf`, `+inf`, `x` (inclusive) and `(x` (exclusive)
/// bound syntax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    /// Below every score.
    NegInf,
    /// Above every score.
    PosInf,
    /// Includes the given score.
    Inclusive(f64),
    /// Excludes the given score.
    Exclusive(f64),
}

impl fmt::Display for ScoreBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegInf => f.write_str("-inf"),
            Self::PosInf => f.write_str("+inf"),
            Self::Inclusive(s) => write!(f, "{s}"),
            Self::Exclusive(s) => write!(f, "({s}"),
        }
    }
}

/// A script argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    /// Integer argument.
    Int(i64),
    /// Text argument.
    Text(String),
}

impl ScriptArg {
    /// Returns the argument as an integer, parsing text if needed.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for ScriptArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ScriptArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for ScriptArg {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<i32> for ScriptArg {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bound_display() {
        assert_eq!(ScoreBound::NegInf.to_string(), "-inf");
        assert_eq!(ScoreBound::Exclusive(-100.0).to_string(), "(-100");
        assert_eq!(ScoreBound::Inclusive(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_script_arg_as_i64() {
        assert_eq!(ScriptArg::from(7_u64).as_i64(), Some(7));
        assert_eq!(ScriptArg::Text("12".into()).as_i64(), Some(12));
        assert_eq!(ScriptArg::Text("x".into()).as_i64(), None);
    }
}
