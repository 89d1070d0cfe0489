//! Core type definitions for Rankboard.
//!
//! - [`Identifier`]: the tagged identifier used for leaderboards and entities
//! - [`RankingType`]: the four ranking semantics
//! - [`RankedEntity`]: a read result (key, rank, score, metadata)
//! - [`WriteMode`]: acknowledged vs. fire-and-forget writes

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier for a leaderboard or an entity within one.
///
/// Either free text or a numeric key. Both render to the same store member
/// form, so `Identifier::Text("42")` and `Identifier::Number(42)` address the
/// same entity.
///
/// # Display
///
/// Text renders verbatim, numbers in decimal: `player-1`, `42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Numeric identifier; must be positive.
    Number(i64),
    /// Text identifier; must be non-empty.
    Text(String),
}

impl Identifier {
    /// Returns the text form used as a store member or key suffix.
    #[must_use]
    pub fn as_member(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Identifier {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for Identifier {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&Identifier> for Identifier {
    fn from(value: &Identifier) -> Self {
        value.clone()
    }
}

// ============================================================================
// Ranking semantics
// ============================================================================

/// Ranking semantics applied when reading a leaderboard.
///
/// For scores `[250, 200, 100, 100, 50]`:
///
/// | Variant               | Ranks             |
/// |-----------------------|-------------------|
/// | `Default`             | `[1, 2, 3, 4, 5]` |
/// | `Dense`               | `[1, 2, 3, 3, 4]` |
/// | `StandardCompetition` | `[1, 2, 3, 3, 5]` |
/// | `ModifiedCompetition` | `[1, 2, 4, 4, 5]` |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum RankingType {
    /// Positional rank in store order; ties broken by member identity, never equal.
    #[default]
    Default = 1,
    /// Ties share a rank; the next tier's rank is one more.
    Dense = 2,
    /// Ties share a rank; a gap follows the tie group ("1224").
    StandardCompetition = 3,
    /// Ties share a rank; a gap precedes the tie group ("1334").
    ModifiedCompetition = 4,
}

impl RankingType {
    /// All ranking types in numeric order.
    pub const ALL: [Self; 4] =
        [Self::Default, Self::Dense, Self::StandardCompetition, Self::ModifiedCompetition];

    /// Returns the numeric code of this ranking type.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Returns the canonical name of this ranking type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Dense => "Dense",
            Self::StandardCompetition => "StandardCompetition",
            Self::ModifiedCompetition => "ModifiedCompetition",
        }
    }
}

impl fmt::Display for RankingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for RankingType {
    type Error = LeaderboardError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Default),
            2 => Ok(Self::Dense),
            3 => Ok(Self::StandardCompetition),
            4 => Ok(Self::ModifiedCompetition),
            other => Err(LeaderboardError::UnknownRankingType { value: other.to_string() }),
        }
    }
}

impl FromStr for RankingType {
    type Err = LeaderboardError;

    /// Parses either the canonical name (case-insensitive) or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i32>() {
            return Self::try_from(code);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LeaderboardError::UnknownRankingType { value: s.to_owned() })
    }
}

// ============================================================================
// Read results
// ============================================================================

/// A ranked leaderboard entry as returned by read operations.
///
/// Rank is computed per query under the requested [`RankingType`]; score is
/// the caller-visible score. Metadata is the opaque payload stored with the
/// entity, `None` when none was ever supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    /// Entity key as stored in the leaderboard.
    pub key: String,
    /// 1-based rank under the requested semantics.
    pub rank: u64,
    /// Caller-visible score.
    pub score: f64,
    /// Opaque caller payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<u8>>,
}

// ============================================================================
// Write modes
// ============================================================================

/// Acknowledgement contract for write operations.
///
/// Fire-and-forget writes are sent without waiting for the store's reply:
/// they surface no errors and give at-most-once observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WriteMode {
    /// Wait for the commit result; failures are surfaced.
    #[default]
    Acknowledged,
    /// Send without waiting for a reply.
    FireAndForget,
}

impl WriteMode {
    /// Maps the boolean `fire_and_forget` flag onto a write mode.
    #[must_use]
    pub const fn from_fire_and_forget(fire_and_forget: bool) -> Self {
        if fire_and_forget { Self::FireAndForget } else { Self::Acknowledged }
    }

    /// Returns true for [`WriteMode::FireAndForget`].
    #[must_use]
    pub const fn is_fire_and_forget(self) -> bool {
        matches!(self, Self::FireAndForget)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_member_form() {
        assert_eq!(Identifier::from("player-1").as_member(), "player-1");
        assert_eq!(Identifier::from(42_i64).as_member(), "42");
        assert_eq!(
            Identifier::from("42").as_member(),
            Identifier::Number(42).as_member(),
            "text and numeric forms address the same member"
        );
    }

    #[test]
    fn test_identifier_serde_untagged() {
        let text: Identifier = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(text, Identifier::Text("weekly".into()));
        let number: Identifier = serde_json::from_str("7").unwrap();
        assert_eq!(number, Identifier::Number(7));
    }

    #[test]
    fn test_ranking_type_codes() {
        for kind in RankingType::ALL {
            assert_eq!(RankingType::try_from(kind.code()).unwrap(), kind);
        }
        assert_eq!(RankingType::default(), RankingType::Default);
    }

    #[test]
    fn test_ranking_type_unknown_code() {
        let err = RankingType::try_from(5).unwrap_err();
        assert!(matches!(err, LeaderboardError::UnknownRankingType { ref value } if value == "5"));
        assert!(RankingType::try_from(0).is_err());
    }

    #[test]
    fn test_ranking_type_from_str() {
        assert_eq!("dense".parse::<RankingType>().unwrap(), RankingType::Dense);
        assert_eq!("StandardCompetition".parse::<RankingType>().unwrap(), RankingType::StandardCompetition);
        assert_eq!(" 4 ".parse::<RankingType>().unwrap(), RankingType::ModifiedCompetition);
        assert!("olympic".parse::<RankingType>().is_err());
    }

    #[test]
    fn test_write_mode_flag() {
        assert_eq!(WriteMode::from_fire_and_forget(true), WriteMode::FireAndForget);
        assert_eq!(WriteMode::from_fire_and_forget(false), WriteMode::Acknowledged);
        assert!(!WriteMode::default().is_fire_and_forget());
    }

    #[test]
    fn test_ranked_entity_skips_absent_metadata() {
        let entity = RankedEntity { key: "p1".into(), rank: 1, score: 10.0, metadata: None };
        let json = serde_json::to_string(&entity).unwrap();
        assert!(!json.contains("metadata"));
    }
}
