//! Key scheme for leaderboard collections.
//!
//! Every leaderboard is spread over three store keys derived from its
//! identifier by a fixed prefix:
//!
//! | Collection          | Key format                                   |
//! |---------------------|----------------------------------------------|
//! | Main index          | `sorted_set_leaderboard_{id}`                |
//! | Distinct-score index| `sorted_set_unique_score_{id}`               |
//! | Metadata map        | `entity_data_hashset_leaderboard_{id}`       |
//!
//! A leaderboard has no record of its own; it exists while any of the three
//! keys holds data.

use rankboard_types::Identifier;

/// Prefix of the main ordered index (entity key -> inverted score).
pub const MAIN_INDEX_PREFIX: &str = "sorted_set_leaderboard_";

/// Prefix of the distinct-score index (inverted score -> inverted score).
pub const DISTINCT_SCORE_PREFIX: &str = "sorted_set_unique_score_";

/// Prefix of the metadata map (entity key -> opaque payload).
pub const METADATA_PREFIX: &str = "entity_data_hashset_leaderboard_";

/// The three store keys backing one leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardKeys {
    /// Main ordered index.
    pub main: String,
    /// Distinct-score index.
    pub distinct: String,
    /// Metadata map.
    pub metadata: String,
}

impl LeaderboardKeys {
    /// Derives the keys for a leaderboard.
    pub fn new(leaderboard: &Identifier) -> Self {
        Self {
            main: format!("{MAIN_INDEX_PREFIX}{leaderboard}"),
            distinct: format!("{DISTINCT_SCORE_PREFIX}{leaderboard}"),
            metadata: format!("{METADATA_PREFIX}{leaderboard}"),
        }
    }

    /// Returns all three keys, main index first.
    pub fn all(&self) -> Vec<String> {
        vec![self.main.clone(), self.distinct.clone(), self.metadata.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_for_text_identifier() {
        let keys = LeaderboardKeys::new(&Identifier::from("season-1"));
        assert_eq!(keys.main, "sorted_set_leaderboard_season-1");
        assert_eq!(keys.distinct, "sorted_set_unique_score_season-1");
        assert_eq!(keys.metadata, "entity_data_hashset_leaderboard_season-1");
    }

    #[test]
    fn test_numeric_and_text_forms_share_keys() {
        assert_eq!(
            LeaderboardKeys::new(&Identifier::Number(42)),
            LeaderboardKeys::new(&Identifier::from("42"))
        );
    }

    #[test]
    fn test_all_keys_are_distinct() {
        let all = LeaderboardKeys::new(&Identifier::from("x")).all();
        assert_eq!(all.len(), 3);
        assert_ne!(all[0], all[1]);
        assert_ne!(all[1], all[2]);
        assert_ne!(all[0], all[2]);
    }
}
