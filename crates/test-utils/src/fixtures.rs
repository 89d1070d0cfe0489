//! Test fixtures.

use rankboard_types::{LeaderboardConfig, RankingType};

/// Scores of the canonical tie-law board, best first.
pub const TIE_LAW_SCORES: [f64; 5] = [250.0, 200.0, 100.0, 100.0, 50.0];

/// The canonical tie-law board: `p1`..`p5` holding [`TIE_LAW_SCORES`].
///
/// `p3` and `p4` tie; member order puts `p3` first.
#[must_use]
pub fn tie_law_board() -> Vec<(String, f64)> {
    TIE_LAW_SCORES.iter().enumerate().map(|(i, s)| (format!("p{}", i + 1), *s)).collect()
}

/// Expected ranks of the tie-law board under each ranking type.
#[must_use]
pub fn tie_law_ranks(ranking: RankingType) -> [u64; 5] {
    match ranking {
        RankingType::Default => [1, 2, 3, 4, 5],
        RankingType::Dense => [1, 2, 3, 3, 4],
        RankingType::StandardCompetition => [1, 2, 3, 3, 5],
        RankingType::ModifiedCompetition => [1, 2, 4, 4, 5],
    }
}

/// Returns a configuration with small limits for tests.
///
/// - `default_offset`: 2
/// - `max_offset`: 50
/// - `max_page_size`: 100
#[must_use]
pub fn test_config() -> LeaderboardConfig {
    LeaderboardConfig { default_offset: 2, max_offset: 50, max_page_size: 100, ..LeaderboardConfig::default() }
}
