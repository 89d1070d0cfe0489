//! Brute-force reference ranking.
//!
//! Quadratic and obviously correct. Property tests compare the engine against
//! it.

use rankboard_types::RankingType;

/// Ranks of every position of a board whose scores are listed best first.
///
/// # Panics
///
/// Panics if `scores` is not sorted descending.
#[must_use]
pub fn expected_ranks(scores: &[f64], ranking: RankingType) -> Vec<u64> {
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "scores must be sorted best first");

    scores
        .iter()
        .enumerate()
        .map(|(position, &score)| {
            let better = scores.iter().filter(|&&s| s > score).count() as u64;
            let through = scores.iter().filter(|&&s| s >= score).count() as u64;
            match ranking {
                RankingType::Default => position as u64 + 1,
                RankingType::Dense => {
                    let mut tiers: Vec<f64> = scores.iter().copied().filter(|&s| s > score).collect();
                    tiers.dedup();
                    tiers.len() as u64 + 1
                },
                RankingType::StandardCompetition => better + 1,
                RankingType::ModifiedCompetition => through,
            }
        })
        .collect()
}

/// Sorts a board into store order: score descending, then key ascending.
#[must_use]
pub fn store_order(board: &[(String, f64)]) -> Vec<(String, f64)> {
    let mut sorted = board.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{TIE_LAW_SCORES, tie_law_ranks};

    #[test]
    fn test_oracle_matches_tie_laws() {
        for ranking in RankingType::ALL {
            assert_eq!(expected_ranks(&TIE_LAW_SCORES, ranking), tie_law_ranks(ranking).to_vec());
        }
    }

    #[test]
    fn test_store_order_breaks_ties_by_key() {
        let board = vec![("b".to_owned(), 1.0), ("a".to_owned(), 1.0), ("c".to_owned(), 2.0)];
        let keys: Vec<_> = store_order(&board).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }
}
