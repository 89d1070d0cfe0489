//! Proptest strategies for leaderboard tests.
//!
//! Scores are drawn from a small grid most of the time so boards are full of
//! ties, which is where the ranking semantics differ.
//!
//! # Usage
//!
//! ```no_run
//! use proptest::prelude::*;
//! use rankboard_test_utils::strategies;
//!
//! proptest! {
//!     #[test]
//!     fn my_property(board in strategies::arb_board(30)) {
//!         // every key in `board` is unique
//!     }
//! }
//! ```

use proptest::prelude::*;
use rankboard_types::RankingType;

/// Generates a non-negative finite score; usually a multiple of 50 below 1000.
pub fn arb_score() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => (0u32..20).prop_map(|n| f64::from(n) * 50.0),
        1 => 0.0..1_000_000.0_f64,
    ]
}

/// Generates an entity key matching `[a-z][a-z0-9]{0,11}`.
pub fn arb_entity_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,11}"
}

/// Generates 1..=`max_len` scores sorted best first.
pub fn arb_board_scores(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(arb_score(), 1..=max_len.max(1)).prop_map(|mut scores| {
        scores.sort_by(|a, b| b.total_cmp(a));
        scores
    })
}

/// Generates a board of 1..=`max_len` entities with unique keys.
pub fn arb_board(max_len: usize) -> impl Strategy<Value = Vec<(String, f64)>> {
    proptest::collection::btree_map(arb_entity_key(), arb_score(), 1..=max_len.max(1))
        .prop_map(|board| board.into_iter().collect())
}

/// Generates any ranking type.
pub fn arb_ranking_type() -> impl Strategy<Value = RankingType> {
    prop::sample::select(RankingType::ALL.to_vec())
}
