//! Shared helpers for engine integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use rankboard_engine::{Entry, Leaderboard};
use rankboard_store::InMemoryStore;
use rankboard_types::{Identifier, RankedEntity, WriteMode};

/// Creates an in-memory leaderboard with the test configuration.
pub fn board() -> Leaderboard<InMemoryStore> {
    rankboard_test_utils::init_tracing();
    Leaderboard::in_memory(rankboard_test_utils::test_config())
}

/// Leaderboard identifier shorthand.
pub fn lb(name: &str) -> Identifier {
    Identifier::from(name)
}

/// Adds `(key, score)` pairs in one acknowledged write.
pub async fn seed(board: &Leaderboard<InMemoryStore>, leaderboard: &Identifier, entries: &[(String, f64)]) {
    let entities: Vec<Entry> =
        entries.iter().map(|(key, score)| Entry::new(key.as_str()).with_score(*score)).collect();
    board.add(leaderboard, &entities, WriteMode::Acknowledged).await.unwrap();
}

/// Adds `count` entities `e00`.. with strictly decreasing scores `count`..1.
pub async fn seed_distinct(board: &Leaderboard<InMemoryStore>, leaderboard: &Identifier, count: usize) {
    let entries: Vec<(String, f64)> =
        (0..count).map(|i| (format!("e{i:02}"), (count - i) as f64)).collect();
    seed(board, leaderboard, &entries).await;
}

/// Keys of a result, in order.
pub fn keys_of(result: &[RankedEntity]) -> Vec<&str> {
    result.iter().map(|e| e.key.as_str()).collect()
}

/// Ranks of a result, in order.
pub fn ranks_of(result: &[RankedEntity]) -> Vec<u64> {
    result.iter().map(|e| e.rank).collect()
}

/// Runs a future to completion on a fresh current-thread runtime.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(future)
}
