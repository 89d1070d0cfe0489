//! rankboard-engine: multi-semantics leaderboards over an ordered key-value store.
//!
//! A leaderboard ranks entities by score, highest first, under four ranking
//! semantics chosen per query:
//!
//! | Scores `[250, 200, 100, 100, 50]` | Ranks             |
//! |-----------------------------------|-------------------|
//! | `Default`                         | `[1, 2, 3, 4, 5]` |
//! | `Dense`                           | `[1, 2, 3, 3, 4]` |
//! | `StandardCompetition`             | `[1, 2, 3, 3, 5]` |
//! | `ModifiedCompetition`             | `[1, 2, 4, 4, 5]` |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             Leaderboard (facade)            │
//! │   validation, key scheme, instrumentation   │
//! └────────────────┬────────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────────┐
//! │               RankingEngine                 │
//! │ change-sets, windows, dispatch, assembly    │
//! └────────────────┬────────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────────┐
//! │        Store (rankboard-store trait)        │
//! │ sorted sets, hashes, transactions, scripts  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Each leaderboard lives in three store collections ([`LeaderboardKeys`]).
//! Scores are stored negated ([`score`]) so the store's ascending order is
//! the leaderboard's best-first order. Dense and competition ranks are
//! computed by read-only store scripts ([`scripts`]).

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod entity;
mod leaderboard;

pub mod keys;
pub mod metrics;
pub mod ranking;
pub mod score;
pub mod scripts;
pub mod window;

pub use engine::{
    RankingEngine, add_transaction, delete_entity_transaction, delete_leaderboard_transaction,
    update_score_transaction,
};
pub use entity::{Entry, LeaderboardEntity};
pub use keys::LeaderboardKeys;
pub use leaderboard::Leaderboard;
pub use ranking::CompetitionMode;
pub use scripts::{RankingScripts, ranking_scripts, register_native};
pub use window::Window;
