//! Core types, errors, validation, and configuration for Rankboard.
//!
//! This crate provides the foundational pieces shared by the store and engine
//! crates:
//! - Identifier and ranking types ([`Identifier`], [`RankingType`])
//! - Read results ([`RankedEntity`]) and write modes ([`WriteMode`])
//! - The error taxonomy using snafu ([`LeaderboardError`], [`StoreError`])
//! - Input validation run before any store call
//! - Leaderboard configuration

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use config::{ConfigError, LeaderboardConfig};
pub use error::{ErrorCode, LeaderboardError, Result, StoreError};
pub use types::{Identifier, RankedEntity, RankingType, WriteMode};
