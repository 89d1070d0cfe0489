//! Input validation for leaderboard operations.
//!
//! Every public leaderboard operation runs these checks first, so a bad
//! argument is rejected before any store command is issued. Each check maps
//! to its own error kind:
//!
//! - Identifiers: non-empty text within `max_identifier_bytes`, or a positive
//!   number ([`LeaderboardError::InvalidIdentifier`](crate::LeaderboardError::InvalidIdentifier)).
//! - Offsets and page sizes: within configured limits
//!   ([`LeaderboardError::InvalidOffset`](crate::LeaderboardError::InvalidOffset)).
//! - Score ranges: non-negative, not NaN, `min <= max`
//!   ([`LeaderboardError::InvalidRange`](crate::LeaderboardError::InvalidRange)).
//! - Scores: finite and non-negative ([`LeaderboardError::InvalidScore`](crate::LeaderboardError::InvalidScore)).

use snafu::ensure;

use crate::{
    config::LeaderboardConfig,
    error::{
        InvalidIdentifierSnafu, InvalidOffsetSnafu, InvalidRangeSnafu, InvalidScoreSnafu, Result,
    },
    types::Identifier,
};

/// Validates a leaderboard or entity identifier.
///
/// `field` names the parameter in the resulting error (`leaderboard_id`,
/// `entity_key`).
///
/// # Errors
///
/// Returns [`LeaderboardError::InvalidIdentifier`](crate::LeaderboardError::InvalidIdentifier)
/// if the text is empty or blank, exceeds `max_identifier_bytes`, or the number
/// is not positive.
pub fn validate_identifier(
    id: &Identifier,
    field: &'static str,
    config: &LeaderboardConfig,
) -> Result<()> {
    match id {
        Identifier::Number(n) => {
            ensure!(*n > 0, InvalidIdentifierSnafu { field, reason: format!("numeric identifier {n} must be positive") });
        },
        Identifier::Text(s) => {
            ensure!(!s.trim().is_empty(), InvalidIdentifierSnafu { field, reason: "must not be empty" });
            ensure!(
                s.len() <= config.max_identifier_bytes,
                InvalidIdentifierSnafu {
                    field,
                    reason: format!(
                        "length {} bytes exceeds maximum {} bytes",
                        s.len(),
                        config.max_identifier_bytes
                    ),
                }
            );
        },
    }
    Ok(())
}

/// Validates the number of neighbours requested on each side of an entity.
///
/// # Errors
///
/// Returns [`LeaderboardError::InvalidOffset`](crate::LeaderboardError::InvalidOffset)
/// if `offset` exceeds `max_offset`.
pub fn validate_offset(offset: u32, config: &LeaderboardConfig) -> Result<()> {
    ensure!(
        offset <= config.max_offset,
        InvalidOffsetSnafu {
            offset: u64::from(offset),
            reason: format!("exceeds maximum offset {}", config.max_offset),
        }
    );
    Ok(())
}

/// Validates the size of a paginated view.
///
/// # Errors
///
/// Returns [`LeaderboardError::InvalidOffset`](crate::LeaderboardError::InvalidOffset)
/// if `page_size` is zero or exceeds `max_page_size`.
pub fn validate_page_size(page_size: u32, config: &LeaderboardConfig) -> Result<()> {
    ensure!(page_size > 0, InvalidOffsetSnafu { offset: 0_u64, reason: "page size must be at least 1" });
    ensure!(
        page_size <= config.max_page_size,
        InvalidOffsetSnafu {
            offset: u64::from(page_size),
            reason: format!("page size exceeds maximum {}", config.max_page_size),
        }
    );
    Ok(())
}

/// Validates a score before it is written.
///
/// # Errors
///
/// Returns [`LeaderboardError::InvalidScore`](crate::LeaderboardError::InvalidScore)
/// if the score is NaN, infinite, or negative.
pub fn validate_score(score: f64) -> Result<()> {
    ensure!(score.is_finite(), InvalidScoreSnafu { score, reason: "must be finite" });
    ensure!(score >= 0.0, InvalidScoreSnafu { score, reason: "must be >= 0" });
    Ok(())
}

/// Validates an inclusive score range.
///
/// `max` may be `+∞` to select everything at or above `min`.
///
/// # Errors
///
/// Returns [`LeaderboardError::InvalidRange`](crate::LeaderboardError::InvalidRange)
/// if either bound is NaN or negative, `min` is infinite, or `min > max`.
pub fn validate_score_range(min: f64, max: f64) -> Result<()> {
    ensure!(!min.is_nan() && !max.is_nan(), InvalidRangeSnafu { min, max, reason: "bounds must be numbers" });
    ensure!(min >= 0.0, InvalidRangeSnafu { min, max, reason: "min must be >= 0" });
    ensure!(max >= 0.0, InvalidRangeSnafu { min, max, reason: "max must be >= 0" });
    ensure!(min.is_finite(), InvalidRangeSnafu { min, max, reason: "min must be finite" });
    ensure!(min <= max, InvalidRangeSnafu { min, max, reason: "min must not exceed max" });
    Ok(())
}
