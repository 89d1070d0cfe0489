//! Error types for Rankboard using snafu.
//!
//! Defines the error taxonomy surfaced by every leaderboard operation:
//! - Validation errors raised by the guard before any store call
//! - Transaction errors (the store refused to commit a write batch)
//! - Configuration/programming errors (unknown ranking type)
//! - Store errors from the external collaborator, passed through unwrapped
//!
//! Each error variant maps to an [`ErrorCode`] with a unique numeric identifier,
//! retryability classification, and suggested recovery action.

use core::fmt;

use snafu::{Location, Snafu};

/// Unified result type for leaderboard operations.
pub type Result<T, E = LeaderboardError> = std::result::Result<T, E>;

/// Machine-readable error codes for programmatic error handling.
///
/// | Range     | Domain     | Examples                                  |
/// |-----------|------------|-------------------------------------------|
/// | 1000–1099 | Validation | Identifier, offset, range, score          |
/// | 2000–2099 | Store      | Transport, transaction commit refused     |
/// | 3000–3099 | Domain     | Unknown ranking type, entity not found    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // --- Validation errors (1000–1099) ---
    /// Leaderboard or entity identifier is empty, too long, or non-positive.
    InvalidIdentifier = 1000,
    /// Neighbour offset or page size is outside the accepted range.
    InvalidOffset = 1001,
    /// Score range bounds are negative, NaN, or inverted.
    InvalidRange = 1002,
    /// Score is negative or not finite.
    InvalidScore = 1003,

    // --- Store errors (2000–2099) ---
    /// Error reported by the store collaborator (transport, command reply).
    Store = 2000,
    /// The store refused to commit a transaction.
    TransactionFailed = 2001,

    // --- Domain errors (3000–3099) ---
    /// Raw ranking type value does not name a known ranking semantics.
    UnknownRankingType = 3000,
    /// Entity is not a member of the leaderboard.
    EntityNotFound = 3001,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a numeric code to an `ErrorCode`, returning `None` for unknown values.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1000 => Some(Self::InvalidIdentifier),
            1001 => Some(Self::InvalidOffset),
            1002 => Some(Self::InvalidRange),
            1003 => Some(Self::InvalidScore),
            2000 => Some(Self::Store),
            2001 => Some(Self::TransactionFailed),
            3000 => Some(Self::UnknownRankingType),
            3001 => Some(Self::EntityNotFound),
            _ => None,
        }
    }

    /// Whether this error may succeed on a subsequent attempt.
    ///
    /// Only transport-level store errors qualify. A refused commit is surfaced
    /// to the caller as "not done" and is never retried by the engine.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Store)
    }

    /// Suggested recovery action for this error code.
    #[must_use]
    pub const fn suggested_action(self) -> &'static str {
        match self {
            Self::InvalidIdentifier => {
                "Pass a non-empty text identifier or a positive numeric identifier."
            },
            Self::InvalidOffset => "Use an offset or page size within the configured limits.",
            Self::InvalidRange => "Use non-negative bounds with min <= max.",
            Self::InvalidScore => "Use a finite, non-negative score.",
            Self::Store => "Check store connectivity. The caller owns any retry policy.",
            Self::TransactionFailed => {
                "Treat the write as not applied. Re-issue it if the write is still wanted."
            },
            Self::UnknownRankingType => {
                "Fix the caller or configuration: valid ranking types are 1 (Default), 2 (Dense), 3 (StandardCompetition), 4 (ModifiedCompetition)."
            },
            Self::EntityNotFound => "Add the entity to the leaderboard before reading it.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Errors reported by the store collaborator.
///
/// These pass through the engine unwrapped (inside [`LeaderboardError::Store`]);
/// the engine holds no retry opinion for its collaborator.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    /// Connection to the store failed or was lost.
    #[snafu(display("Store connection error: {message}"))]
    Connection {
        /// Error description.
        message: String,
    },

    /// The store rejected a command.
    #[snafu(display("Store command `{command}` failed: {message}"))]
    Command {
        /// Command name.
        command: String,
        /// Error description.
        message: String,
    },

    /// Script digest is not known to the store.
    #[snafu(display("No script registered for digest {digest}"))]
    NoScript {
        /// Hex digest of the script source.
        digest: String,
    },

    /// Operation against a key holding the wrong kind of collection.
    #[snafu(display("Key {key} holds a {actual}, expected a {expected}"))]
    WrongType {
        /// Store key.
        key: String,
        /// Collection kind the command needs.
        expected: &'static str,
        /// Collection kind found at the key.
        actual: &'static str,
    },

    /// Reply could not be decoded into the expected shape.
    #[snafu(display("Unexpected reply from store: {message}"))]
    UnexpectedReply {
        /// Error description.
        message: String,
    },

    /// Failure injected by a test backend.
    #[snafu(display("Injected store failure: {message}"))]
    Injected {
        /// Error description.
        message: String,
    },
}

impl StoreError {
    /// Returns true if the error is transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Injected { .. })
    }
}

/// Top-level error type for leaderboard operations.
///
/// # Recovery Guide
///
/// | Variant              | Retryable | Recovery Action                                  |
/// | -------------------- | --------- | ------------------------------------------------ |
/// | `InvalidIdentifier`  | No        | Fix the identifier                               |
/// | `InvalidOffset`      | No        | Fix the offset or page size                      |
/// | `InvalidRange`       | No        | Fix the score bounds                             |
/// | `InvalidScore`       | No        | Fix the score                                    |
/// | `TransactionFailed`  | No        | Write not applied; re-issue deliberately         |
/// | `UnknownRankingType` | No        | Caller or configuration defect                   |
/// | `EntityNotFound`     | No        | Add the entity first                             |
/// | `Store`              | Maybe     | Transport concern; caller decides                |
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LeaderboardError {
    /// Identifier is empty, too long, or a non-positive number.
    #[snafu(display("Invalid {field}: {reason}"))]
    InvalidIdentifier {
        /// Parameter that failed validation.
        field: &'static str,
        /// Description of the violated constraint.
        reason: String,
    },

    /// Neighbour offset or page size is out of range.
    #[snafu(display("Invalid offset {offset}: {reason}"))]
    InvalidOffset {
        /// Offending value.
        offset: u64,
        /// Description of the violated constraint.
        reason: String,
    },

    /// Score range bounds are invalid.
    #[snafu(display("Invalid score range [{min}, {max}]: {reason}"))]
    InvalidRange {
        /// Lower bound as supplied.
        min: f64,
        /// Upper bound as supplied.
        max: f64,
        /// Description of the violated constraint.
        reason: String,
    },

    /// Score is negative or not finite.
    #[snafu(display("Invalid score {score}: {reason}"))]
    InvalidScore {
        /// Offending score.
        score: f64,
        /// Description of the violated constraint.
        reason: String,
    },

    /// The store refused to commit the transaction; nothing was applied.
    #[snafu(display("Failed to {operation} in leaderboard {leaderboard}: transaction not committed"))]
    TransactionFailed {
        /// Operation that issued the transaction.
        operation: &'static str,
        /// Leaderboard identifier.
        leaderboard: String,
    },

    /// Raw value does not name a ranking type.
    #[snafu(display(
        "Ranking type {value} not found! Valid ranking types are: Default (1), Dense (2), StandardCompetition (3), ModifiedCompetition (4)."
    ))]
    UnknownRankingType {
        /// Offending raw value.
        value: String,
    },

    /// Entity is not a member of the leaderboard.
    #[snafu(display("Entity {key} not found in leaderboard {leaderboard}"))]
    EntityNotFound {
        /// Leaderboard identifier.
        leaderboard: String,
        /// Entity key.
        key: String,
    },

    /// Error reported by the store collaborator.
    #[snafu(display("Store error at {location}: {source}"))]
    Store {
        /// Underlying store error.
        source: StoreError,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

impl LeaderboardError {
    /// Returns the machine-readable error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            Self::InvalidOffset { .. } => ErrorCode::InvalidOffset,
            Self::InvalidRange { .. } => ErrorCode::InvalidRange,
            Self::InvalidScore { .. } => ErrorCode::InvalidScore,
            Self::TransactionFailed { .. } => ErrorCode::TransactionFailed,
            Self::UnknownRankingType { .. } => ErrorCode::UnknownRankingType,
            Self::EntityNotFound { .. } => ErrorCode::EntityNotFound,
            Self::Store { .. } => ErrorCode::Store,
        }
    }

    /// Returns true if the error is transient and the operation may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if the error was raised by input validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier { .. }
                | Self::InvalidOffset { .. }
                | Self::InvalidRange { .. }
                | Self::InvalidScore { .. }
        )
    }
}

impl From<StoreError> for LeaderboardError {
    fn from(source: StoreError) -> Self {
        Self::Store { source, location: Location::default() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_roundtrip() {
        for code in [
            ErrorCode::InvalidIdentifier,
            ErrorCode::InvalidOffset,
            ErrorCode::InvalidRange,
            ErrorCode::InvalidScore,
            ErrorCode::Store,
            ErrorCode::TransactionFailed,
            ErrorCode::UnknownRankingType,
            ErrorCode::EntityNotFound,
        ] {
            assert_eq!(ErrorCode::from_u16(code.as_u16()), Some(code));
        }
        assert_eq!(ErrorCode::from_u16(9999), None);
    }

    #[test]
    fn test_only_transport_errors_are_retryable() {
        let err: LeaderboardError =
            StoreError::Connection { message: "reset by peer".to_owned() }.into();
        assert!(err.is_retryable());
        assert_eq!(err.code(), ErrorCode::Store);

        let err = LeaderboardError::TransactionFailed { operation: "add entities", leaderboard: "lb".into() };
        assert!(!err.is_retryable());
        assert!(!ErrorCode::TransactionFailed.is_retryable());

        let err = LeaderboardError::UnknownRankingType { value: "7".into() };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_command_error_not_retryable() {
        let err: LeaderboardError = StoreError::Command {
            command: "ZADD".to_owned(),
            message: "WRONGTYPE".to_owned(),
        }
        .into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_classification() {
        let err = LeaderboardError::InvalidScore { score: -1.0, reason: "must be >= 0".into() };
        assert!(err.is_validation());
        assert_eq!(err.code(), ErrorCode::InvalidScore);

        let err = LeaderboardError::EntityNotFound { leaderboard: "lb".into(), key: "p1".into() };
        assert!(!err.is_validation());
    }

    #[test]
    fn test_display_carries_parameter_and_reason() {
        let err = LeaderboardError::InvalidRange {
            min: 10.0,
            max: 5.0,
            reason: "min must not exceed max".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[10, 5]"));
        assert!(msg.contains("min must not exceed max"));

        let err = LeaderboardError::UnknownRankingType { value: "9".into() };
        assert!(err.to_string().contains("ModifiedCompetition (4)"));
    }

    #[test]
    fn test_suggested_action_nonempty() {
        assert!(!ErrorCode::TransactionFailed.suggested_action().is_empty());
        assert!(ErrorCode::UnknownRankingType.suggested_action().contains("Dense"));
    }
}
