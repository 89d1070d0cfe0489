//! Configuration types for Rankboard.
//!
//! Configuration can be deserialized (TOML, JSON, environment layers owned by
//! the embedding application) or built in code through a fallible builder.
//! Post-deserialization validation is available via
//! [`validate`](LeaderboardConfig::validate).

use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::types::RankingType;

/// Configuration validation error.
///
/// Returned when a configuration value is outside its valid range or
/// violates a cross-field constraint.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// A configuration value is invalid.
    #[snafu(display("invalid config: {message}"))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },
}

fn default_offset() -> u32 {
    10
}

fn default_max_offset() -> u32 {
    1000
}

fn default_max_page_size() -> u32 {
    1000
}

fn default_max_identifier_bytes() -> usize {
    512
}

/// Leaderboard behaviour and input limits.
///
/// # Validation Rules
///
/// - `default_offset` must be <= `max_offset`
/// - `max_page_size` must be >= 1
/// - `max_identifier_bytes` must be >= 1
///
/// # Example
///
/// ```no_run
/// # use rankboard_types::config::LeaderboardConfig;
/// # use rankboard_types::RankingType;
/// let config = LeaderboardConfig::builder()
///     .default_offset(5)
///     .default_ranking_type(RankingType::Dense)
///     .build()
///     .expect("valid config");
/// assert_eq!(config.default_offset, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Neighbours returned on each side when the caller does not specify an offset.
    ///
    /// Default: 10.
    #[serde(default = "default_offset")]
    pub default_offset: u32,
    /// Largest accepted neighbour offset.
    ///
    /// Default: 1000.
    #[serde(default = "default_max_offset")]
    pub max_offset: u32,
    /// Largest accepted page for paginated views.
    ///
    /// Default: 1000. Must be >= 1.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Ranking semantics used when the caller does not specify one.
    #[serde(default)]
    pub default_ranking_type: RankingType,
    /// Maximum text identifier length in bytes.
    ///
    /// Default: 512. Must be >= 1.
    #[serde(default = "default_max_identifier_bytes")]
    pub max_identifier_bytes: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_offset: default_offset(),
            max_offset: default_max_offset(),
            max_page_size: default_max_page_size(),
            default_ranking_type: RankingType::default(),
            max_identifier_bytes: default_max_identifier_bytes(),
        }
    }
}

#[bon::bon]
impl LeaderboardConfig {
    /// Creates a new leaderboard configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any rule listed on
    /// [`LeaderboardConfig`] is violated.
    #[builder]
    pub fn new(
        #[builder(default = default_offset())] default_offset: u32,
        #[builder(default = default_max_offset())] max_offset: u32,
        #[builder(default = default_max_page_size())] max_page_size: u32,
        #[builder(default)] default_ranking_type: RankingType,
        #[builder(default = default_max_identifier_bytes())] max_identifier_bytes: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            default_offset,
            max_offset,
            max_page_size,
            default_ranking_type,
            max_identifier_bytes,
        };
        config.validate()?;
        Ok(config)
    }
}

impl LeaderboardConfig {
    /// Validates the configuration values.
    ///
    /// Call after deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a limit is zero or the default
    /// offset exceeds the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_offset > self.max_offset {
            return Err(ConfigError::Validation {
                message: format!(
                    "default_offset ({}) must be <= max_offset ({})",
                    self.default_offset, self.max_offset
                ),
            });
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::Validation {
                message: "max_page_size must be >= 1".to_string(),
            });
        }
        if self.max_identifier_bytes == 0 {
            return Err(ConfigError::Validation {
                message: "max_identifier_bytes must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}
