//! The entity contract consumed by write operations.

use rankboard_types::{Identifier, RankedEntity};

/// A caller entity that can be written to a leaderboard.
///
/// The engine reads three things from it: the identity key, an optional
/// score (absent means "insert at 0"), and an optional opaque payload. The
/// payload is stored as-is and never interpreted.
pub trait LeaderboardEntity {
    /// Identity key within the leaderboard.
    fn key(&self) -> Identifier;

    /// Caller-visible score, if any.
    fn score(&self) -> Option<f64> {
        None
    }

    /// Opaque payload, if any. `Some(&[])` is stored; `None` writes nothing.
    fn metadata(&self) -> Option<&[u8]> {
        None
    }
}

/// A plain leaderboard entry.
///
/// ```
/// use rankboard_engine::Entry;
///
/// let entry = Entry::new("player-1").with_score(120.0).with_metadata(b"{\"name\":\"Ada\"}".to_vec());
/// assert_eq!(entry.score, Some(120.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Identity key.
    pub key: Identifier,
    /// Score; `None` inserts at 0.
    pub score: Option<f64>,
    /// Opaque payload.
    pub metadata: Option<Vec<u8>>,
}

impl Entry {
    /// Creates an entry with no score and no metadata.
    pub fn new(key: impl Into<Identifier>) -> Self {
        Self { key: key.into(), score: None, metadata: None }
    }

    /// Sets the score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Sets the metadata payload.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<Vec<u8>>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}

impl LeaderboardEntity for Entry {
    fn key(&self) -> Identifier {
        self.key.clone()
    }

    fn score(&self) -> Option<f64> {
        self.score
    }

    fn metadata(&self) -> Option<&[u8]> {
        self.metadata.as_deref()
    }
}

impl<K: Into<Identifier> + Clone> LeaderboardEntity for (K, f64) {
    fn key(&self) -> Identifier {
        self.0.clone().into()
    }

    fn score(&self) -> Option<f64> {
        Some(self.1)
    }
}

/// A ranked read result can be written back, e.g. to copy a leaderboard.
impl LeaderboardEntity for RankedEntity {
    fn key(&self) -> Identifier {
        Identifier::Text(self.key.clone())
    }

    fn score(&self) -> Option<f64> {
        Some(self.score)
    }

    fn metadata(&self) -> Option<&[u8]> {
        self.metadata.as_deref()
    }
}
