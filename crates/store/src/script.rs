//! Server-side script handles.
//!
//! A [`Script`] is compiled once: its source is hashed at construction and the
//! digest is what stores cache and evaluate by. Handles are immutable and
//! cheap to share across threads.
//!
//! Backends that cannot interpret script source (the in-memory backend)
//! execute a registered [`ScriptBody`] instead, looked up by the same digest.
//! A body sees a read-only [`StoreView`] of one consistent snapshot.

use std::fmt;

use rankboard_types::StoreError;
use sha2::{Digest, Sha256};

use crate::types::{ScoreBound, ScoredMember, ScriptArg, ScriptRow};

/// An immutable, pre-hashed script.
#[derive(Clone, PartialEq, Eq)]
pub struct Script {
    name: &'static str,
    source: &'static str,
    digest: String,
}

impl Script {
    /// Compiles a script handle from its source.
    #[must_use]
    pub fn new(name: &'static str, source: &'static str) -> Self {
        let digest = hex::encode(Sha256::digest(source.as_bytes()));
        Self { name, source, digest }
    }

    /// Returns the script's short name (for logs).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the script source.
    #[must_use]
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Returns the hex SHA-256 digest of the source.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script").field("name", &self.name).field("digest", &self.digest).finish()
    }
}

/// Read-only access to sorted sets during script evaluation.
///
/// Every call observes the same snapshot.
pub trait StoreView {
    /// Members in `[start, stop]` (0-based, inclusive, ascending) with scores.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WrongType`] if `key` does not hold a sorted set.
    fn range_by_rank_with_scores(
        &self,
        key: &str,
        start: u64,
        stop: u64,
    ) -> Result<Vec<ScoredMember>, StoreError>;

    /// Number of members whose score lies within `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WrongType`] if `key` does not hold a sorted set.
    fn count_by_score(&self, key: &str, min: ScoreBound, max: ScoreBound)
    -> Result<u64, StoreError>;
}

/// Native implementation of a script, for backends without a script interpreter.
pub trait ScriptBody: Send + Sync {
    /// Evaluates the script against a snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the arguments are malformed or a key holds
    /// the wrong type.
    fn eval(
        &self,
        view: &dyn StoreView,
        keys: &[String],
        args: &[ScriptArg],
    ) -> Result<Vec<ScriptRow>, StoreError>;
}
