//! Store collaborator abstraction.
//!
//! The [`Store`] trait is the whole surface the ranking engine consumes from an
//! ordered key-value service:
//!
//! - Sorted sets ordered ascending by score, ties broken by member identity
//! - Hashes mapping fields to opaque bytes
//! - Atomic multi-command transactions returning a commit flag
//! - Read-only script evaluation returning `(member, rank, score)` rows
//!
//! Network clients implement it in the embedding application; this crate ships
//! [`InMemoryStore`] for tests and single-process use.

mod memory;

use async_trait::async_trait;
pub use memory::InMemoryStore;
use rankboard_types::{StoreError, WriteMode};

use crate::{
    command::Transaction,
    script::Script,
    types::{ScoredMember, ScriptArg, ScriptRow},
};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// External ordered key-value store.
///
/// Implementations must be safe for unlimited concurrent use; the engine adds
/// no locking of its own. Missing keys behave as empty collections.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the 0-based ascending position of `member`, or `None` if absent.
    async fn sorted_set_rank(&self, key: &str, member: &str) -> StoreResult<Option<u64>>;

    /// Returns the stored score of `member`, or `None` if absent.
    async fn sorted_set_score(&self, key: &str, member: &str) -> StoreResult<Option<f64>>;

    /// Returns the number of members in a sorted set.
    async fn sorted_set_len(&self, key: &str) -> StoreResult<u64>;

    /// Returns members in positions `[start, stop]` (inclusive, ascending).
    ///
    /// `stop` past the end is clamped; `start` past the end yields nothing.
    async fn sorted_set_range_by_rank(
        &self,
        key: &str,
        start: u64,
        stop: u64,
    ) -> StoreResult<Vec<String>>;

    /// Like [`sorted_set_range_by_rank`](Self::sorted_set_range_by_rank), with scores.
    async fn sorted_set_range_by_rank_with_scores(
        &self,
        key: &str,
        start: u64,
        stop: u64,
    ) -> StoreResult<Vec<ScoredMember>>;

    /// Returns members with `min <= score <= max`, ascending.
    async fn sorted_set_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> StoreResult<Vec<String>>;

    /// Returns the value of one hash field.
    async fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Returns the values of several hash fields, positionally aligned with `fields`.
    async fn hash_get_many(&self, key: &str, fields: &[String])
    -> StoreResult<Vec<Option<Vec<u8>>>>;

    /// Returns the number of fields in a hash.
    async fn hash_len(&self, key: &str) -> StoreResult<u64>;

    /// Applies every command of `transaction` atomically.
    ///
    /// Returns `Ok(false)` when the store refuses to commit; nothing is applied
    /// in that case. With [`WriteMode::FireAndForget`] implementations send the
    /// batch without awaiting the reply and return `Ok(true)` once it is sent;
    /// a batch that cannot be sent still fails with a [`StoreError`].
    async fn execute(&self, transaction: Transaction, mode: WriteMode) -> StoreResult<bool>;

    /// Evaluates a read-only script atomically against one snapshot.
    async fn eval_read_only(
        &self,
        script: &Script,
        keys: &[String],
        args: &[ScriptArg],
    ) -> StoreResult<Vec<ScriptRow>>;
}
