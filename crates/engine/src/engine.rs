//! Ranking engine: write change-sets, ranked window reads, metadata assembly.
//!
//! The engine works on validated input and derived [`LeaderboardKeys`]; the
//! [`Leaderboard`](crate::Leaderboard) facade owns validation.
//!
//! ## Write path
//!
//! Each write builds one [`Transaction`] spanning the collections it touches
//! and commits it in a single `execute` call. A refused commit surfaces as
//! [`LeaderboardError::TransactionFailed`](rankboard_types::LeaderboardError::TransactionFailed) for acknowledged writes.
//! Fire-and-forget writes swallow every failure.
//!
//! ## Read path
//!
//! A [`Window`] over the main index is ranked by one of three strategies:
//!
//! | Ranking type          | Strategy                                  |
//! |-----------------------|-------------------------------------------|
//! | `Default`             | range with scores, rank = position + 1    |
//! | `Dense`               | dense-rank script (main + distinct keys)  |
//! | `StandardCompetition` | competition script, standard mode         |
//! | `ModifiedCompetition` | competition script, modified mode         |
//!
//! Metadata for the ranked rows is then fetched in one batched hash read.

use std::{collections::HashSet, sync::Arc};

use rankboard_store::{ScoredMember, ScriptRow, Store, Transaction};
use rankboard_types::{
    Identifier, RankedEntity, RankingType, Result, StoreError, WriteMode,
    error::{StoreSnafu, TransactionFailedSnafu},
};
use snafu::ResultExt;

use crate::{
    entity::LeaderboardEntity,
    keys::LeaderboardKeys,
    metrics,
    ranking::{self, CompetitionMode},
    score::{self, distinct_member},
    scripts::ranking_scripts,
    window::Window,
};

/// Executes leaderboard reads and writes against a store.
pub struct RankingEngine<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> Clone for RankingEngine<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: Store + ?Sized> std::fmt::Debug for RankingEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine").finish_non_exhaustive()
    }
}

impl<S: Store + ?Sized> RankingEngine<S> {
    /// Creates an engine over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Commits a write transaction.
    ///
    /// # Errors
    ///
    /// For [`WriteMode::Acknowledged`]: `TransactionFailed` if the store
    /// refuses the commit, `Store` on transport failure. Fire-and-forget writes never fail.
    pub async fn commit(
        &self,
        operation: &'static str,
        leaderboard: &Identifier,
        transaction: Transaction,
        mode: WriteMode,
    ) -> Result<()> {
        let commands = transaction.len();
        let outcome = self.store.execute(transaction, mode).await;

        if mode.is_fire_and_forget() {
            if let Err(e) = outcome {
                metrics::record_fire_and_forget_dropped(operation);
                tracing::warn!(%leaderboard, operation, error = %e, "Fire-and-forget write failed");
            }
            return Ok(());
        }

        if !outcome.context(StoreSnafu)? {
            metrics::record_transaction_failure(operation);
            tracing::warn!(%leaderboard, operation, commands, "Store refused to commit transaction");
            return TransactionFailedSnafu { operation, leaderboard: leaderboard.to_string() }.fail();
        }
        tracing::debug!(%leaderboard, operation, commands, "Transaction committed");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the 0-based position of `member` in the main index.
    pub async fn position(&self, keys: &LeaderboardKeys, member: &str) -> Result<Option<u64>> {
        self.store.sorted_set_rank(&keys.main, member).await.context(StoreSnafu)
    }

    /// Returns the caller-visible score of `member`.
    pub async fn score(&self, keys: &LeaderboardKeys, member: &str) -> Result<Option<f64>> {
        let stored = self.store.sorted_set_score(&keys.main, member).await.context(StoreSnafu)?;
        Ok(stored.map(score::restore))
    }

    /// Returns the metadata stored for `member`.
    pub async fn metadata(&self, keys: &LeaderboardKeys, member: &str) -> Result<Option<Vec<u8>>> {
        self.store.hash_get(&keys.metadata, member).await.context(StoreSnafu)
    }

    /// Returns the number of entities in the main index.
    pub async fn size(&self, keys: &LeaderboardKeys) -> Result<u64> {
        self.store.sorted_set_len(&keys.main).await.context(StoreSnafu)
    }

    /// Returns the members whose caller-visible score lies in `[min, max]`,
    /// best first.
    pub async fn members_in_score_range(
        &self,
        keys: &LeaderboardKeys,
        min: f64,
        max: f64,
    ) -> Result<Vec<String>> {
        self.store
            .sorted_set_range_by_score(&keys.main, score::invert(max), score::invert(min))
            .await
            .context(StoreSnafu)
    }

    /// Ranks the members in `window`, in store order. Scores are still stored form.
    pub async fn ranked_window(
        &self,
        keys: &LeaderboardKeys,
        window: Window,
        ranking: RankingType,
    ) -> Result<Vec<ScriptRow>> {
        let rows = match ranking {
            RankingType::Default => {
                let members = self
                    .store
                    .sorted_set_range_by_rank_with_scores(&keys.main, window.start, window.stop())
                    .await
                    .context(StoreSnafu)?;
                ranking::default_ranks(window.start, &members)
            },
            RankingType::Dense => self
                .store
                .eval_read_only(
                    &ranking_scripts().dense,
                    &[keys.main.clone(), keys.distinct.clone()],
                    &[window.start.into(), window.page_size.into()],
                )
                .await
                .context(StoreSnafu)?,
            RankingType::StandardCompetition => {
                self.competition_window(keys, window, CompetitionMode::Standard).await?
            },
            RankingType::ModifiedCompetition => {
                self.competition_window(keys, window, CompetitionMode::Modified).await?
            },
        };
        metrics::record_window_rows(ranking.name(), rows.len());
        Ok(rows)
    }

    async fn competition_window(
        &self,
        keys: &LeaderboardKeys,
        window: Window,
        mode: CompetitionMode,
    ) -> Result<Vec<ScriptRow>> {
        self.store
            .eval_read_only(
                &ranking_scripts().competition,
                std::slice::from_ref(&keys.main),
                &[window.start.into(), window.page_size.into(), mode.code().into()],
            )
            .await
            .context(StoreSnafu)
    }

    /// Attaches metadata to ranked rows with one batched fetch and restores scores.
    pub async fn assemble(
        &self,
        keys: &LeaderboardKeys,
        rows: Vec<ScriptRow>,
    ) -> Result<Vec<RankedEntity>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let fields: Vec<String> = rows.iter().map(|row| row.member.clone()).collect();
        let metadata =
            self.store.hash_get_many(&keys.metadata, &fields).await.context(StoreSnafu)?;
        if metadata.len() != rows.len() {
            let message =
                format!("HMGET returned {} values for {} fields", metadata.len(), rows.len());
            return Err(StoreError::UnexpectedReply { message }).context(StoreSnafu);
        }

        Ok(rows
            .into_iter()
            .zip(metadata)
            .map(|(row, metadata)| RankedEntity {
                key: row.member,
                rank: row.rank,
                score: score::restore(row.score),
                metadata,
            })
            .collect())
    }

    /// Ranks `window` and assembles the result.
    pub async fn read_window(
        &self,
        keys: &LeaderboardKeys,
        window: Window,
        ranking: RankingType,
    ) -> Result<Vec<RankedEntity>> {
        let rows = self.ranked_window(keys, window, ranking).await?;
        self.assemble(keys, rows).await
    }
}

// =============================================================================
// Change-sets
// =============================================================================

/// Builds the transaction adding `entities`.
///
/// Identity-only entities land at score 0. Metadata is written only where
/// supplied. Each distinct score is queued once.
pub fn add_transaction<E: LeaderboardEntity>(keys: &LeaderboardKeys, entities: &[E]) -> Transaction {
    let mut main = Vec::with_capacity(entities.len());
    let mut distinct = Vec::new();
    let mut seen = HashSet::new();
    let mut metadata = Vec::new();

    for entity in entities {
        let member = entity.key().as_member();
        let stored = score::invert(entity.score().unwrap_or(0.0));
        let tier = distinct_member(stored);
        if seen.insert(tier.clone()) {
            distinct.push(ScoredMember::new(tier, stored));
        }
        if let Some(payload) = entity.metadata() {
            metadata.push((member.clone(), payload.to_vec()));
        }
        main.push(ScoredMember::new(member, stored));
    }

    Transaction::new()
        .sorted_set_add(keys.main.clone(), main)
        .sorted_set_add(keys.distinct.clone(), distinct)
        .hash_set(keys.metadata.clone(), metadata)
}

/// Builds the transaction moving `member` to `new_score`.
pub fn update_score_transaction(keys: &LeaderboardKeys, member: String, new_score: f64) -> Transaction {
    let stored = score::invert(new_score);
    Transaction::new()
        .sorted_set_add(keys.main.clone(), vec![ScoredMember::new(member, stored)])
        .sorted_set_add(keys.distinct.clone(), vec![ScoredMember::new(distinct_member(stored), stored)])
}

/// Builds the transaction removing `member`.
///
/// Touches two of the three collections: the main index and the metadata map.
/// The distinct-score index holds score tiers, not entity keys, so there is
/// nothing of `member` to remove from it, and the tier the member held stays
/// counted by dense ranks until the leaderboard is deleted.
pub fn delete_entity_transaction(keys: &LeaderboardKeys, member: String) -> Transaction {
    Transaction::new()
        .sorted_set_remove(keys.main.clone(), vec![member.clone()])
        .hash_delete(keys.metadata.clone(), vec![member])
}

/// Builds the transaction deleting every collection of a leaderboard.
pub fn delete_leaderboard_transaction(keys: &LeaderboardKeys) -> Transaction {
    Transaction::new().delete_keys(keys.all())
}
