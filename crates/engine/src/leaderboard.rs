//! Public leaderboard operations.
//!
//! [`Leaderboard`] binds validation, the key scheme and the [`RankingEngine`]
//! behind the public operation set. Every operation validates its arguments
//! before the first store call, so invalid input never reaches the store.
//!
//! Lookups of something that is not there return `None` or an empty vector;
//! only [`Leaderboard::get_entity`] treats absence as an error.

use std::sync::Arc;

use rankboard_store::{InMemoryStore, Store};
use rankboard_types::{
    Identifier, LeaderboardConfig, RankedEntity, RankingType, Result, WriteMode,
    error::EntityNotFoundSnafu,
    validation::{
        validate_identifier, validate_offset, validate_page_size, validate_score,
        validate_score_range,
    },
};
use snafu::OptionExt;
use tracing::instrument;

use crate::{
    engine::{
        RankingEngine, add_transaction, delete_entity_transaction,
        delete_leaderboard_transaction, update_score_transaction,
    },
    entity::LeaderboardEntity,
    keys::LeaderboardKeys,
    metrics::{self, OperationTimer},
    scripts,
    window::Window,
};

const LEADERBOARD_FIELD: &str = "leaderboard_id";
const ENTITY_FIELD: &str = "entity_key";

/// Multi-semantics leaderboard over an ordered key-value store.
///
/// Holds no mutable state: any number of operations may run concurrently
/// from any number of tasks, and all consistency is the store's.
///
/// # Example
///
/// ```no_run
/// use rankboard_engine::{Entry, Leaderboard};
/// use rankboard_types::{Identifier, LeaderboardConfig, RankingType, WriteMode};
///
/// # async fn demo() -> rankboard_types::Result<()> {
/// let board = Leaderboard::in_memory(LeaderboardConfig::default());
/// let season = Identifier::from("season-1");
///
/// board
///     .add(&season, &[Entry::new("ada").with_score(250.0), Entry::new("bob").with_score(200.0)], WriteMode::Acknowledged)
///     .await?;
///
/// let rank = board.get_entity_rank(&season, &"bob".into(), Some(RankingType::Dense)).await?;
/// assert_eq!(rank, Some(2));
/// # Ok(())
/// # }
/// ```
pub struct Leaderboard<S: Store + ?Sized> {
    engine: RankingEngine<S>,
    config: LeaderboardConfig,
}

impl<S: Store + ?Sized> Clone for Leaderboard<S> {
    fn clone(&self) -> Self {
        Self { engine: self.engine.clone(), config: self.config.clone() }
    }
}

impl<S: Store + ?Sized> std::fmt::Debug for Leaderboard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leaderboard").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Leaderboard<InMemoryStore> {
    /// Creates a leaderboard over a fresh in-memory store with the ranking
    /// scripts installed.
    pub fn in_memory(config: LeaderboardConfig) -> Self {
        let store = InMemoryStore::new();
        scripts::register_native(&store);
        Self::new(Arc::new(store), config)
    }
}

impl<S: Store + ?Sized> Leaderboard<S> {
    /// Creates a leaderboard over `store`.
    ///
    /// The store must be able to evaluate the scripts in
    /// [`ranking_scripts`](crate::ranking_scripts).
    pub fn new(store: Arc<S>, config: LeaderboardConfig) -> Self {
        Self { engine: RankingEngine::new(store), config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        self.engine.store()
    }

    fn keys(&self, leaderboard: &Identifier) -> Result<LeaderboardKeys> {
        validate_identifier(leaderboard, LEADERBOARD_FIELD, &self.config)?;
        Ok(LeaderboardKeys::new(leaderboard))
    }

    fn member(&self, key: &Identifier) -> Result<String> {
        validate_identifier(key, ENTITY_FIELD, &self.config)?;
        Ok(key.as_member())
    }

    fn ranking(&self, ranking: Option<RankingType>) -> RankingType {
        ranking.unwrap_or(self.config.default_ranking_type)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Adds entities, or overwrites the score and metadata of existing ones.
    ///
    /// An entity without a score is inserted at 0. Metadata is written only
    /// where supplied. The whole batch lands in one transaction; an empty
    /// batch is a no-op.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` / `InvalidScore` for bad input, before any store call.
    /// - `TransactionFailed` if the store refuses the commit (acknowledged mode).
    /// - `Store` on transport failure (acknowledged mode).
    #[instrument(skip_all, fields(leaderboard = %leaderboard, count = entities.len(), mode = ?mode))]
    pub async fn add<E: LeaderboardEntity>(
        &self,
        leaderboard: &Identifier,
        entities: &[E],
        mode: WriteMode,
    ) -> Result<()> {
        let keys = self.keys(leaderboard)?;
        for entity in entities {
            self.member(&entity.key())?;
            if let Some(score) = entity.score() {
                validate_score(score)?;
            }
        }
        if entities.is_empty() {
            return Ok(());
        }

        let timer = OperationTimer::start();
        let result =
            self.engine.commit("add", leaderboard, add_transaction(&keys, entities), mode).await;
        metrics::record_write("add", result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Moves an entity to `new_score`, inserting it if absent.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` / `InvalidScore` for bad input, before any store call.
    /// - `TransactionFailed` if the store refuses the commit (acknowledged mode).
    /// - `Store` on transport failure (acknowledged mode).
    #[instrument(skip_all, fields(leaderboard = %leaderboard, key = %key, new_score, mode = ?mode))]
    pub async fn update_score(
        &self,
        leaderboard: &Identifier,
        key: &Identifier,
        new_score: f64,
        mode: WriteMode,
    ) -> Result<()> {
        let keys = self.keys(leaderboard)?;
        let member = self.member(key)?;
        validate_score(new_score)?;

        let timer = OperationTimer::start();
        let result = self
            .engine
            .commit("update_score", leaderboard, update_score_transaction(&keys, member, new_score), mode)
            .await;
        metrics::record_write("update_score", result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Removes an entity and its metadata. Removing a non-member is a no-op.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` for bad input, before any store call.
    /// - `TransactionFailed` if the store refuses the commit.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard, key = %key))]
    pub async fn delete_entity(&self, leaderboard: &Identifier, key: &Identifier) -> Result<()> {
        let keys = self.keys(leaderboard)?;
        let member = self.member(key)?;

        let timer = OperationTimer::start();
        let result = self
            .engine
            .commit(
                "delete_entity",
                leaderboard,
                delete_entity_transaction(&keys, member),
                WriteMode::Acknowledged,
            )
            .await;
        metrics::record_write("delete_entity", result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Deletes the whole leaderboard. Deleting an absent leaderboard is a no-op.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` for bad input, before any store call.
    /// - `TransactionFailed` if the store refuses the commit.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard))]
    pub async fn delete(&self, leaderboard: &Identifier) -> Result<()> {
        let keys = self.keys(leaderboard)?;

        let timer = OperationTimer::start();
        let result = self
            .engine
            .commit("delete", leaderboard, delete_leaderboard_transaction(&keys), WriteMode::Acknowledged)
            .await;
        metrics::record_write("delete", result.is_ok(), timer.elapsed_secs());
        result
    }

    // =========================================================================
    // Windowed reads
    // =========================================================================

    /// Returns an entity with up to `offset` neighbours on each side, best first.
    ///
    /// `offset` defaults to `default_offset`, `ranking` to
    /// `default_ranking_type`. An absent entity yields an empty vector.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` / `InvalidOffset` for bad input, before any store call.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard, key = %key, offset = tracing::field::Empty, ranking = tracing::field::Empty))]
    pub async fn get_entity_and_neighbours(
        &self,
        leaderboard: &Identifier,
        key: &Identifier,
        offset: Option<u32>,
        ranking: Option<RankingType>,
    ) -> Result<Vec<RankedEntity>> {
        let keys = self.keys(leaderboard)?;
        let member = self.member(key)?;
        let offset = offset.unwrap_or(self.config.default_offset);
        validate_offset(offset, &self.config)?;
        let ranking = self.ranking(ranking);
        tracing::Span::current().record("offset", offset).record("ranking", ranking.name());

        let timer = OperationTimer::start();
        let result: Result<Vec<RankedEntity>> = async {
            let Some(position) = self.engine.position(&keys, &member).await? else {
                return Ok(Vec::new());
            };
            let window = Window::around(position, offset);
            tracing::debug!(position, start = window.start, page_size = window.page_size, "Resolved window");
            self.engine.read_window(&keys, window, ranking).await
        }
        .await;
        metrics::record_read("get_entity_and_neighbours", ranking.name(), result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Returns every entity whose score lies in `[min_score, max_score]`, best first.
    ///
    /// `max_score` may be `f64::INFINITY`.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` / `InvalidRange` for bad input, before any store call.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard, min_score, max_score, ranking = tracing::field::Empty))]
    pub async fn get_entities_by_score_range(
        &self,
        leaderboard: &Identifier,
        min_score: f64,
        max_score: f64,
        ranking: Option<RankingType>,
    ) -> Result<Vec<RankedEntity>> {
        let keys = self.keys(leaderboard)?;
        validate_score_range(min_score, max_score)?;
        let ranking = self.ranking(ranking);
        tracing::Span::current().record("ranking", ranking.name());

        let timer = OperationTimer::start();
        let result: Result<Vec<RankedEntity>> = async {
            let members = self.engine.members_in_score_range(&keys, min_score, max_score).await?;
            let Some(best) = members.first() else {
                return Ok(Vec::new());
            };
            // The best member may have moved or left since the range query.
            let Some(start) = self.engine.position(&keys, best).await? else {
                return Ok(Vec::new());
            };
            let window = Window::span(start, members.len() as u64);
            tracing::debug!(start, count = members.len(), "Resolved score range");
            self.engine.read_window(&keys, window, ranking).await
        }
        .await;
        metrics::record_read("get_entities_by_score_range", ranking.name(), result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Returns page `page_index` (0-based) of `page_size` entities, best first.
    ///
    /// A page past the end is empty.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` / `InvalidOffset` (page size out of range) for bad
    ///   input, before any store call.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard, page_index, page_size, ranking = tracing::field::Empty))]
    pub async fn get_page(
        &self,
        leaderboard: &Identifier,
        page_index: u64,
        page_size: u32,
        ranking: Option<RankingType>,
    ) -> Result<Vec<RankedEntity>> {
        let keys = self.keys(leaderboard)?;
        validate_page_size(page_size, &self.config)?;
        let ranking = self.ranking(ranking);
        tracing::Span::current().record("ranking", ranking.name());

        let timer = OperationTimer::start();
        let result = self.engine.read_window(&keys, Window::page(page_index, page_size), ranking).await;
        metrics::record_read("get_page", ranking.name(), result.is_ok(), timer.elapsed_secs());
        result
    }

    // =========================================================================
    // Single-entity reads
    // =========================================================================

    /// Returns an entity's rank, or `None` if it is not on the leaderboard.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` for bad input, before any store call.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard, key = %key, ranking = tracing::field::Empty))]
    pub async fn get_entity_rank(
        &self,
        leaderboard: &Identifier,
        key: &Identifier,
        ranking: Option<RankingType>,
    ) -> Result<Option<u64>> {
        let keys = self.keys(leaderboard)?;
        let member = self.member(key)?;
        let ranking = self.ranking(ranking);
        tracing::Span::current().record("ranking", ranking.name());

        let timer = OperationTimer::start();
        let result: Result<Option<u64>> = async {
            let Some(position) = self.engine.position(&keys, &member).await? else {
                return Ok(None);
            };
            if ranking == RankingType::Default {
                return Ok(Some(position + 1));
            }
            let rows = self.engine.ranked_window(&keys, Window::at(position), ranking).await?;
            Ok(rows.into_iter().find(|row| row.member == member).map(|row| row.rank))
        }
        .await;
        metrics::record_read("get_entity_rank", ranking.name(), result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Returns an entity with its rank, score and metadata.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` for bad input, before any store call.
    /// - `EntityNotFound` if the entity is not on the leaderboard.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard, key = %key, ranking = tracing::field::Empty))]
    pub async fn get_entity(
        &self,
        leaderboard: &Identifier,
        key: &Identifier,
        ranking: Option<RankingType>,
    ) -> Result<RankedEntity> {
        let keys = self.keys(leaderboard)?;
        let member = self.member(key)?;
        let ranking = self.ranking(ranking);
        tracing::Span::current().record("ranking", ranking.name());

        let timer = OperationTimer::start();
        let result: Result<RankedEntity> = async {
            let found = match self.engine.position(&keys, &member).await? {
                Some(position) => self
                    .engine
                    .ranked_window(&keys, Window::at(position), ranking)
                    .await?
                    .into_iter()
                    .find(|row| row.member == member),
                None => None,
            };
            let row = found.context(EntityNotFoundSnafu {
                leaderboard: leaderboard.to_string(),
                key: member.clone(),
            })?;
            let mut assembled = self.engine.assemble(&keys, vec![row]).await?;
            assembled.pop().context(EntityNotFoundSnafu {
                leaderboard: leaderboard.to_string(),
                key: member.clone(),
            })
        }
        .await;
        metrics::record_read("get_entity", ranking.name(), result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Returns an entity's score, or `None` if it is not on the leaderboard.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` for bad input, before any store call.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard, key = %key))]
    pub async fn get_entity_score(
        &self,
        leaderboard: &Identifier,
        key: &Identifier,
    ) -> Result<Option<f64>> {
        let keys = self.keys(leaderboard)?;
        let member = self.member(key)?;

        let timer = OperationTimer::start();
        let result = self.engine.score(&keys, &member).await;
        metrics::record_read("get_entity_score", "none", result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Returns an entity's metadata, or `None` if none was ever supplied.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` for bad input, before any store call.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard, key = %key))]
    pub async fn get_entity_metadata(
        &self,
        leaderboard: &Identifier,
        key: &Identifier,
    ) -> Result<Option<Vec<u8>>> {
        let keys = self.keys(leaderboard)?;
        let member = self.member(key)?;

        let timer = OperationTimer::start();
        let result = self.engine.metadata(&keys, &member).await;
        metrics::record_read("get_entity_metadata", "none", result.is_ok(), timer.elapsed_secs());
        result
    }

    /// Returns the number of entities on the leaderboard.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` for bad input, before any store call.
    /// - `Store` on transport failure.
    #[instrument(skip_all, fields(leaderboard = %leaderboard))]
    pub async fn get_size(&self, leaderboard: &Identifier) -> Result<u64> {
        let keys = self.keys(leaderboard)?;

        let timer = OperationTimer::start();
        let result = self.engine.size(&keys).await;
        metrics::record_read("get_size", "none", result.is_ok(), timer.elapsed_secs());
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use rankboard_types::{ErrorCode, LeaderboardError};

    use super::*;
    use crate::entity::Entry;

    fn board() -> Leaderboard<InMemoryStore> {
        Leaderboard::in_memory(LeaderboardConfig::default())
    }

    fn lb() -> Identifier {
        Identifier::from("lb")
    }

    #[tokio::test]
    async fn test_invalid_leaderboard_rejected_before_store() {
        let board = board();
        let err = board.get_size(&Identifier::from("  ")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidIdentifier);
        let err = board.get_size(&Identifier::Number(0)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidIdentifier);
        assert_eq!(board.store().command_count(), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_score_in_batch() {
        let board = board();
        let entities = vec![Entry::new("a").with_score(1.0), Entry::new("b").with_score(-1.0)];
        let err = board.add(&lb(), &entities, WriteMode::Acknowledged).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidScore { .. }));
        assert_eq!(board.store().transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_add_is_noop() {
        let board = board();
        board.add::<Entry>(&lb(), &[], WriteMode::Acknowledged).await.unwrap();
        assert_eq!(board.store().command_count(), 0);
    }

    #[tokio::test]
    async fn test_offset_over_maximum_rejected() {
        let config = LeaderboardConfig::builder().max_offset(5).default_offset(5).build().unwrap();
        let board = Leaderboard::in_memory(config);
        let err = board
            .get_entity_and_neighbours(&lb(), &"a".into(), Some(6), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidOffset { offset: 6, .. }));
        assert_eq!(board.store().command_count(), 0);
    }

    #[tokio::test]
    async fn test_default_ranking_type_from_config() {
        let config = LeaderboardConfig::builder()
            .default_ranking_type(RankingType::Dense)
            .build()
            .unwrap();
        let board = Leaderboard::in_memory(config);
        board
            .add(&lb(), &[("a", 10.0), ("b", 10.0), ("c", 5.0)], WriteMode::Acknowledged)
            .await
            .unwrap();
        assert_eq!(board.get_entity_rank(&lb(), &"c".into(), None).await.unwrap(), Some(2));
        assert_eq!(
            board.get_entity_rank(&lb(), &"c".into(), Some(RankingType::Default)).await.unwrap(),
            Some(3)
        );
    }

    #[tokio::test]
    async fn test_get_entity_not_found() {
        let board = board();
        let err = board.get_entity(&lb(), &"ghost".into(), None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EntityNotFound);
    }

    #[tokio::test]
    async fn test_get_entity_assembles_all_fields() {
        let board = board();
        board
            .add(
                &lb(),
                &[Entry::new("a").with_score(3.0).with_metadata(b"x".to_vec()), Entry::new("b").with_score(9.0)],
                WriteMode::Acknowledged,
            )
            .await
            .unwrap();
        let entity = board
            .get_entity(&lb(), &"a".into(), Some(RankingType::StandardCompetition))
            .await
            .unwrap();
        assert_eq!(entity, RankedEntity { key: "a".into(), rank: 2, score: 3.0, metadata: Some(b"x".to_vec()) });
    }
}
