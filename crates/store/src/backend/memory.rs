//! In-memory store backend for testing and single-process use.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::RwLock;
use rankboard_types::{StoreError, WriteMode};

use super::{Store, StoreResult};
use crate::{
    command::{Command, Transaction},
    script::{Script, ScriptBody, StoreView},
    sorted_set::SortedSet,
    types::{ScoreBound, ScoredMember, ScriptArg, ScriptRow},
};

/// A value held at a store key.
#[derive(Debug, Clone)]
enum Value {
    SortedSet(SortedSet),
    Hash(HashMap<String, Vec<u8>>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Self::SortedSet(_) => "sorted set",
            Self::Hash(_) => "hash",
        }
    }
}

type Keyspace = HashMap<String, Value>;

/// In-memory store backend.
///
/// All data lives in one keyspace behind a single `RwLock`: a transaction is
/// applied under one write-lock acquisition and a script under one read-lock
/// acquisition, so readers never observe a partially applied batch.
///
/// Scripts execute through native [`ScriptBody`] implementations registered by
/// digest with [`register_script`](Self::register_script); evaluating an
/// unregistered script fails with [`StoreError::NoScript`].
///
/// For tests the backend can refuse commits or fail commands on demand, and
/// counts every command it receives.
#[derive(Default)]
pub struct InMemoryStore {
    keyspace: RwLock<Keyspace>,
    scripts: RwLock<HashMap<String, Arc<dyn ScriptBody>>>,
    /// Commits to refuse (return `false`) before accepting again.
    refuse_commits: AtomicUsize,
    /// Commands to fail with an injected error.
    fail_commands: AtomicUsize,
    /// Total commands received, including failed ones.
    command_count: AtomicUsize,
    /// Total transactions received.
    transaction_count: AtomicUsize,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the native body executed for `script`.
    pub fn register_script(&self, script: &Script, body: Arc<dyn ScriptBody>) {
        self.scripts.write().insert(script.digest().to_owned(), body);
    }

    /// Refuses the next `n` transaction commits.
    pub fn refuse_next_commits(&self, n: usize) {
        self.refuse_commits.store(n, Ordering::SeqCst);
    }

    /// Fails the next `n` commands with [`StoreError::Injected`].
    pub fn fail_next_commands(&self, n: usize) {
        self.fail_commands.store(n, Ordering::SeqCst);
    }

    /// Returns the number of commands received so far.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.command_count.load(Ordering::SeqCst)
    }

    /// Returns the number of transactions received so far.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.transaction_count.load(Ordering::SeqCst)
    }

    /// Returns true if `key` holds a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.keyspace.read().contains_key(key)
    }

    /// Returns the number of keys holding a value.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keyspace.read().len()
    }

    /// Clears all data.
    pub fn clear(&self) {
        self.keyspace.write().clear();
    }

    /// Counts the command and consumes one injected failure, if any.
    fn begin(&self, command: &'static str) -> StoreResult<()> {
        self.command_count.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .fail_commands
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Injected { message: format!("{command} failed") });
        }
        Ok(())
    }

    fn take_refusal(&self) -> bool {
        self.refuse_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn read_sorted_set<T>(
        &self,
        key: &str,
        f: impl FnOnce(Option<&SortedSet>) -> T,
    ) -> StoreResult<T> {
        let keyspace = self.keyspace.read();
        Ok(f(sorted_set_at(&keyspace, key)?))
    }

    fn read_hash<T>(
        &self,
        key: &str,
        f: impl FnOnce(Option<&HashMap<String, Vec<u8>>>) -> T,
    ) -> StoreResult<T> {
        let keyspace = self.keyspace.read();
        match keyspace.get(key) {
            None => Ok(f(None)),
            Some(Value::Hash(hash)) => Ok(f(Some(hash))),
            Some(other) => {
                Err(StoreError::WrongType { key: key.to_owned(), expected: "hash", actual: other.kind() })
            },
        }
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("keys", &self.key_count())
            .field("scripts", &self.scripts.read().len())
            .field("command_count", &self.command_count())
            .finish()
    }
}

fn sorted_set_at<'a>(keyspace: &'a Keyspace, key: &str) -> StoreResult<Option<&'a SortedSet>> {
    match keyspace.get(key) {
        None => Ok(None),
        Some(Value::SortedSet(set)) => Ok(Some(set)),
        Some(other) => Err(StoreError::WrongType {
            key: key.to_owned(),
            expected: "sorted set",
            actual: other.kind(),
        }),
    }
}

/// Checks that every command targets a key of the right kind.
fn check_types(keyspace: &Keyspace, commands: &[Command]) -> StoreResult<()> {
    for command in commands {
        let (key, expected) = match command {
            Command::SortedSetAdd { key, .. } | Command::SortedSetRemove { key, .. } => {
                (key, "sorted set")
            },
            Command::HashSet { key, .. } | Command::HashDelete { key, .. } => (key, "hash"),
            Command::DeleteKeys { .. } => continue,
        };
        match keyspace.get(key) {
            Some(value) if value.kind() != expected => {
                return Err(StoreError::WrongType {
                    key: key.clone(),
                    expected,
                    actual: value.kind(),
                });
            },
            _ => {},
        }
    }
    Ok(())
}

fn apply(keyspace: &mut Keyspace, command: Command) {
    match command {
        Command::SortedSetAdd { key, entries } => {
            let value = keyspace.entry(key).or_insert_with(|| Value::SortedSet(SortedSet::new()));
            if let Value::SortedSet(set) = value {
                for entry in entries {
                    set.add(&entry.member, entry.score);
                }
            }
        },
        Command::SortedSetRemove { key, members } => {
            if let Some(Value::SortedSet(set)) = keyspace.get_mut(&key) {
                for member in &members {
                    set.remove(member);
                }
                if set.is_empty() {
                    keyspace.remove(&key);
                }
            }
        },
        Command::HashSet { key, entries } => {
            let value = keyspace.entry(key).or_insert_with(|| Value::Hash(HashMap::new()));
            if let Value::Hash(hash) = value {
                hash.extend(entries);
            }
        },
        Command::HashDelete { key, fields } => {
            if let Some(Value::Hash(hash)) = keyspace.get_mut(&key) {
                for field in &fields {
                    hash.remove(field);
                }
                if hash.is_empty() {
                    keyspace.remove(&key);
                }
            }
        },
        Command::DeleteKeys { keys } => {
            for key in &keys {
                keyspace.remove(key);
            }
        },
    }
}

/// Read-only view handed to script bodies.
struct Snapshot<'a> {
    keyspace: &'a Keyspace,
}

impl StoreView for Snapshot<'_> {
    fn range_by_rank_with_scores(
        &self,
        key: &str,
        start: u64,
        stop: u64,
    ) -> Result<Vec<ScoredMember>, StoreError> {
        Ok(sorted_set_at(self.keyspace, key)?
            .map(|set| set.range_by_rank(start, stop))
            .unwrap_or_default())
    }

    fn count_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, StoreError> {
        Ok(sorted_set_at(self.keyspace, key)?
            .map_or(0, |set| set.count_by_score(min, max) as u64))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn sorted_set_rank(&self, key: &str, member: &str) -> StoreResult<Option<u64>> {
        self.begin("ZRANK")?;
        self.read_sorted_set(key, |set| set.and_then(|s| s.rank(member)).map(|r| r as u64))
    }

    async fn sorted_set_score(&self, key: &str, member: &str) -> StoreResult<Option<f64>> {
        self.begin("ZSCORE")?;
        self.read_sorted_set(key, |set| set.and_then(|s| s.score(member)))
    }

    async fn sorted_set_len(&self, key: &str) -> StoreResult<u64> {
        self.begin("ZCARD")?;
        self.read_sorted_set(key, |set| set.map_or(0, |s| s.len() as u64))
    }

    async fn sorted_set_range_by_rank(
        &self,
        key: &str,
        start: u64,
        stop: u64,
    ) -> StoreResult<Vec<String>> {
        self.begin("ZRANGE")?;
        self.read_sorted_set(key, |set| {
            set.map(|s| s.range_by_rank(start, stop).into_iter().map(|e| e.member).collect())
                .unwrap_or_default()
        })
    }

    async fn sorted_set_range_by_rank_with_scores(
        &self,
        key: &str,
        start: u64,
        stop: u64,
    ) -> StoreResult<Vec<ScoredMember>> {
        self.begin("ZRANGE")?;
        self.read_sorted_set(key, |set| set.map(|s| s.range_by_rank(start, stop)).unwrap_or_default())
    }

    async fn sorted_set_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> StoreResult<Vec<String>> {
        self.begin("ZRANGEBYSCORE")?;
        self.read_sorted_set(key, |set| {
            set.map(|s| {
                s.range_by_score(ScoreBound::Inclusive(min), ScoreBound::Inclusive(max))
                    .into_iter()
                    .map(|e| e.member)
                    .collect()
            })
            .unwrap_or_default()
        })
    }

    async fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>> {
        self.begin("HGET")?;
        self.read_hash(key, |hash| hash.and_then(|h| h.get(field).cloned()))
    }

    async fn hash_get_many(
        &self,
        key: &str,
        fields: &[String],
    ) -> StoreResult<Vec<Option<Vec<u8>>>> {
        self.begin("HMGET")?;
        self.read_hash(key, |hash| {
            fields.iter().map(|field| hash.and_then(|h| h.get(field).cloned())).collect()
        })
    }

    async fn hash_len(&self, key: &str) -> StoreResult<u64> {
        self.begin("HLEN")?;
        self.read_hash(key, |hash| hash.map_or(0, |h| h.len() as u64))
    }

    async fn execute(&self, transaction: Transaction, mode: WriteMode) -> StoreResult<bool> {
        self.transaction_count.fetch_add(1, Ordering::SeqCst);
        // Sending can fail in either mode; only the reply goes unread.
        self.begin("EXEC")?;

        let mut keyspace = self.keyspace.write();
        if self.take_refusal() {
            tracing::debug!(commands = transaction.len(), "In-memory store refused commit");
            return Ok(mode.is_fire_and_forget());
        }
        if let Err(e) = check_types(&keyspace, transaction.commands()) {
            return if mode.is_fire_and_forget() { Ok(true) } else { Err(e) };
        }
        for command in transaction.into_commands() {
            apply(&mut keyspace, command);
        }
        Ok(true)
    }

    async fn eval_read_only(
        &self,
        script: &Script,
        keys: &[String],
        args: &[ScriptArg],
    ) -> StoreResult<Vec<ScriptRow>> {
        self.begin("EVALSHA_RO")?;
        let body = self
            .scripts
            .read()
            .get(script.digest())
            .cloned()
            .ok_or_else(|| StoreError::NoScript { digest: script.digest().to_owned() })?;

        let keyspace = self.keyspace.read();
        body.eval(&Snapshot { keyspace: &keyspace }, keys, args)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn txn_add(key: &str, entries: &[(&str, f64)]) -> Transaction {
        Transaction::new()
            .sorted_set_add(key, entries.iter().map(|(m, s)| ScoredMember::new(*m, *s)).collect())
    }

    #[tokio::test]
    async fn test_transaction_applies_all_commands() {
        let store = InMemoryStore::new();
        let txn = txn_add("main", &[("alice", -10.0), ("bob", -20.0)])
            .hash_set("meta", vec![("alice".into(), b"a".to_vec())]);

        assert!(store.execute(txn, WriteMode::Acknowledged).await.unwrap());
        assert_eq!(store.sorted_set_rank("main", "bob").await.unwrap(), Some(0));
        assert_eq!(store.sorted_set_score("main", "alice").await.unwrap(), Some(-10.0));
        assert_eq!(store.hash_get("meta", "alice").await.unwrap(), Some(b"a".to_vec()));
        assert_eq!(store.hash_len("meta").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_refused_commit_applies_nothing() {
        let store = InMemoryStore::new();
        store.refuse_next_commits(1);

        let committed = store
            .execute(txn_add("main", &[("alice", -1.0)]), WriteMode::Acknowledged)
            .await
            .unwrap();
        assert!(!committed);
        assert!(!store.contains_key("main"));

        assert!(
            store
                .execute(txn_add("main", &[("alice", -1.0)]), WriteMode::Acknowledged)
                .await
                .unwrap()
        );
        assert!(store.contains_key("main"));
    }

    #[tokio::test]
    async fn test_wrong_type_rejects_whole_batch() {
        let store = InMemoryStore::new();
        store
            .execute(
                Transaction::new().hash_set("meta", vec![("f".into(), vec![1])]),
                WriteMode::Acknowledged,
            )
            .await
            .unwrap();

        let txn = txn_add("main", &[("alice", -1.0)]).sorted_set_add(
            "meta",
            vec![ScoredMember::new("x", 1.0)],
        );
        let err = store.execute(txn, WriteMode::Acknowledged).await.unwrap_err();
        assert!(matches!(err, StoreError::WrongType { .. }));
        assert!(!store.contains_key("main"), "no command of a rejected batch is applied");
    }

    #[tokio::test]
    async fn test_fire_and_forget_swallows_refusal() {
        let store = InMemoryStore::new();
        store.refuse_next_commits(1);
        let acked = store
            .execute(txn_add("main", &[("alice", -1.0)]), WriteMode::FireAndForget)
            .await
            .unwrap();
        assert!(acked);
        assert!(!store.contains_key("main"));
    }

    #[tokio::test]
    async fn test_fire_and_forget_reports_send_failure() {
        let store = InMemoryStore::new();
        store.fail_next_commands(1);
        let err = store
            .execute(txn_add("main", &[("alice", -1.0)]), WriteMode::FireAndForget)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Injected { .. }));
        assert!(!store.contains_key("main"));
        assert_eq!(store.transaction_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_command_failure() {
        let store = InMemoryStore::new();
        store.fail_next_commands(1);
        let err = store.sorted_set_len("main").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.sorted_set_len("main").await.unwrap(), 0);
        assert_eq!(store.command_count(), 2);
    }

    #[tokio::test]
    async fn test_removing_last_member_drops_key() {
        let store = InMemoryStore::new();
        store.execute(txn_add("main", &[("alice", -1.0)]), WriteMode::Acknowledged).await.unwrap();
        store
            .execute(
                Transaction::new().sorted_set_remove("main", vec!["alice".into()]),
                WriteMode::Acknowledged,
            )
            .await
            .unwrap();
        assert!(!store.contains_key("main"));
        assert_eq!(store.key_count(), 0);
    }

    #[tokio::test]
    async fn test_range_queries() {
        let store = InMemoryStore::new();
        store
            .execute(
                txn_add("main", &[("a", -250.0), ("b", -200.0), ("c", -100.0), ("d", -100.0)]),
                WriteMode::Acknowledged,
            )
            .await
            .unwrap();

        assert_eq!(store.sorted_set_range_by_rank("main", 1, 2).await.unwrap(), vec!["b", "c"]);
        assert_eq!(
            store.sorted_set_range_by_score("main", -200.0, -100.0).await.unwrap(),
            vec!["b", "c", "d"]
        );
        let with_scores = store.sorted_set_range_by_rank_with_scores("main", 0, 0).await.unwrap();
        assert_eq!(with_scores, vec![ScoredMember::new("a", -250.0)]);
        assert_eq!(
            store.hash_get_many("meta", &["a".into(), "b".into()]).await.unwrap(),
            vec![None, None]
        );
    }

    struct EchoFirst;

    impl ScriptBody for EchoFirst {
        fn eval(
            &self,
            view: &dyn StoreView,
            keys: &[String],
            _args: &[ScriptArg],
        ) -> Result<Vec<ScriptRow>, StoreError> {
            Ok(view
                .range_by_rank_with_scores(&keys[0], 0, 0)?
                .into_iter()
                .map(|e| ScriptRow { member: e.member, rank: 1, score: e.score })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_eval_requires_registration() {
        let store = InMemoryStore::new();
        let script = Script::new("echo", "return redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')");
        store.execute(txn_add("main", &[("a", -1.0)]), WriteMode::Acknowledged).await.unwrap();

        let err = store.eval_read_only(&script, &["main".into()], &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::NoScript { .. }));

        store.register_script(&script, Arc::new(EchoFirst));
        let rows = store.eval_read_only(&script, &["main".into()], &[]).await.unwrap();
        assert_eq!(rows, vec![ScriptRow { member: "a".into(), rank: 1, score: -1.0 }]);
    }
}
