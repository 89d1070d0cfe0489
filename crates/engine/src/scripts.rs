//! Ranking scripts.
//!
//! Dense and competition ranks cannot be read off a plain range query, so they
//! are computed inside the store by read-only scripts that see one consistent
//! snapshot:
//!
//! - **Dense** (`KEYS = [main, distinct]`, `ARGV = [start, page_size]`): for
//!   each window member, `1 + ZCOUNT(distinct, -inf, (score)`, one count per
//!   tie group.
//! - **Competition** (`KEYS = [main]`, `ARGV = [start, page_size, mode]`):
//!   one pass over the window. Two `ZCOUNT`s on the main index measure how far
//!   the first and last tie groups extend beyond the window.
//!
//! Both return `{member, rank, score}` triples in store order over positions
//! `[start, start + page_size]`.
//!
//! Scripts are compiled once per process ([`ranking_scripts`]). For the
//! in-memory backend, [`register_native`] installs Rust bodies that compute
//! the same result through [`crate::ranking`].

use std::sync::{Arc, LazyLock};

use rankboard_store::{
    InMemoryStore, ScoreBound, Script, ScriptArg, ScriptBody, ScriptRow, StoreView,
};
use rankboard_types::StoreError;

use crate::ranking::{self, CompetitionMode};

/// Dense-rank script source.
pub const DENSE_RANK_SOURCE: &str = r"
local start = tonumber(ARGV[1])
local stop = start + tonumber(ARGV[2])
local window = redis.call('ZRANGE', KEYS[1], start, stop, 'WITHSCORES')
local rows = {}
local previous, rank
for i = 1, #window, 2 do
    local member, score = window[i], window[i + 1]
    if score ~= previous then
        rank = redis.call('ZCOUNT', KEYS[2], '-inf', '(' .. score) + 1
        previous = score
    end
    rows[#rows + 1] = {member, rank, score}
end
return rows
";

/// Competition-rank script source. `ARGV[3]` is `0` (standard) or `1` (modified).
pub const COMPETITION_RANK_SOURCE: &str = r"
local start = tonumber(ARGV[1])
local stop = start + tonumber(ARGV[2])
local modified = ARGV[3] == '1'
local window = redis.call('ZRANGE', KEYS[1], start, stop, 'WITHSCORES')
local n = #window / 2
if n == 0 then
    return {}
end
local leading = start - redis.call('ZCOUNT', KEYS[1], '-inf', '(' .. window[2])
local trailing = redis.call('ZCOUNT', KEYS[1], '-inf', window[2 * n]) - (start + n)
local rows = {}
local i = 0
while i < n do
    local score = window[2 * i + 2]
    local j = i
    while j + 1 < n and window[2 * j + 4] == score do
        j = j + 1
    end
    local first = start + i
    if i == 0 then
        first = first - leading
    end
    local last = start + j
    if j == n - 1 then
        last = last + trailing
    end
    local rank = first + 1
    if modified then
        rank = last + 1
    end
    for k = i, j do
        rows[#rows + 1] = {window[2 * k + 1], rank, window[2 * k + 2]}
    end
    i = j + 1
end
return rows
";

/// The compiled ranking scripts.
#[derive(Debug)]
pub struct RankingScripts {
    /// Dense-rank script.
    pub dense: Script,
    /// Competition-rank script.
    pub competition: Script,
}

static RANKING_SCRIPTS: LazyLock<RankingScripts> = LazyLock::new(|| RankingScripts {
    dense: Script::new("dense_rank", DENSE_RANK_SOURCE),
    competition: Script::new("competition_rank", COMPETITION_RANK_SOURCE),
});

/// Returns the process-wide compiled ranking scripts.
pub fn ranking_scripts() -> &'static RankingScripts {
    &RANKING_SCRIPTS
}

/// Installs native bodies for both ranking scripts into an in-memory store.
pub fn register_native(store: &InMemoryStore) {
    let scripts = ranking_scripts();
    store.register_script(&scripts.dense, Arc::new(DenseRank));
    store.register_script(&scripts.competition, Arc::new(CompetitionRank));
}

/// Native body of [`DENSE_RANK_SOURCE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseRank;

impl ScriptBody for DenseRank {
    fn eval(
        &self,
        view: &dyn StoreView,
        keys: &[String],
        args: &[ScriptArg],
    ) -> Result<Vec<ScriptRow>, StoreError> {
        let [main, distinct] = keys else {
            return Err(bad_call("dense_rank", "expected 2 keys"));
        };
        let (start, page_size) = window_args("dense_rank", args)?;

        let window = view.range_by_rank_with_scores(main, start, start.saturating_add(page_size))?;
        ranking::dense_ranks(&window, |score| {
            view.count_by_score(distinct, ScoreBound::NegInf, ScoreBound::Exclusive(score))
        })
    }
}

/// Native body of [`COMPETITION_RANK_SOURCE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompetitionRank;

impl ScriptBody for CompetitionRank {
    fn eval(
        &self,
        view: &dyn StoreView,
        keys: &[String],
        args: &[ScriptArg],
    ) -> Result<Vec<ScriptRow>, StoreError> {
        let [main] = keys else {
            return Err(bad_call("competition_rank", "expected 1 key"));
        };
        let (start, page_size) = window_args("competition_rank", args)?;
        let mode = args
            .get(2)
            .and_then(ScriptArg::as_i64)
            .and_then(CompetitionMode::from_code)
            .ok_or_else(|| bad_call("competition_rank", "mode must be 0 or 1"))?;

        let window = view.range_by_rank_with_scores(main, start, start.saturating_add(page_size))?;
        let (Some(first), Some(last)) = (window.first(), window.last()) else {
            return Ok(Vec::new());
        };

        let better = view.count_by_score(main, ScoreBound::NegInf, ScoreBound::Exclusive(first.score))?;
        let through_last =
            view.count_by_score(main, ScoreBound::NegInf, ScoreBound::Inclusive(last.score))?;
        let leading_ties = start.saturating_sub(better);
        let trailing_ties = through_last.saturating_sub(start + window.len() as u64);

        Ok(ranking::competition_ranks(&window, start, leading_ties, trailing_ties, mode))
    }
}

fn bad_call(script: &'static str, message: &str) -> StoreError {
    StoreError::Command { command: format!("EVALSHA {script}"), message: message.to_owned() }
}

fn window_args(script: &'static str, args: &[ScriptArg]) -> Result<(u64, u64), StoreError> {
    let arg = |i: usize| {
        args.get(i)
            .and_then(ScriptArg::as_i64)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| bad_call(script, "start and page size must be non-negative integers"))
    };
    Ok((arg(0)?, arg(1)?))
}
