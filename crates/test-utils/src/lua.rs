//! Lua execution of store scripts against the in-memory backend.
//!
//! [`LuaScript`] is a [`ScriptBody`] that interprets script source with Lua
//! 5.1, the dialect a Redis-compatible store embeds. `redis.call` is bound to
//! the snapshot the body receives and answers the two commands the ranking
//! scripts issue, with the store's reply shapes:
//!
//! | Command                               | Reply                                   |
//! |---------------------------------------|-----------------------------------------|
//! | `ZRANGE key start stop WITHSCORES`    | flat array `member, score, ...`, scores as strings |
//! | `ZCOUNT key min max`                  | integer                                 |
//!
//! Script replies are decoded from `{member, rank, score}` triples.

use std::sync::Arc;

use mlua::{Lua, Table, Value, Variadic};
use rankboard_store::{
    InMemoryStore, ScoreBound, Script, ScriptArg, ScriptBody, ScriptRow, StoreView,
};
use rankboard_types::StoreError;

/// A script body that runs its source through a Lua interpreter.
#[derive(Debug, Clone, Copy)]
pub struct LuaScript {
    source: &'static str,
}

impl LuaScript {
    /// Wraps script source.
    #[must_use]
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }
}

impl ScriptBody for LuaScript {
    fn eval(
        &self,
        view: &dyn StoreView,
        keys: &[String],
        args: &[ScriptArg],
    ) -> Result<Vec<ScriptRow>, StoreError> {
        run(self.source, view, keys, args)
            .map_err(|e| StoreError::Command { command: "EVAL".to_owned(), message: e.to_string() })
    }
}

/// Registers Lua bodies for `scripts`, keyed by each script's digest.
pub fn register_lua(store: &InMemoryStore, scripts: &[&Script]) {
    for script in scripts {
        store.register_script(script, Arc::new(LuaScript::new(script.source())));
    }
}

fn run(
    source: &str,
    view: &dyn StoreView,
    keys: &[String],
    args: &[ScriptArg],
) -> mlua::Result<Vec<ScriptRow>> {
    let lua = Lua::new();
    let globals = lua.globals();
    globals.set("KEYS", keys.to_vec())?;
    globals.set("ARGV", args.iter().map(ToString::to_string).collect::<Vec<_>>())?;

    let rows: Vec<Table> = lua.scope(|scope| {
        let call = scope
            .create_function(|lua, argv: Variadic<String>| redis_call(lua, view, &argv))?;
        let redis = lua.create_table()?;
        redis.set("call", call)?;
        globals.set("redis", redis)?;
        lua.load(source).eval()
    })?;

    rows.iter().map(decode_row).collect()
}

fn redis_call(lua: &Lua, view: &dyn StoreView, argv: &[String]) -> mlua::Result<Value> {
    match argv {
        [command, key, start, stop, with_scores]
            if command.eq_ignore_ascii_case("ZRANGE")
                && with_scores.eq_ignore_ascii_case("WITHSCORES") =>
        {
            let members = view
                .range_by_rank_with_scores(key, parse_index(start)?, parse_index(stop)?)
                .map_err(mlua::Error::external)?;
            let reply = lua.create_table()?;
            for (i, entry) in members.into_iter().enumerate() {
                reply.raw_set(2 * i + 1, entry.member)?;
                reply.raw_set(2 * i + 2, entry.score.to_string())?;
            }
            Ok(Value::Table(reply))
        },
        [command, key, min, max] if command.eq_ignore_ascii_case("ZCOUNT") => {
            let count = view
                .count_by_score(key, parse_bound(min)?, parse_bound(max)?)
                .map_err(mlua::Error::external)?;
            Ok(Value::Number(count as f64))
        },
        _ => Err(mlua::Error::RuntimeError(format!("unsupported redis.call {argv:?}"))),
    }
}

fn parse_index(raw: &str) -> mlua::Result<u64> {
    raw.parse::<u64>()
        .map_err(|_| mlua::Error::RuntimeError(format!("ERR value is not an integer: {raw}")))
}

fn parse_bound(raw: &str) -> mlua::Result<ScoreBound> {
    let float = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| mlua::Error::RuntimeError(format!("ERR min or max is not a float: {raw}")))
    };
    match raw {
        "-inf" => Ok(ScoreBound::NegInf),
        "+inf" | "inf" => Ok(ScoreBound::PosInf),
        _ => match raw.strip_prefix('(') {
            Some(exclusive) => float(exclusive).map(ScoreBound::Exclusive),
            None => float(raw).map(ScoreBound::Inclusive),
        },
    }
}

fn decode_row(row: &Table) -> mlua::Result<ScriptRow> {
    let member: String = row.get(1)?;
    let rank: f64 = row.get(2)?;
    let score: String = row.get(3)?;
    if rank < 1.0 || rank.fract() != 0.0 {
        return Err(mlua::Error::RuntimeError(format!("rank {rank} for {member} is not a positive integer")));
    }
    let score = score
        .parse::<f64>()
        .map_err(|_| mlua::Error::RuntimeError(format!("score {score} for {member} is not a float")))?;
    Ok(ScriptRow { member, rank: rank as u64, score })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use rankboard_store::{ScoredMember, Store, Transaction};
    use rankboard_types::WriteMode;

    use super::*;

    const ECHO_WINDOW: &str = r"
local window = redis.call('ZRANGE', KEYS[1], ARGV[1], ARGV[2], 'WITHSCORES')
local rows = {}
for i = 1, #window, 2 do
    rows[#rows + 1] = {window[i], redis.call('ZCOUNT', KEYS[1], '-inf', window[i + 1]), window[i + 1]}
end
return rows
";

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound("-inf").unwrap(), ScoreBound::NegInf);
        assert_eq!(parse_bound("+inf").unwrap(), ScoreBound::PosInf);
        assert_eq!(parse_bound("(-2.5").unwrap(), ScoreBound::Exclusive(-2.5));
        assert_eq!(parse_bound("7").unwrap(), ScoreBound::Inclusive(7.0));
        assert!(parse_bound("(x").is_err());
    }

    #[tokio::test]
    async fn test_lua_reads_through_store_snapshot() {
        let store = InMemoryStore::new();
        let script = Script::new("echo_window", ECHO_WINDOW);
        register_lua(&store, &[&script]);
        let txn = Transaction::new().sorted_set_add(
            "z",
            vec![ScoredMember::new("a", -3.0), ScoredMember::new("b", -1.5), ScoredMember::new("c", 0.0)],
        );
        store.execute(txn, WriteMode::Acknowledged).await.unwrap();

        let rows = store
            .eval_read_only(&script, &["z".to_owned()], &[0_u64.into(), 1_u64.into()])
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                ScriptRow { member: "a".into(), rank: 1, score: -3.0 },
                ScriptRow { member: "b".into(), rank: 2, score: -1.5 },
            ]
        );
    }

    #[tokio::test]
    async fn test_lua_errors_become_store_errors() {
        let store = InMemoryStore::new();
        let script = Script::new("bad", "return redis.call('HGETALL', KEYS[1])");
        register_lua(&store, &[&script]);
        let err = store.eval_read_only(&script, &["h".to_owned()], &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Command { .. }));
    }
}
