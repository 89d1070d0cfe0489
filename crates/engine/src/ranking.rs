//! Rank computation over a window of the main index.
//!
//! A window is a contiguous run of `(member, stored score)` pairs in store
//! order starting at absolute position `start`. These functions assign 1-based
//! ranks to the window's rows. They are pure so the same code serves the
//! in-memory script bodies and unit tests; the script text in
//! [`scripts`](crate::scripts) computes the same thing inside a real store.
//!
//! Ties are detected by exact equality of stored scores.

use rankboard_store::{ScoredMember, ScriptRow};

/// Variant of competition ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompetitionMode {
    /// A tie group takes the position of its first member ("1224").
    Standard,
    /// A tie group takes the position of its last member ("1334").
    Modified,
}

impl CompetitionMode {
    /// Numeric code passed to the competition script.
    pub const fn code(self) -> i64 {
        match self {
            Self::Standard => 0,
            Self::Modified => 1,
        }
    }

    /// Parses a script mode code.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Standard),
            1 => Some(Self::Modified),
            _ => None,
        }
    }
}

/// Positional ranks: `start + i + 1`.
pub fn default_ranks(start: u64, window: &[ScoredMember]) -> Vec<ScriptRow> {
    window
        .iter()
        .zip(start..)
        .map(|(entry, position)| ScriptRow {
            member: entry.member.clone(),
            rank: position + 1,
            score: entry.score,
        })
        .collect()
}

/// Dense ranks: one more than the number of distinct scores strictly better.
///
/// `tiers_better(score)` returns how many distinct stored scores are strictly
/// lower than `score`. It is called once per tie group in the window.
///
/// # Errors
///
/// Propagates the first error returned by `tiers_better`.
pub fn dense_ranks<E>(
    window: &[ScoredMember],
    mut tiers_better: impl FnMut(f64) -> Result<u64, E>,
) -> Result<Vec<ScriptRow>, E> {
    let mut rows = Vec::with_capacity(window.len());
    let mut current: Option<(f64, u64)> = None;

    for entry in window {
        let rank = match current {
            Some((score, rank)) if score == entry.score => rank,
            _ => {
                let rank = tiers_better(entry.score)? + 1;
                current = Some((entry.score, rank));
                rank
            },
        };
        rows.push(ScriptRow { member: entry.member.clone(), rank, score: entry.score });
    }
    Ok(rows)
}

/// Competition ranks for a window, in one pass.
///
/// A tie group may extend past either end of the window. `leading_ties` is
/// the number of members before `start` that tie with the window's first
/// member; `trailing_ties` the number after the window that tie with its last
/// member. Both are zero when the window is cut at a score boundary.
pub fn competition_ranks(
    window: &[ScoredMember],
    start: u64,
    leading_ties: u64,
    trailing_ties: u64,
    mode: CompetitionMode,
) -> Vec<ScriptRow> {
    let mut rows = Vec::with_capacity(window.len());
    let last_index = window.len().saturating_sub(1);
    let mut group_start = 0;

    for (i, entry) in window.iter().enumerate() {
        let closes_group = i == last_index || window[i + 1].score != entry.score;
        if !closes_group {
            continue;
        }

        let mut first = start + group_start as u64;
        if group_start == 0 {
            first -= leading_ties.min(first);
        }
        let mut last = start + i as u64;
        if i == last_index {
            last += trailing_ties;
        }
        let rank = match mode {
            CompetitionMode::Standard => first + 1,
            CompetitionMode::Modified => last + 1,
        };

        rows.extend(window[group_start..=i].iter().map(|member| ScriptRow {
            member: member.member.clone(),
            rank,
            score: member.score,
        }));
        group_start = i + 1;
    }
    rows
}
