//! Sorted set: dual-indexed by score and member.
//!
//! Members are ordered by `(score, member)`; equal scores are broken by
//! member identity, matching the ordering the engine expects from a real
//! store. A sorted `Vec<(OrderedFloat<f64>, Arc<str>)>` serves rank and range
//! queries by binary search, and a `HashMap<Arc<str>, OrderedFloat<f64>>`
//! serves member→score lookups. Member strings are shared between both.

use std::{collections::HashMap, sync::Arc};

use ordered_float::OrderedFloat;

use crate::types::{ScoreBound, ScoredMember};

/// A sorted set of unique string members, each with a floating-point score.
#[derive(Debug, Clone, Default)]
pub struct SortedSet {
    /// Kept sorted by `(score, member)` at all times.
    sorted: Vec<(OrderedFloat<f64>, Arc<str>)>,
    scores: HashMap<Arc<str>, OrderedFloat<f64>>,
}

impl SortedSet {
    /// Creates an empty sorted set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `member` at `score`, moving it if already present.
    ///
    /// Returns `true` if the member was newly added.
    pub fn add(&mut self, member: &str, score: f64) -> bool {
        let new_score = OrderedFloat(score);

        if let Some((name, &old_score)) = self.scores.get_key_value(member) {
            if old_score == new_score {
                return false;
            }
            let name = Arc::clone(name);
            if let Ok(old_idx) = self.search_idx(old_score, &name) {
                self.sorted.remove(old_idx);
            }
            self.scores.insert(Arc::clone(&name), new_score);
            let idx = self.insertion_idx(new_score, &name);
            self.sorted.insert(idx, (new_score, name));
            false
        } else {
            let name: Arc<str> = Arc::from(member);
            self.scores.insert(Arc::clone(&name), new_score);
            let idx = self.insertion_idx(new_score, &name);
            self.sorted.insert(idx, (new_score, name));
            true
        }
    }

    /// Removes a member. Returns `true` if it existed.
    pub fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove_entry(member) {
            Some((name, score)) => {
                if let Ok(idx) = self.search_idx(score, &name) {
                    self.sorted.remove(idx);
                }
                true
            },
            None => false,
        }
    }

    /// Returns the score for a member.
    #[must_use]
    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).map(|s| s.0)
    }

    /// Returns the 0-based ascending position of a member.
    #[must_use]
    pub fn rank(&self, member: &str) -> Option<usize> {
        let (name, &score) = self.scores.get_key_value(member)?;
        self.search_idx(score, name).ok()
    }

    /// Returns members in positions `[start, stop]`, inclusive, with scores.
    ///
    /// `stop` past the end is clamped.
    #[must_use]
    pub fn range_by_rank(&self, start: u64, stop: u64) -> Vec<ScoredMember> {
        let len = self.sorted.len();
        let start = usize::try_from(start).unwrap_or(usize::MAX);
        if start >= len || stop < start as u64 {
            return Vec::new();
        }
        let stop = usize::try_from(stop).unwrap_or(usize::MAX).min(len - 1);

        self.sorted[start..=stop]
            .iter()
            .map(|(score, member)| ScoredMember::new(&**member, score.0))
            .collect()
    }

    /// Returns members whose score lies within the bounds, ascending.
    #[must_use]
    pub fn range_by_score(&self, min: ScoreBound, max: ScoreBound) -> Vec<ScoredMember> {
        let (lo, hi) = self.score_span(min, max);
        self.sorted[lo..hi]
            .iter()
            .map(|(score, member)| ScoredMember::new(&**member, score.0))
            .collect()
    }

    /// Counts members whose score lies within the bounds.
    #[must_use]
    pub fn count_by_score(&self, min: ScoreBound, max: ScoreBound) -> usize {
        let (lo, hi) = self.score_span(min, max);
        hi - lo
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns `true` if the sorted set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Half-open index span `[lo, hi)` of members within the bounds.
    fn score_span(&self, min: ScoreBound, max: ScoreBound) -> (usize, usize) {
        let lo = match min {
            ScoreBound::NegInf => 0,
            ScoreBound::PosInf => self.sorted.len(),
            ScoreBound::Inclusive(s) => self.sorted.partition_point(|(score, _)| score.0 < s),
            ScoreBound::Exclusive(s) => self.sorted.partition_point(|(score, _)| score.0 <= s),
        };
        let hi = match max {
            ScoreBound::NegInf => 0,
            ScoreBound::PosInf => self.sorted.len(),
            ScoreBound::Inclusive(s) => self.sorted.partition_point(|(score, _)| score.0 <= s),
            ScoreBound::Exclusive(s) => self.sorted.partition_point(|(score, _)| score.0 < s),
        };
        (lo, hi.max(lo))
    }

    fn search_idx(&self, score: OrderedFloat<f64>, name: &str) -> Result<usize, usize> {
        self.sorted.binary_search_by(|(s, m)| s.cmp(&score).then_with(|| (**m).cmp(name)))
    }

    fn insertion_idx(&self, score: OrderedFloat<f64>, name: &str) -> usize {
        match self.search_idx(score, name) {
            Ok(idx) | Err(idx) => idx,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn members(entries: &[ScoredMember]) -> Vec<&str> {
        entries.iter().map(|e| e.member.as_str()).collect()
    }

    #[test]
    fn test_add_and_score() {
        let mut ss = SortedSet::new();
        assert!(ss.add("alice", 100.0));
        assert_eq!(ss.score("alice"), Some(100.0));
        assert_eq!(ss.len(), 1);
    }

    #[test]
    fn test_readd_moves_member() {
        let mut ss = SortedSet::new();
        ss.add("alice", 100.0);
        ss.add("bob", 50.0);
        assert!(!ss.add("alice", 10.0));
        assert_eq!(ss.len(), 2);
        assert_eq!(ss.rank("alice"), Some(0));
        assert_eq!(ss.rank("bob"), Some(1));
    }

    #[test]
    fn test_remove() {
        let mut ss = SortedSet::new();
        ss.add("alice", 1.0);
        assert!(ss.remove("alice"));
        assert!(!ss.remove("alice"));
        assert!(ss.is_empty());
        assert_eq!(ss.rank("alice"), None);
    }

    #[test]
    fn test_equal_scores_break_by_member() {
        let mut ss = SortedSet::new();
        ss.add("charlie", -100.0);
        ss.add("alice", -100.0);
        ss.add("bob", -100.0);
        assert_eq!(ss.rank("alice"), Some(0));
        assert_eq!(ss.rank("bob"), Some(1));
        assert_eq!(ss.rank("charlie"), Some(2));
    }

    #[test]
    fn test_range_by_rank_clamps() {
        let mut ss = SortedSet::new();
        ss.add("a", 1.0);
        ss.add("b", 2.0);
        ss.add("c", 3.0);
        assert_eq!(members(&ss.range_by_rank(1, 100)), vec!["b", "c"]);
        assert_eq!(members(&ss.range_by_rank(0, 0)), vec!["a"]);
        assert!(ss.range_by_rank(3, 10).is_empty());
        assert!(ss.range_by_rank(2, 1).is_empty());
        assert!(SortedSet::new().range_by_rank(0, 10).is_empty());
    }

    #[test]
    fn test_score_bounds() {
        let mut ss = SortedSet::new();
        for (m, s) in [("a", -250.0), ("b", -200.0), ("c", -100.0), ("d", -100.0), ("e", -50.0)] {
            ss.add(m, s);
        }
        assert_eq!(ss.count_by_score(ScoreBound::NegInf, ScoreBound::Exclusive(-100.0)), 2);
        assert_eq!(ss.count_by_score(ScoreBound::NegInf, ScoreBound::Inclusive(-100.0)), 4);
        assert_eq!(ss.count_by_score(ScoreBound::Exclusive(-100.0), ScoreBound::PosInf), 1);
        assert_eq!(
            members(&ss.range_by_score(ScoreBound::Inclusive(-200.0), ScoreBound::Inclusive(-100.0))),
            vec!["b", "c", "d"]
        );
        assert_eq!(ss.count_by_score(ScoreBound::Inclusive(5.0), ScoreBound::Inclusive(1.0)), 0);
    }
}
