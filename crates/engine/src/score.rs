//! Score inversion.
//!
//! The store orders sorted sets ascending; leaderboards rank the highest score
//! first. Scores are therefore stored negated. [`invert`] is applied on every
//! write and to query bounds, [`restore`] exactly once on every value read
//! back. Nothing else in the crate flips signs.

/// Maps a caller-visible score to its stored form.
///
/// Zero maps to `+0.0`, never `-0.0`.
#[inline]
pub fn invert(score: f64) -> f64 {
    if score == 0.0 { 0.0 } else { -score }
}

/// Maps a stored score back to its caller-visible form.
///
/// Zero maps to `+0.0`, never `-0.0`.
#[inline]
pub fn restore(stored: f64) -> f64 {
    if stored == 0.0 { 0.0 } else { -stored }
}

/// Member name of a stored score in the distinct-score index.
///
/// Rust's shortest round-trip float formatting keeps distinct scores distinct.
pub(crate) fn distinct_member(stored: f64) -> String {
    stored.to_string()
}
