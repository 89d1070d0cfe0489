//! Shared test utilities for Rankboard crates.
//!
//! - [`strategies`] - proptest generators for scores, keys and whole boards
//! - [`oracle`] - brute-force ranking used as the reference in property tests
//! - [`fixtures`] - the canonical tie-law board and test configurations
//! - [`lua`] - Lua execution of store scripts against the in-memory backend
//! - [`init_tracing`] - opt-in log output for a test run

#![deny(unsafe_code)]

pub mod fixtures;
pub mod lua;
pub mod oracle;
pub mod strategies;

pub use fixtures::{TIE_LAW_SCORES, test_config, tie_law_board};

/// Installs a `tracing` subscriber writing to the test harness.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
