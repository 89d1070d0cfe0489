//! rankboard-store: the ordered key-value store the ranking engine runs on.
//!
//! The engine never talks to a concrete store. It issues commands through the
//! [`Store`] trait:
//!
//! - **Sorted sets**: ascending by score, ties broken by member identity
//! - **Hashes**: field to opaque bytes
//! - **Transactions**: ordered [`Command`] batches committed atomically
//! - **Read-only scripts**: pre-hashed [`Script`] handles evaluated against one
//!   snapshot
//!
//! [`InMemoryStore`] implements the full surface in process. Scripts run there
//! as native [`ScriptBody`] implementations registered under the script's
//! digest.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rankboard_store::{InMemoryStore, ScoredMember, Store, Transaction};
//! use rankboard_types::WriteMode;
//!
//! # async fn demo() -> Result<(), rankboard_types::StoreError> {
//! let store = InMemoryStore::new();
//! let txn = Transaction::new().sorted_set_add("board", vec![ScoredMember::new("p1", -10.0)]);
//! assert!(store.execute(txn, WriteMode::Acknowledged).await?);
//! assert_eq!(store.sorted_set_rank("board", "p1").await?, Some(0));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod command;
pub mod script;
pub mod sorted_set;
pub mod types;

pub use backend::{InMemoryStore, Store, StoreResult};
pub use command::{Command, Transaction};
pub use script::{Script, ScriptBody, StoreView};
pub use sorted_set::SortedSet;
pub use types::{ScoreBound, ScoredMember, ScriptArg, ScriptRow};
