//! Typed write commands and transaction request building.
//!
//! A [`Transaction`] is an ordered batch of [`Command`]s that a store applies
//! atomically: a concurrent reader observes either every command or none.
//! Building the batch is pure; nothing reaches the store until the batch is
//! handed to [`Store::execute`](crate::Store::execute), so a dropped or
//! cancelled caller never leaves a transaction partially issued.

use crate::types::ScoredMember;

/// A single write command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert members into a sorted set, overwriting existing scores (`ZADD`).
    SortedSetAdd {
        /// Sorted set key.
        key: String,
        /// Members and scores to insert.
        entries: Vec<ScoredMember>,
    },
    /// Remove members from a sorted set (`ZREM`).
    SortedSetRemove {
        /// Sorted set key.
        key: String,
        /// Members to remove.
        members: Vec<String>,
    },
    /// Set hash fields (`HSET`).
    HashSet {
        /// Hash key.
        key: String,
        /// Field/value pairs.
        entries: Vec<(String, Vec<u8>)>,
    },
    /// Delete hash fields (`HDEL`).
    HashDelete {
        /// Hash key.
        key: String,
        /// Fields to delete.
        fields: Vec<String>,
    },
    /// Delete whole keys (`DEL`).
    DeleteKeys {
        /// Keys to delete.
        keys: Vec<String>,
    },
}

impl Command {
    /// Returns the store command name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SortedSetAdd { .. } => "ZADD",
            Self::SortedSetRemove { .. } => "ZREM",
            Self::HashSet { .. } => "HSET",
            Self::HashDelete { .. } => "HDEL",
            Self::DeleteKeys { .. } => "DEL",
        }
    }

    /// Returns true if the command carries nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::SortedSetAdd { entries, .. } => entries.is_empty(),
            Self::SortedSetRemove { members, .. } => members.is_empty(),
            Self::HashSet { entries, .. } => entries.is_empty(),
            Self::HashDelete { fields, .. } => fields.is_empty(),
            Self::DeleteKeys { keys } => keys.is_empty(),
        }
    }
}

/// An ordered batch of commands committed atomically.
///
/// Empty commands are dropped as they are queued, so a batch never sends a
/// no-op `ZADD`/`HSET` with zero arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    commands: Vec<Command>,
}

impl Transaction {
    /// Creates an empty transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a command.
    pub fn push(&mut self, command: Command) {
        if !command.is_empty() {
            self.commands.push(command);
        }
    }

    /// Queues a `ZADD`.
    #[must_use]
    pub fn sorted_set_add(mut self, key: impl Into<String>, entries: Vec<ScoredMember>) -> Self {
        self.push(Command::SortedSetAdd { key: key.into(), entries });
        self
    }

    /// Queues a `ZREM`.
    #[must_use]
    pub fn sorted_set_remove(mut self, key: impl Into<String>, members: Vec<String>) -> Self {
        self.push(Command::SortedSetRemove { key: key.into(), members });
        self
    }

    /// Queues an `HSET`.
    #[must_use]
    pub fn hash_set(mut self, key: impl Into<String>, entries: Vec<(String, Vec<u8>)>) -> Self {
        self.push(Command::HashSet { key: key.into(), entries });
        self
    }

    /// Queues an `HDEL`.
    #[must_use]
    pub fn hash_delete(mut self, key: impl Into<String>, fields: Vec<String>) -> Self {
        self.push(Command::HashDelete { key: key.into(), fields });
        self
    }

    /// Queues a `DEL`.
    #[must_use]
    pub fn delete_keys(mut self, keys: Vec<String>) -> Self {
        self.push(Command::DeleteKeys { keys });
        self
    }

    /// Returns the queued commands in order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Consumes the transaction, returning its commands.
    #[must_use]
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    /// Returns the number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
