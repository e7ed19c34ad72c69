// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction layer with pessimistic locking and online deadlock detection.
//!
//! This module provides transactions over the in-memory map with:
//! - Per-bucket exclusive locks, re-entrant for the holding transaction
//! - A live wait-for graph with cycle detection run inside lock acquisition
//! - Youngest-victim resolution: the cycle member with the largest begin
//!   sequence is aborted so the rest can make progress
//!
//! # Key Concepts
//!
//! ## Deadlock Detection
//!
//! When a lock request would block, the engine records a wait-for edge from
//! the requester to the holder and searches the graph for a cycle. If one
//! exists, the youngest member (largest `start_seq`) is marked aborted. The
//! victim is not woken specially: blocked waiters poll with a bounded
//! timeout and observe their own abort flag on wake, so resolution latency
//! is bounded by the poll interval rather than instantaneous.
//!
//! Youngest-first minimizes wasted work: the oldest transaction in a cycle
//! has typically done the most and holds the resources whose release
//! unblocks the most waiters.
//!
//! ## Buffered Writes
//!
//! Writes are buffered in the transaction and applied to the map in order
//! at commit, while every touched key is still exclusively locked. Reads
//! within the transaction see the most recently buffered write for a key.
//!
//! # Example
//!
//! ```
//! use rubidium_kv::storage::{Key, Value};
//! use rubidium_kv::txn::{Engine, EngineConfig, TransactionManager};
//!
//! let engine = Engine::new(EngineConfig::default());
//!
//! let mut txn = engine.begin()?;
//! engine.put(&mut txn, Key::from("counter"), Value::from("1"))?;
//! assert_eq!(
//!     engine.get(&mut txn, &Key::from("counter"))?,
//!     Some(Value::from("1"))
//! );
//! engine.commit(txn)?;
//! # Ok::<(), rubidium_kv::txn::TxnError>(())
//! ```

mod config;
mod error;
mod graph;
mod lock;
mod manager;
mod transaction;

pub use config::EngineConfig;
pub use error::TxnError;
pub use manager::Engine;
pub use transaction::{Transaction, TxnId};

use crate::storage::{Key, Value};

/// Transaction manager contract.
///
/// Provides methods to begin, read, write, commit, and abort transactions.
/// `commit` and `abort` consume the handle: either way the transaction's
/// locks are released and its slot is freed.
pub trait TransactionManager: Send + Sync {
    /// Begins a new transaction. Fails with [`TxnError::NoSlot`] when every
    /// transaction slot is occupied.
    fn begin(&self) -> Result<Transaction, TxnError>;

    /// Reads a key within the transaction.
    ///
    /// Returns the most recently buffered write for the key if there is one,
    /// otherwise locks the key's bucket and reads the map. `None` means the
    /// key is absent.
    fn get(&self, txn: &mut Transaction, key: &Key) -> Result<Option<Value>, TxnError>;

    /// Buffers a write within the transaction, locking the key's bucket
    /// first. Duplicate keys are permitted; commit applies writes in order.
    fn put(&self, txn: &mut Transaction, key: Key, value: Value) -> Result<(), TxnError>;

    /// Commits the transaction, applying its buffered writes atomically.
    /// Fails with [`TxnError::Aborted`] if the transaction was marked
    /// aborted; the handle is consumed and cleaned up either way.
    fn commit(&self, txn: Transaction) -> Result<(), TxnError>;

    /// Aborts the transaction, discarding its buffered writes. Never fails.
    fn abort(&self, txn: Transaction);
}
