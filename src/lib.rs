// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! RubidiumKV: an in-memory transactional key-value store built around a
//! pessimistic concurrency control engine with online deadlock detection.
//!
//! Concurrent transactions take per-key exclusive locks, buffer their writes
//! locally, and commit or abort atomically. Blocked lock requests feed a
//! live wait-for graph; when a cycle appears, the youngest transaction in it
//! is aborted so the rest can make progress.

pub mod server;
pub mod storage;
pub mod txn;

pub use storage::{Key, KvMap, StorageError, Value};
pub use txn::{Engine, EngineConfig, Transaction, TransactionManager, TxnError, TxnId};
