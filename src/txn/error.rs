// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction error types.

use crate::storage::StorageError;

/// Errors that can occur in transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TxnError {
    /// All transaction slots are occupied. Retriable once another
    /// transaction finishes.
    #[error("no free transaction slot")]
    NoSlot,

    /// The transaction has been marked aborted, either as a deadlock victim
    /// or explicitly. Every subsequent operation on the handle fails with
    /// this; the only valid next step is cleanup via `abort`.
    #[error("transaction aborted")]
    Aborted,

    /// The write set is at capacity. Previously buffered writes remain
    /// valid; the caller should commit or abort before further puts.
    #[error("write set full")]
    WriteSetFull,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
