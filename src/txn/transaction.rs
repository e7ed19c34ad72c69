// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction types and state shared with the deadlock detector.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::storage::{Key, Value};

/// Unique transaction identifier.
///
/// The id is the transaction's slot index in the engine's bounded slot pool
/// and doubles as its node index in the wait-for graph. Ids are reused once
/// the transaction commits or aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxnId(pub usize);

/// Per-transaction record shared between the owning handle and the engine's
/// slot table.
///
/// The deadlock detector marks victims through the slot table while the
/// victim's own thread is blocked in `acquire`, so the abort flag has to be
/// reachable from both sides.
#[derive(Debug)]
pub(crate) struct TxnShared {
    id: TxnId,
    start_seq: u64,
    aborted: AtomicBool,
}

impl TxnShared {
    pub(crate) fn new(id: TxnId, start_seq: u64) -> Self {
        Self {
            id,
            start_seq,
            aborted: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> TxnId {
        self.id
    }

    #[inline]
    pub(crate) fn start_seq(&self) -> u64 {
        self.start_seq
    }

    #[inline]
    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Marks the transaction aborted. Monotone: never cleared.
    #[inline]
    pub(crate) fn mark_aborted(&self) {
        self.aborted.store(true, Ordering::Release);
    }
}

/// A transaction handle.
///
/// Writes are buffered locally and applied to the map atomically on commit;
/// reads within the transaction see the most recently buffered write for a
/// key (read-your-own-writes). The handle must be passed back to
/// [`TransactionManager::commit`](super::TransactionManager::commit) or
/// [`TransactionManager::abort`](super::TransactionManager::abort) to release
/// its locks and free its slot.
#[derive(Debug)]
pub struct Transaction {
    pub(crate) shared: Arc<TxnShared>,
    /// Buffered writes, in issue order. Duplicate keys are permitted; commit
    /// applies them in order so the last write wins.
    pub(crate) write_set: Vec<(Key, Value)>,
    /// Bucket indices of held locks, deduplicated.
    pub(crate) held_locks: Vec<usize>,
}

impl Transaction {
    pub(crate) fn new(shared: Arc<TxnShared>) -> Self {
        Self {
            shared,
            write_set: Vec::new(),
            held_locks: Vec::new(),
        }
    }

    /// Returns the transaction ID.
    #[inline]
    pub fn id(&self) -> TxnId {
        self.shared.id()
    }

    /// Returns the begin sequence number. Larger means younger, which is
    /// what victim selection aborts first.
    #[inline]
    pub fn start_seq(&self) -> u64 {
        self.shared.start_seq()
    }

    /// Returns true if the transaction has been marked aborted, either
    /// explicitly or as a deadlock victim.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.shared.is_aborted()
    }

    /// Returns the number of writes buffered.
    #[inline]
    pub fn write_count(&self) -> usize {
        self.write_set.len()
    }

    /// Returns the number of distinct lock slots held.
    #[inline]
    pub fn held_lock_count(&self) -> usize {
        self.held_locks.len()
    }

    /// Returns the most recently buffered value for `key`, if any.
    pub(crate) fn buffered(&self, key: &Key) -> Option<&Value> {
        self.write_set
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Records a held lock slot, at most once.
    pub(crate) fn record_lock(&mut self, slot: usize) {
        if !self.held_locks.contains(&slot) {
            self.held_locks.push(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(slot: usize, seq: u64) -> Transaction {
        Transaction::new(Arc::new(TxnShared::new(TxnId(slot), seq)))
    }

    #[test]
    fn test_new_txn() {
        let t = txn(3, 7);
        assert_eq!(t.id(), TxnId(3));
        assert_eq!(t.start_seq(), 7);
        assert!(!t.is_aborted());
        assert_eq!(t.write_count(), 0);
        assert_eq!(t.held_lock_count(), 0);
    }

    #[test]
    fn test_abort_flag_monotone() {
        let t = txn(0, 1);
        t.shared.mark_aborted();
        assert!(t.is_aborted());
        t.shared.mark_aborted();
        assert!(t.is_aborted());
    }

    #[test]
    fn test_record_lock_dedup() {
        let mut t = txn(0, 1);
        t.record_lock(5);
        t.record_lock(9);
        t.record_lock(5);
        assert_eq!(t.held_locks, vec![5, 9]);
    }

    #[test]
    fn test_buffered_returns_most_recent() {
        let mut t = txn(0, 1);
        t.write_set.push((Key::from("k"), Value::from("old")));
        t.write_set.push((Key::from("other"), Value::from("x")));
        t.write_set.push((Key::from("k"), Value::from("new")));

        assert_eq!(t.buffered(&Key::from("k")), Some(&Value::from("new")));
        assert_eq!(t.buffered(&Key::from("other")), Some(&Value::from("x")));
        assert_eq!(t.buffered(&Key::from("missing")), None);
    }
}
