// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Transaction engine: slot pool, lock acquisition, deadlock resolution and
//! the transaction lifecycle.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::storage::{bucket_index, Key, KvMap, StorageError, Value};

use super::config::EngineConfig;
use super::error::TxnError;
use super::graph::WaitForGraph;
use super::lock::LockTable;
use super::transaction::{Transaction, TxnId, TxnShared};
use super::TransactionManager;

/// Bounded pool of transaction slots.
///
/// A slot index doubles as the transaction's id and its wait-for graph node.
/// The table holds the shared record of every live transaction so the
/// deadlock detector can inspect start sequences and mark victims.
struct SlotTable {
    entries: Vec<Option<Arc<TxnShared>>>,
    next_seq: u64,
}

impl SlotTable {
    fn new(slots: usize) -> Self {
        Self {
            entries: vec![None; slots],
            next_seq: 0,
        }
    }

    /// Allocates a free slot, or `None` when the pool is exhausted.
    fn allocate(&mut self) -> Option<Arc<TxnShared>> {
        let slot = self.entries.iter().position(Option::is_none)?;
        self.next_seq += 1;
        let shared = Arc::new(TxnShared::new(TxnId(slot), self.next_seq));
        self.entries[slot] = Some(Arc::clone(&shared));
        Some(shared)
    }

    /// Frees the slot held by `shared`, if it still is.
    fn free(&mut self, shared: &Arc<TxnShared>) {
        if let Some(entry) = self.entries.get_mut(shared.id().0) {
            if entry.as_ref().is_some_and(|live| Arc::ptr_eq(live, shared)) {
                *entry = None;
            }
        }
    }

    /// Picks the youngest (largest `start_seq`) live transaction among the
    /// given slots. Slots that have been freed since the cycle was observed
    /// are skipped.
    fn youngest_live(&self, slots: &[usize]) -> Option<&Arc<TxnShared>> {
        let mut victim: Option<&Arc<TxnShared>> = None;
        for &slot in slots {
            if let Some(shared) = self.entries.get(slot).and_then(Option::as_ref) {
                if victim.map_or(true, |v| shared.start_seq() > v.start_seq()) {
                    victim = Some(shared);
                }
            }
        }
        victim
    }
}

/// The transaction engine.
///
/// Owns all shared state: the key-value map, the per-bucket lock slots, the
/// wait-for graph and the transaction slot pool. Operations take the engine
/// by shared reference; clone it into threads behind an [`Arc`].
///
/// Mutex order, where several are taken together: a lock slot's mutex before
/// the graph mutex before the slot-table mutex. The graph mutex is never
/// held across a lock-mutex acquisition, and `begin`/slot-free take the
/// slot-table mutex alone.
pub struct Engine {
    config: EngineConfig,
    store: KvMap,
    locks: LockTable,
    graph: Mutex<WaitForGraph>,
    slots: Mutex<SlotTable>,
}

impl Engine {
    /// Creates an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: KvMap::new(config.max_keys),
            locks: LockTable::new(config.max_keys),
            graph: Mutex::new(WaitForGraph::new(config.max_transactions)),
            slots: Mutex::new(SlotTable::new(config.max_transactions)),
            config,
        }
    }

    /// Returns the transaction currently holding the lock for `key`'s
    /// bucket, if any.
    pub fn lock_holder(&self, key: &Key) -> Option<TxnId> {
        self.locks
            .holder_of(bucket_index(key, self.config.max_keys))
    }

    fn check_key(&self, key: &Key) -> Result<(), TxnError> {
        if key.len() > self.config.key_length_max {
            return Err(StorageError::KeyTooLarge {
                size: key.len(),
                max: self.config.key_length_max,
            }
            .into());
        }
        Ok(())
    }

    /// Acquires the exclusive lock for `key`'s bucket on behalf of `txn`.
    ///
    /// Fast path: the slot is free or already ours. Slow path: record a
    /// wait-for edge to the holder, run cycle detection (aborting the
    /// youngest member of any cycle found), then wait on the slot's condvar
    /// with a bounded timeout, rechecking the slot and our own abort flag on
    /// every wake. No wake is guaranteed specifically for victim selection;
    /// the bounded timeout is what lets a victim observe its flag.
    fn acquire(&self, txn: &mut Transaction, key: &Key) -> Result<(), TxnError> {
        if txn.is_aborted() {
            return Err(TxnError::Aborted);
        }

        let me = txn.id();
        let slot = bucket_index(key, self.config.max_keys);
        let lock = self.locks.slot(slot);
        let mut holder = lock.holder.lock();

        let blocker = match *holder {
            Some(h) if h != me => h,
            _ => {
                // Free, or re-entrant acquire by the current holder.
                *holder = Some(me);
                txn.record_lock(slot);
                drop(holder);
                self.graph.lock().clear_outgoing(me.0);
                return Ok(());
            }
        };

        {
            let mut graph = self.graph.lock();
            graph.add_edge(me.0, blocker.0);
            if let Some(cycle) = graph.find_cycle() {
                let slots = self.slots.lock();
                if let Some(victim) = slots.youngest_live(&cycle) {
                    victim.mark_aborted();
                    warn!(
                        victim = victim.id().0,
                        start_seq = victim.start_seq(),
                        "deadlock detected, aborting youngest transaction in cycle"
                    );
                }
                // Edges are not rewritten here; the victim clears its own
                // outgoing edges when it observes the flag.
            }
        }

        loop {
            if txn.is_aborted() {
                break;
            }
            if holder.is_none() {
                *holder = Some(me);
                txn.record_lock(slot);
                self.graph.lock().clear_outgoing(me.0);
                return Ok(());
            }
            lock.cond
                .wait_for(&mut holder, self.config.wait_poll_interval);
        }

        self.graph.lock().clear_outgoing(me.0);
        Err(TxnError::Aborted)
    }

    /// Releases every lock held by `txn` and wakes their waiters.
    fn release_all(&self, txn: &mut Transaction) {
        let me = txn.id();
        for slot in txn.held_locks.drain(..) {
            let lock = self.locks.slot(slot);
            let mut holder = lock.holder.lock();
            if *holder == Some(me) {
                *holder = None;
            }
            self.graph.lock().remove_incoming(me.0);
            lock.cond.notify_all();
        }
    }

    fn free_slot(&self, txn: &Transaction) {
        self.slots.lock().free(&txn.shared);
    }
}

impl TransactionManager for Engine {
    fn begin(&self) -> Result<Transaction, TxnError> {
        let shared = self.slots.lock().allocate().ok_or(TxnError::NoSlot)?;
        Ok(Transaction::new(shared))
    }

    fn get(&self, txn: &mut Transaction, key: &Key) -> Result<Option<Value>, TxnError> {
        if txn.is_aborted() {
            return Err(TxnError::Aborted);
        }
        self.check_key(key)?;

        // Read-your-own-writes. No lock is taken: the put that buffered this
        // value acquired the bucket lock and it is only released at
        // commit/abort, so the buffered value cannot be stale.
        if let Some(value) = txn.buffered(key) {
            return Ok(Some(value.clone()));
        }

        self.acquire(txn, key)?;
        Ok(self.store.read(key))
    }

    fn put(&self, txn: &mut Transaction, key: Key, value: Value) -> Result<(), TxnError> {
        if txn.is_aborted() {
            return Err(TxnError::Aborted);
        }
        self.check_key(&key)?;
        self.acquire(txn, &key)?;

        if txn.write_set.len() >= self.config.max_writes_per_txn {
            return Err(TxnError::WriteSetFull);
        }
        txn.write_set.push((key, value));
        Ok(())
    }

    fn commit(&self, mut txn: Transaction) -> Result<(), TxnError> {
        if txn.is_aborted() {
            self.release_all(&mut txn);
            self.free_slot(&txn);
            return Err(TxnError::Aborted);
        }

        // Every touched key is still exclusively locked, so applying the
        // buffered writes in order is atomic with respect to other
        // transactions.
        for (key, value) in std::mem::take(&mut txn.write_set) {
            self.store.replace(key, value);
        }

        self.graph.lock().clear_outgoing(txn.id().0);
        self.release_all(&mut txn);
        self.free_slot(&txn);
        Ok(())
    }

    fn abort(&self, mut txn: Transaction) {
        txn.shared.mark_aborted();
        self.graph.lock().clear_outgoing(txn.id().0);
        self.release_all(&mut txn);
        self.free_slot(&txn);
    }
}

#[cfg(test)]
impl Engine {
    /// True if no wait-for edge touches the slot.
    pub(crate) fn slot_quiescent(&self, slot: usize) -> bool {
        !self.graph.lock().touches(slot)
    }
}
