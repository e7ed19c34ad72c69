// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Per-bucket exclusive lock slots.
//!
//! One lock slot per key bucket, sharing the bucket index space with the
//! storage map. A slot is an exclusive lock: at most one holder, re-entrant
//! for that holder. The acquire/wait protocol lives in the engine; this
//! module only provides the slots themselves.

use parking_lot::{Condvar, Mutex};

use super::TxnId;

/// One exclusive lock slot.
pub(crate) struct KeyLock {
    /// Current holder, or `None` if free.
    pub(crate) holder: Mutex<Option<TxnId>>,
    /// Wakes waiters when the holder releases. Waiters use bounded waits so
    /// they also observe their own abort flag without a targeted wake.
    pub(crate) cond: Condvar,
}

impl KeyLock {
    fn new() -> Self {
        Self {
            holder: Mutex::new(None),
            cond: Condvar::new(),
        }
    }
}

/// The fixed pool of lock slots, indexed by key bucket.
pub(crate) struct LockTable {
    slots: Box<[KeyLock]>,
}

impl LockTable {
    pub(crate) fn new(slots: usize) -> Self {
        Self {
            slots: (0..slots).map(|_| KeyLock::new()).collect(),
        }
    }

    #[inline]
    pub(crate) fn slot(&self, idx: usize) -> &KeyLock {
        &self.slots[idx]
    }

    /// Returns the current holder of a slot, if any.
    pub(crate) fn holder_of(&self, idx: usize) -> Option<TxnId> {
        *self.slots[idx].holder.lock()
    }
}
