// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the transaction engine.

use std::time::Duration;

/// Configuration for [`Engine`](super::Engine) construction.
///
/// All capacities are fixed at engine construction; they are configuration,
/// not API. The defaults match the sizing the engine was designed around:
/// tens of concurrent transactions over a small, hot key space.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of transaction slots. Also the node count of the wait-for
    /// graph; the dense matrix stays cheap while this is in the tens.
    pub max_transactions: usize,
    /// Number of lock/bucket slots. Keys hash into this space; two keys that
    /// share a bucket share one lock (safe over-locking).
    pub max_keys: usize,
    /// Bound on key byte length.
    pub key_length_max: usize,
    /// Write-set capacity per transaction.
    pub max_writes_per_txn: usize,
    /// Bounded wake period for blocked lock waiters. A deadlock victim
    /// observes its abort flag within one interval, so this bounds
    /// resolution latency.
    pub wait_poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_transactions: 32,
            max_keys: 128,
            key_length_max: 64,
            max_writes_per_txn: 64,
            wait_poll_interval: Duration::from_millis(200),
        }
    }
}

impl EngineConfig {
    /// Sets the number of transaction slots.
    pub fn with_max_transactions(mut self, n: usize) -> Self {
        self.max_transactions = n;
        self
    }

    /// Sets the number of lock/bucket slots.
    pub fn with_max_keys(mut self, n: usize) -> Self {
        self.max_keys = n;
        self
    }

    /// Sets the bound on key byte length.
    pub fn with_key_length_max(mut self, n: usize) -> Self {
        self.key_length_max = n;
        self
    }

    /// Sets the write-set capacity per transaction.
    pub fn with_max_writes_per_txn(mut self, n: usize) -> Self {
        self.max_writes_per_txn = n;
        self
    }

    /// Sets the bounded wake period for blocked lock waiters.
    pub fn with_wait_poll_interval(mut self, interval: Duration) -> Self {
        self.wait_poll_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_transactions, 32);
        assert_eq!(config.max_keys, 128);
        assert_eq!(config.key_length_max, 64);
        assert_eq!(config.max_writes_per_txn, 64);
        assert_eq!(config.wait_poll_interval, Duration::from_millis(200));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_max_transactions(8)
            .with_max_keys(16)
            .with_key_length_max(32)
            .with_max_writes_per_txn(4)
            .with_wait_poll_interval(Duration::from_millis(50));

        assert_eq!(config.max_transactions, 8);
        assert_eq!(config.max_keys, 16);
        assert_eq!(config.key_length_max, 32);
        assert_eq!(config.max_writes_per_txn, 4);
        assert_eq!(config.wait_poll_interval, Duration::from_millis(50));
    }
}
