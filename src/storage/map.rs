// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! In-memory key-value map with chained buckets.
//!
//! Keys hash into a fixed bucket space with FNV-1a; the same index addresses
//! the per-bucket lock slots in the transaction layer, so two keys that share
//! a bucket also share a lock. The map itself guarantees per-call atomicity
//! only; cross-key atomicity comes from the transaction layer holding locks
//! across its commit.

use parking_lot::Mutex;

/// A key in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(pub Vec<u8>);

impl Key {
    /// Creates a new key from bytes.
    #[inline]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the key.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for Key {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A value in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value(pub Vec<u8>);

impl Value {
    /// Creates a new value from bytes.
    #[inline]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the value bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the value.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the value is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// FNV-1a over the key bytes.
///
/// The hash must be deterministic across calls so that the same key always
/// lands on the same lock slot and map bucket.
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

/// Maps a key onto one of `buckets` slots.
#[inline]
pub fn bucket_index(key: &Key, buckets: usize) -> usize {
    fnv1a(key.as_bytes()) as usize % buckets
}

/// Associative key -> value container with chained buckets.
///
/// Single-key `read` and `replace` are atomic under one mutex; neither can
/// fail. There is no deletion: absence is distinguished from an empty value
/// at read time.
#[derive(Debug)]
pub struct KvMap {
    buckets: Mutex<Vec<Vec<(Key, Value)>>>,
}

impl KvMap {
    /// Creates an empty map with the given bucket count.
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets: Mutex::new(vec![Vec::new(); buckets]),
        }
    }

    /// Atomically returns a copy of the current value, if present.
    pub fn read(&self, key: &Key) -> Option<Value> {
        let buckets = self.buckets.lock();
        let chain = &buckets[bucket_index(key, buckets.len())];
        chain
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Atomically creates or overwrites the value for `key`.
    pub fn replace(&self, key: Key, value: Value) {
        let mut buckets = self.buckets.lock();
        let idx = bucket_index(&key, buckets.len());
        let chain = &mut buckets[idx];
        match chain.iter_mut().find(|(k, _)| k == &key) {
            Some((_, existing)) => *existing = value,
            None => chain.push((key, value)),
        }
    }
}
