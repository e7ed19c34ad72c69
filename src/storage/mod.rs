// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! In-memory storage layer.
//!
//! This module provides the key-value map behind the transaction engine: a
//! fixed number of chained buckets under a single mutex, with keys placed by
//! a deterministic FNV-1a hash.
//!
//! The map offers per-call atomicity only. Multi-key atomicity is the
//! transaction layer's job: it holds the per-bucket locks for every touched
//! key across its commit, so the map never needs to coordinate across calls.
//!
//! # Example
//!
//! ```
//! use rubidium_kv::storage::{Key, KvMap, Value};
//!
//! let map = KvMap::new(128);
//! map.replace(Key::from("key"), Value::from("value"));
//! assert_eq!(map.read(&Key::from("key")), Some(Value::from("value")));
//! assert_eq!(map.read(&Key::from("other")), None);
//! ```

mod error;
mod map;

pub use error::StorageError;
pub use map::{bucket_index, fnv1a, Key, KvMap, Value};
