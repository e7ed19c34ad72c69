// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Storage error types.

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("key too large: {size} > {max}")]
    KeyTooLarge { size: usize, max: usize },
}
