// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Unix-socket frontend for the KV store.
//!
//! Usage:
//!   ./kvstore_server [socket-path]
//!
//! Defaults to /tmp/kvstore.sock. Serves the SET/GET line protocol until
//! killed; log verbosity follows RUST_LOG.

use std::path::PathBuf;
use std::sync::Arc;

use rubidium_kv::server::{serve, ServerError};
use rubidium_kv::{Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let socket_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp/kvstore.sock"));

    let engine = Arc::new(Engine::new(EngineConfig::default()));
    serve(engine, &socket_path)
}
