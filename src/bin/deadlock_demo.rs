// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Demonstrates online deadlock detection with the classic two-party cycle.
//!
//! T1 reads x then writes y; T2 reads y then writes x. Both hold their first
//! lock while requesting the second, closing a cycle in the wait-for graph.
//! The engine aborts the younger transaction (T2) and T1 commits.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rubidium_kv::storage::{Key, Value};
use rubidium_kv::txn::{Engine, EngineConfig, Transaction, TransactionManager, TxnError};
use tracing_subscriber::EnvFilter;

fn display(value: Option<Value>) -> String {
    value
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_else(|| "(null)".to_string())
}

fn run(engine: &Engine, mut txn: Transaction, name: &str, first: &str, second: &str, value: &str) {
    println!("{name} id={} seq={} begin", txn.id().0, txn.start_seq());

    match engine.get(&mut txn, &Key::from(first)) {
        Ok(v) => println!("{name} read {first}={}", display(v)),
        Err(_) => {
            println!("{name} get {first} failed (aborted?)");
            engine.abort(txn);
            return;
        }
    }

    // Hold the first lock for a moment so both transactions end up blocked
    // on each other's key.
    thread::sleep(Duration::from_secs(1));

    println!("{name} trying to put {second}={value}");
    if engine
        .put(&mut txn, Key::from(second), Value::from(value))
        .is_err()
    {
        println!("{name} put {second} failed (aborted?)");
        engine.abort(txn);
        return;
    }

    match engine.commit(txn) {
        Ok(()) => println!("{name} committed"),
        Err(_) => println!("{name} commit failed (aborted)"),
    }
}

fn main() -> Result<(), TxnError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let engine = Arc::new(Engine::new(EngineConfig::default()));

    let mut seed = engine.begin()?;
    engine.put(&mut seed, Key::from("x"), Value::from("1"))?;
    engine.put(&mut seed, Key::from("y"), Value::from("2"))?;
    engine.commit(seed)?;

    let t1 = engine.begin()?;
    let t2 = engine.begin()?;

    let h1 = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || run(&engine, t1, "T1", "x", "y", "100"))
    };
    thread::sleep(Duration::from_millis(200));
    let h2 = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || run(&engine, t2, "T2", "y", "x", "200"))
    };

    let _ = h1.join();
    let _ = h2.join();

    let mut check = engine.begin()?;
    let x = engine.get(&mut check, &Key::from("x"))?;
    let y = engine.get(&mut check, &Key::from("y"))?;
    println!("Final: x={} y={}", display(x), display(y));
    engine.abort(check);

    Ok(())
}
