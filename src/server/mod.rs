// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Unix-domain-socket text frontend.
//!
//! Serves a line protocol over a Unix socket, one thread per connection:
//!
//! - `SET <key> <value>` writes a key (the value is the rest of the line,
//!   spaces included) and answers `OK`
//! - `GET <key>` answers the value line or `NOT_FOUND`
//! - anything else answers `ERROR`
//!
//! Every command runs as its own single-operation transaction against the
//! shared engine (autocommit); the protocol deliberately exposes no
//! transaction boundaries.

use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::storage::{Key, Value};
use crate::txn::{Engine, TransactionManager, TxnError};

/// Errors that can occur while serving the frontend.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Binds `socket_path` and serves connections until the listener fails.
///
/// A stale socket file from a previous run is removed before binding.
pub fn serve(engine: Arc<Engine>, socket_path: &Path) -> Result<(), ServerError> {
    match std::fs::remove_file(socket_path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    let listener = UnixListener::bind(socket_path)?;
    info!(path = %socket_path.display(), "kv store server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    if let Err(err) = handle_client(&engine, stream) {
                        warn!(%err, "client connection failed");
                    }
                });
            }
            Err(err) => warn!(%err, "accept failed"),
        }
    }
    Ok(())
}

fn handle_client(engine: &Engine, stream: UnixStream) -> io::Result<()> {
    info!("client connected");
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let line = line?;
        let reply = match execute(engine, line.trim_end()) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(%err, command = %line, "command failed");
                "ERROR".to_string()
            }
        };
        writer.write_all(reply.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    info!("client disconnected");
    Ok(())
}

/// Runs one protocol line as an autocommit transaction.
fn execute(engine: &Engine, line: &str) -> Result<String, TxnError> {
    if let Some(rest) = line.strip_prefix("SET ") {
        if let Some((key, value)) = rest.split_once(' ') {
            if !key.is_empty() && !value.is_empty() {
                let mut txn = engine.begin()?;
                match engine.put(&mut txn, Key::from(key), Value::from(value)) {
                    Ok(()) => {
                        engine.commit(txn)?;
                        return Ok("OK".to_string());
                    }
                    Err(err) => {
                        engine.abort(txn);
                        return Err(err);
                    }
                }
            }
        }
    } else if let Some(rest) = line.strip_prefix("GET ") {
        if let Some(key) = rest.split_whitespace().next() {
            let mut txn = engine.begin()?;
            match engine.get(&mut txn, &Key::from(key)) {
                Ok(value) => {
                    engine.commit(txn)?;
                    return Ok(match value {
                        Some(v) => String::from_utf8_lossy(v.as_bytes()).into_owned(),
                        None => "NOT_FOUND".to_string(),
                    });
                }
                Err(err) => {
                    engine.abort(txn);
                    return Err(err);
                }
            }
        }
    }
    Ok("ERROR".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::txn::EngineConfig;
    use std::time::{Duration, Instant};

    fn test_engine() -> Arc<Engine> {
        Arc::new(Engine::new(EngineConfig::default()))
    }

    #[test]
    fn test_execute_set_then_get() {
        let engine = test_engine();
        assert_eq!(execute(&engine, "SET k hello world").unwrap(), "OK");
        assert_eq!(execute(&engine, "GET k").unwrap(), "hello world");
    }

    #[test]
    fn test_execute_get_missing() {
        let engine = test_engine();
        assert_eq!(execute(&engine, "GET nothing").unwrap(), "NOT_FOUND");
    }

    #[test]
    fn test_execute_malformed() {
        let engine = test_engine();
        assert_eq!(execute(&engine, "DEL k").unwrap(), "ERROR");
        assert_eq!(execute(&engine, "SET k").unwrap(), "ERROR");
        assert_eq!(execute(&engine, "GET ").unwrap(), "ERROR");
        assert_eq!(execute(&engine, "").unwrap(), "ERROR");
    }

    #[test]
    fn test_execute_oversize_key_fails_and_releases_slot() {
        let engine = Arc::new(Engine::new(EngineConfig::default().with_key_length_max(4)));
        assert!(execute(&engine, "SET longkey v").is_err());
        // The failed command's transaction slot must have been freed.
        assert_eq!(execute(&engine, "SET k v").unwrap(), "OK");
    }

    fn connect_with_retry(path: &Path) -> UnixStream {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match UnixStream::connect(path) {
                Ok(stream) => return stream,
                Err(_) if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(err) => panic!("connect failed: {err}"),
            }
        }
    }

    fn read_line(reader: &mut BufReader<UnixStream>) -> String {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        line.trim_end().to_string()
    }

    #[test]
    fn test_socket_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.sock");
        let engine = test_engine();

        {
            let engine = Arc::clone(&engine);
            let path = path.clone();
            thread::spawn(move || {
                let _ = serve(engine, &path);
            });
        }

        let mut stream = connect_with_retry(&path);
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        writeln!(stream, "SET greeting hello world").unwrap();
        assert_eq!(read_line(&mut reader), "OK");

        writeln!(stream, "GET greeting").unwrap();
        assert_eq!(read_line(&mut reader), "hello world");

        writeln!(stream, "GET missing").unwrap();
        assert_eq!(read_line(&mut reader), "NOT_FOUND");

        writeln!(stream, "PING").unwrap();
        assert_eq!(read_line(&mut reader), "ERROR");

        // The frontend writes through the shared engine.
        let mut txn = engine.begin().unwrap();
        assert_eq!(
            engine.get(&mut txn, &Key::from("greeting")).unwrap(),
            Some(Value::from("hello world"))
        );
        engine.abort(txn);
    }
}
