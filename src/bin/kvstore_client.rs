// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Interactive client for the KV store server.
//!
//! Usage:
//!   ./kvstore_client [socket-path]
//!
//! Reads commands from stdin (SET key value / GET key / EXIT) and prints one
//! server response per command.

use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;

fn main() -> io::Result<()> {
    let socket_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/kvstore.sock".to_string());

    let stream = UnixStream::connect(&socket_path)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    println!("Connected to KV store server at {socket_path}");
    println!("Type commands (SET key value / GET key / EXIT)");
    println!();

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = line.trim();
        if command.eq_ignore_ascii_case("EXIT") {
            println!("Closing connection.");
            break;
        }
        if command.is_empty() {
            continue;
        }

        writer.write_all(command.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        let mut response = String::new();
        if reader.read_line(&mut response)? == 0 {
            println!("[server closed connection]");
            break;
        }
        print!("[server] {response}");
    }

    Ok(())
}
