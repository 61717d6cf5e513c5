//! IPC listener that accepts commands over a Unix socket.
//!
//! External tools (input replayers, key-bind helpers, scripts) can connect
//! to the socket and send newline-delimited JSON commands.

pub mod listener;
