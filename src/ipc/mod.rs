//! Local IPC surface: the line-delimited JSON request server.

pub mod server;
