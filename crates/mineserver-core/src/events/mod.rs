//! Events published by the server supervisor.
//!
//! Adapters (the terminal console, a future desktop shell) consume these as
//! the sole source of truth for server lifecycle and console output.

mod server;

pub use server::{LogStream, ServerEvent, ServerLogEntry, ServerStatus};
