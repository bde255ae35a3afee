//! Forced termination of server process trees.
//!
//! Provides two entry points:
//! - `kill_tree`: Blocking walk-and-kill of a PID and its descendants
//! - `kill_pid`: Async wrapper that also waits for the tree to disappear
//!
//! Both treat a missing PID as success.

mod pid;
mod tree;

pub use pid::{is_alive, kill_pid, wait_for_exit};
pub use tree::kill_tree;
pub(crate) use tree::refresh_process_table;
