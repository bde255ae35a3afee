//! Process management infrastructure for the dedicated server.
//!
//! # Structure
//!
//! - `ManagedProcess` - Handle to one spawned server with piped stdio
//! - `ProcessEvent` - Typed output/exit feed produced by a handle
//! - `EventRelay` - Fan-out of lifecycle and console events to observers
//! - `shutdown` - Tree termination by PID, with or without a handle

mod broadcaster;
mod events;
mod handle;
pub mod shutdown;
mod stream;

pub use broadcaster::{EventRelay, MAX_LOG_LINES};
pub use events::{ProcessEvent, ProcessExit};
pub use handle::{HandleError, ManagedProcess, ProcessEvents};
pub(crate) use stream::spawn_stream_reader;
