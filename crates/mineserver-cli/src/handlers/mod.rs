//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that parse CLI input, call the store or supervisor and
//!   format output for the terminal

pub mod cleanup;
pub mod config;
pub mod paths;
pub mod run;
