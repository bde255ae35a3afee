//! Paths command handler.
//!
//! Displays all resolved paths for diagnostics and debugging.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the paths command.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let config = &ctx.config;
    println!("data_root = {}", config.data_root.display());
    println!("server_dir = {}", config.server_dir.display());
    println!("server_executable = {}", config.executable.display());
    println!("settings_file = {}", config.settings_path.display());
    println!("properties_file = {}", ctx.store.properties_path().display());
    println!("installed = {}", ctx.is_installed());
    Ok(())
}
