//! Cleanup command handler.

use anyhow::Result;
use mineserver_core::ServerStatus;

use crate::bootstrap::CliContext;

/// Reconcile the process table: any server instance left behind by an
/// earlier session is killed.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    match ctx.supervisor.status().await {
        ServerStatus::Stopped => println!("✓ No server process is running."),
        ServerStatus::Running => println!("Server is running."),
    }
    Ok(())
}
