//! Top-level subcommands.

use clap::Subcommand;

use crate::config_commands::ConfigCommand;

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved paths and whether the server is installed
    Paths,
    /// View or change the server settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Start the server and attach an interactive console
    Run,
    /// Kill leftover server processes from a previous session
    Cleanup,
}
