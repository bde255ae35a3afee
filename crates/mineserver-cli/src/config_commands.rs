//! Settings management subcommands.

use clap::Subcommand;

/// Settings command variants.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show all current server settings
    Show,
    /// Change a single setting
    Set {
        /// Setting name, either `maxPlayers` or `max-players` style
        key: String,
        /// New value
        value: String,
    },
    /// Reset all settings to defaults
    Reset,
    /// Regenerate server.properties from the stored settings
    Apply,
}
