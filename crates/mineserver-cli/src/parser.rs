//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the dedicated server control panel.
#[derive(Parser)]
#[command(name = "mineserver")]
#[command(about = "Configure, run and monitor a Bedrock dedicated server")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_commands::ConfigCommand;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["mineserver", "--verbose", "run"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Run)));
    }

    #[test]
    fn test_config_set_args() {
        let cli = Cli::parse_from(["mineserver", "config", "set", "max-players", "20"]);
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommand::Set { key, value },
            }) => {
                assert_eq!(key, "max-players");
                assert_eq!(value, "20");
            }
            _ => panic!("expected config set"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["mineserver"]);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }
}
