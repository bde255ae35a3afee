//! Config command handler.

use anyhow::Result;
use mineserver_core::{ConfigStore, ServerSettings};

use crate::bootstrap::CliContext;
use crate::config_commands::ConfigCommand;
use crate::error::CliError;

/// Execute the config command.
pub async fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    let store = &ctx.store;
    match command {
        ConfigCommand::Show => {
            let settings = store.load().await.map_err(CliError::from)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigCommand::Set { key, value } => {
            set_value(store, &key, &value).await?;
            println!("✓ {key} set to {value}");
        }
        ConfigCommand::Reset => {
            store
                .save(&ServerSettings::default())
                .await
                .map_err(CliError::from)?;
            println!("✓ Settings reset to defaults.");
        }
        ConfigCommand::Apply => {
            let settings = store.load().await.map_err(CliError::from)?;
            store.save(&settings).await.map_err(CliError::from)?;
            println!("✓ Wrote {}", store.properties_path().display());
        }
    }
    Ok(())
}

/// Load, change one field and save.
async fn set_value(
    store: &dyn ConfigStore,
    key: &str,
    value: &str,
) -> Result<ServerSettings, CliError> {
    let mut settings = store.load().await?;
    settings.apply_override(key, value)?;
    store.save(&settings).await?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mineserver_runtime::JsonConfigStore;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonConfigStore {
        JsonConfigStore::new(
            dir.path().join("server-config.json"),
            dir.path().join("bedrock-server"),
        )
    }

    #[tokio::test]
    async fn test_set_value_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let updated = set_value(&store, "max-players", "20").await.unwrap();
        assert_eq!(updated.max_players, 20);

        assert_eq!(store.load().await.unwrap().max_players, 20);
        let properties = std::fs::read_to_string(store.properties_path()).unwrap();
        assert!(properties.contains("max-players=20"));
    }

    #[tokio::test]
    async fn test_set_value_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = set_value(&store, "max-players", "lots").await.unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = set_value(&store, "no-such-setting", "1").await.unwrap_err();
        assert_eq!(err.exit_code(), 2);

        assert_eq!(store.load().await.unwrap(), ServerSettings::default());
    }
}
