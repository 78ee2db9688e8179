use std::path::Path;

use eyre::{Context as _, Result};
use tracing::{info, instrument};
use zkbridge_core::schema::BridgeConfig;

use super::files::{read_json, write_json};

/// Load and validate a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, the locker script is empty or
/// too long to hash, or the destination chain id is zero.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_config(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let config: BridgeConfig = read_json(path.as_ref()).await?;
    eyre::ensure!(
        !config.locker_script.is_empty(),
        "Locker script must not be empty"
    );
    eyre::ensure!(
        config.destination_chain_id != 0,
        "Destination chain id must be non-zero"
    );
    let locker_hash = config
        .locker_script_hash()
        .context("Invalid locker script")?;
    info!(
        destination_chain_id = config.destination_chain_id,
        locker_script_hash = %locker_hash,
        "Loaded configuration"
    );
    Ok(config)
}

/// Write a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub async fn export_config(config: &BridgeConfig, destination: impl AsRef<Path>) -> Result<()> {
    write_json(destination.as_ref(), config).await?;
    info!(file = %destination.as_ref().display(), "Exported configuration");
    Ok(())
}

/// JSON schema of the configuration file.
///
/// # Errors
/// Returns an error if the schema cannot be serialized.
pub fn config_schema() -> Result<String> {
    let schema = schemars::schema_for!(BridgeConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
