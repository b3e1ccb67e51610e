use std::path::Path;
use anyhow::{anyhow, Result};

use crate::config::proc_loader::{file_to_config, validate_client_config};
use crate::config::settings::ClientConfig;

/// Config file when given, defaults otherwise. Environment overrides win either way.
pub async fn run(config_path: Option<&str>) -> Result<ClientConfig> {
    let mut config = match config_path {
        Some(config_path) => file_to_config(Path::new(config_path))
            .await
            .map_err(|e| anyhow!(format!("Invalid config format: {}", e)))?,
        None => ClientConfig::default(),
    };
    config.api.apply_env();
    validate_client_config(&config)?;
    Ok(config)
}
