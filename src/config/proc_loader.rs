use std::path::Path;

use anyhow::{bail, Result};
use regex::Regex;
use reqwest::Url;
use tracing::{debug, error};

use crate::config::settings::{ClientConfig, LoggingConfig};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ClientConfig> {
    let content = tokio::fs::read_to_string(path).await?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded)
}

pub fn parse_config(content: String) -> Result<ClientConfig> {
    let mut client_config: ClientConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
        })?;

    // Apply defaults
    if client_config.logging.is_none() {
        client_config.logging = Some(LoggingConfig::default());
    }
    debug!("validation config ...");
    validate_client_config(&client_config)?;

    Ok(client_config)
}

pub fn validate_client_config(config: &ClientConfig) -> Result<()> {
    let url = Url::parse(&config.api.base_url)
        .map_err(|e| anyhow::anyhow!("api.base_url '{}' is not a valid URL: {}", config.api.base_url, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api.base_url must use http or https, got '{}'", url.scheme());
    }
    if config.api.timeout_ms == 0 {
        bail!("api.timeout_ms must be greater than 0");
    }
    Ok(())
}

/// `${VAR}` and `${VAR:default}` placeholders
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
