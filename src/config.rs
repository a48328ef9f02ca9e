use std::path::Path;

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::storage::backends::BackendConfigs;

static CONFIG: OnceCell<RuntimeConfig> = OnceCell::new();

pub fn config() -> &'static RuntimeConfig {
    CONFIG.get().expect("config has not been initialised")
}

pub async fn init(config_file: &Path) -> Result<()> {
    let cfg = load(config_file).await?;
    CONFIG
        .set(cfg)
        .map_err(|_| anyhow!("config has already been initialised"))
}

/// Reads a config file, YAML unless the file ends in `.json`.
pub async fn load(config_file: &Path) -> Result<RuntimeConfig> {
    let file = tokio::fs::read(config_file).await?;
    let is_json = config_file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let cfg: RuntimeConfig = if is_json {
        serde_json::from_slice(&file)?
    } else {
        serde_yaml::from_slice(&file)?
    };

    Ok(cfg)
}

#[derive(Debug, Deserialize)]
pub struct RuntimeConfig {
    /// The blob store images are read from.
    pub backend: BackendConfigs,

    #[serde(default)]
    /// When set, every resized image is also written back to its bucket
    /// under this prefix, e.g. `resized/300x0/q80/path/to/cat.png`.
    ///
    /// Defaults to `None` which disables write-back.
    pub write_back_prefix: Option<String>,
}
