//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod pricing;
pub mod report;
pub mod scan;

use std::path::{Path, PathBuf};

use warung_core::{ChatClient, HttpOcrClient, ReceiptPipeline, Store, WarungConfig};

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("warung")
        .join("config.json")
}

/// Load configuration: an explicit path, else the default location, else
/// built-in defaults. Environment variables override file values.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<WarungConfig> {
    let mut config = if let Some(path) = config_path {
        WarungConfig::from_file(Path::new(path))?
    } else {
        let path = default_config_path();
        if path.exists() {
            WarungConfig::from_file(&path)?
        } else {
            WarungConfig::default()
        }
    };
    config.apply_env();
    Ok(config)
}

/// Build the full pipeline from a validated configuration.
pub fn build_pipeline(
    config: &WarungConfig,
) -> anyhow::Result<ReceiptPipeline<HttpOcrClient, ChatClient>> {
    let store = Store::open(&config.store.db_path)?;
    Ok(ReceiptPipeline::new(
        HttpOcrClient::new(config.ocr.clone())?,
        ChatClient::new(config.ai.clone())?,
        store,
        config.pricing.clone(),
    ))
}
