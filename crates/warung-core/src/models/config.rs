//! Configuration structures for the warung pipeline.
//!
//! Provider credentials and endpoints are plain required fields: components
//! take their section by value at construction time and `validate` runs at
//! process startup, so a missing key fails the process before any request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, WarungError};

/// Main configuration for the warung pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WarungConfig {
    /// OCR provider configuration.
    pub ocr: OcrProviderConfig,

    /// Chat-completion provider configuration.
    pub ai: AiProviderConfig,

    /// Persistence configuration.
    pub store: StoreConfig,

    /// Profit and pricing assumptions.
    pub pricing: PricingConfig,
}

/// External OCR provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrProviderConfig {
    /// Endpoint receiving the multipart receipt upload.
    pub api_url: String,

    /// Bearer token. Required; empty fails validation.
    pub api_key: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OcrProviderConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.kolosal.ai/ocr/form".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Chat-completion provider (OpenAI-compatible wire format).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiProviderConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    /// Bearer token. Required; empty fails validation.
    pub api_key: String,

    /// Model identifier.
    pub model: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AiProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: "qwen/qwen3-vl-30b-a3b-instruct".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path.
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("warung.db"),
        }
    }
}

/// Profit and pricing assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Assumed profit share of a sale's total. A business placeholder, not
    /// derived from cost data; override per deployment.
    pub profit_rate: Decimal,

    /// Default target margin percentage for pricing recommendations.
    pub target_margin: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            profit_rate: Decimal::new(20, 2),
            target_margin: Decimal::from(25),
        }
    }
}

impl WarungConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Overlay provider credentials from the environment. `KOLOSAL_API_KEY`
    /// feeds both providers (they share an account), `KOLOSAL_BASE_URL` the
    /// completion endpoint, `WARUNG_DB` the database path.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("KOLOSAL_API_KEY") {
            self.ocr.api_key = key.clone();
            self.ai.api_key = key;
        }
        if let Ok(url) = std::env::var("KOLOSAL_BASE_URL") {
            self.ai.base_url = url;
        }
        if let Ok(path) = std::env::var("WARUNG_DB") {
            self.store.db_path = PathBuf::from(path);
        }
    }

    /// Validate at startup. Rejects missing credentials/endpoints and
    /// out-of-range assumptions before any component is constructed.
    pub fn validate(&self) -> Result<()> {
        if self.ocr.api_url.is_empty() {
            return Err(WarungError::Config("ocr.api_url is not configured".into()));
        }
        if self.ocr.api_key.is_empty() {
            return Err(WarungError::Config("ocr.api_key is not configured".into()));
        }
        if self.ocr.timeout_secs == 0 {
            return Err(WarungError::Config("ocr.timeout_secs must be positive".into()));
        }
        if self.ai.base_url.is_empty() {
            return Err(WarungError::Config("ai.base_url is not configured".into()));
        }
        if self.ai.api_key.is_empty() {
            return Err(WarungError::Config("ai.api_key is not configured".into()));
        }
        if self.ai.model.is_empty() {
            return Err(WarungError::Config("ai.model is not configured".into()));
        }
        if self.ai.timeout_secs == 0 {
            return Err(WarungError::Config("ai.timeout_secs must be positive".into()));
        }
        if self.pricing.profit_rate <= Decimal::ZERO || self.pricing.profit_rate >= Decimal::ONE {
            return Err(WarungError::Config(
                "pricing.profit_rate must be between 0 and 1".into(),
            ));
        }
        if self.pricing.target_margin <= Decimal::ZERO {
            return Err(WarungError::Config(
                "pricing.target_margin must be positive".into(),
            ));
        }
        Ok(())
    }
}
