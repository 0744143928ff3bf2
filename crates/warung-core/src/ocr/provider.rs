//! HTTP client for the external OCR provider.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, UpstreamError};
use crate::models::config::OcrProviderConfig;

/// Interface to the external OCR service.
#[allow(async_fn_in_trait)]
pub trait OcrProvider {
    /// Recognize a receipt image. The payload is returned opaquely: decoded
    /// JSON when the body parses, otherwise the body text as a JSON string.
    async fn recognize(&self, image: Vec<u8>, file_name: &str) -> Result<Value>;
}

/// Multipart upload client for the OCR endpoint.
pub struct HttpOcrClient {
    http: reqwest::Client,
    config: OcrProviderConfig,
}

impl HttpOcrClient {
    pub fn new(config: OcrProviderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Ocr {
                message: e.to_string(),
            })?;
        Ok(Self { http, config })
    }
}

impl OcrProvider for HttpOcrClient {
    async fn recognize(&self, image: Vec<u8>, file_name: &str) -> Result<Value> {
        let form = Form::new()
            .part("image", Part::bytes(image).file_name(file_name.to_string()))
            .text("invoice", "false")
            .text("language", "auto");

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpstreamError::Ocr {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| UpstreamError::Ocr {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            // Keep the provider's diagnostic body for logging.
            return Err(UpstreamError::Ocr {
                message: format!("{status}: {body}"),
            }
            .into());
        }

        debug!(bytes = body.len(), "OCR response received");
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}
