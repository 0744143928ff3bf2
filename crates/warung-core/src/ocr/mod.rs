//! OCR provider integration and the receipt processing pipeline.

mod pipeline;
mod provider;

pub use pipeline::ReceiptPipeline;
pub use provider::{HttpOcrClient, OcrProvider};

/// An uploaded receipt image.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl ReceiptUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
