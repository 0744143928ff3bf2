//! Core library for warung receipt processing.
//!
//! This crate provides:
//! - OCR provider integration (multipart upload, opaque payload decoding)
//! - Receipt ("nota") parsing: AI-assisted normalization with a
//!   deterministic regex table parser as the fallback
//! - Persisted session/item/sale records with sales analytics
//! - Pricing recommendations over the recorded sales history

pub mod ai;
pub mod error;
pub mod models;
pub mod nota;
pub mod ocr;
pub mod pricing;
pub mod store;

pub use ai::{ChatClient, CompletionProvider, CompletionRequest};
pub use error::{InputError, Result, StoreError, UpstreamError, WarungError};
pub use models::config::WarungConfig;
pub use models::nota::{OcrItem, OcrProcessResponse, ParsedItem, ParsedNota, ReceiptSummary};
pub use models::record::{ItemRecord, SaleRecord, SessionRecord};
pub use models::report::{PricingRecommendation, RecentSale, SalesSummary, TopItem};
pub use nota::{extract_text, parse_nota, RawOcrResult};
pub use ocr::{HttpOcrClient, OcrProvider, ReceiptPipeline, ReceiptUpload};
pub use store::Store;
