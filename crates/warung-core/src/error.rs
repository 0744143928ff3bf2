//! Error types for the warung-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the warung library.
#[derive(Error, Debug)]
pub enum WarungError {
    /// Caller-input fault. Never retried.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Upstream provider fault (OCR or completion endpoint).
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Persistence fault.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Faults attributable to the caller's input.
#[derive(Error, Debug)]
pub enum InputError {
    /// The upload was absent or empty. Rejected before any network call.
    #[error("no file provided for OCR")]
    MissingFile,

    /// Neither normalization nor the table parser produced any items.
    #[error("no items found in the receipt")]
    NoItems,

    /// The computed grand total is unusable.
    #[error("invalid total amount in the receipt: {0}")]
    InvalidTotal(Decimal),
}

/// Faults from the external providers. The raw provider diagnostic is
/// preserved in `message` for logging; its format is not stable.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// OCR provider transport or HTTP failure.
    #[error("OCR request failed: {message}")]
    Ocr { message: String },

    /// Completion provider transport or HTTP failure.
    #[error("completion request failed: {message}")]
    Completion { message: String },
}

/// Faults from the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A stored value could not be decoded back into its domain type.
    #[error("invalid stored value for {field}: {value}")]
    Corrupt { field: &'static str, value: String },

    #[error("failed to encode parsed items: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("record not found: {0}")]
    NotFound(String),
}

impl WarungError {
    /// Whether the fault is attributable to the caller (a 4xx-class error
    /// at an HTTP boundary) rather than to this process or an upstream.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, WarungError::Input(_))
    }
}

impl From<rusqlite::Error> for WarungError {
    fn from(err: rusqlite::Error) -> Self {
        WarungError::Store(StoreError::Sqlite(err))
    }
}

/// Result type for the warung library.
pub type Result<T> = std::result::Result<T, WarungError>;
