//! Parsed receipt ("nota") models and the OCR response DTO.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line item extracted from a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    /// Item name as printed on the receipt.
    pub name: String,

    /// Quantity sold.
    pub qty: u32,

    /// Total price for the line, not the unit price.
    pub price: Decimal,
}

/// A parsed receipt: the output of AI normalization or the table parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedNota {
    pub items: Vec<ParsedItem>,

    /// Grand total. When the receipt carries no explicit total line this is
    /// the sum of the item prices.
    pub total: Decimal,

    /// Raw OCR text the items were parsed from.
    #[serde(default)]
    pub raw_text: String,
}

impl ParsedNota {
    /// The designed "no usable data" result. Not an error: callers route an
    /// empty item list to the fallback parser.
    pub fn empty(raw_text: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            raw_text: raw_text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One item line in the OCR process response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrItem {
    pub name: String,
    pub qty: u32,
    /// Line total.
    pub price: Decimal,
}

/// Advisory summary attached to an OCR response. Best effort: when insight
/// generation fails the summary ships empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Response DTO for one processed receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrProcessResponse {
    pub items: Vec<OcrItem>,
    pub total: Decimal,
    pub profit: Decimal,
    #[serde(default)]
    pub summary: ReceiptSummary,
}
