//! AI-assisted normalization of raw OCR text into a parsed receipt.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::client::{CompletionProvider, CompletionRequest};
use super::json::extract_json_object;
use crate::error::Result;
use crate::models::nota::{ParsedItem, ParsedNota};

const NORMALIZE_MAX_TOKENS: u32 = 1000;
const NORMALIZE_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Deserialize)]
struct NormalizedNota {
    items: Vec<ParsedItem>,
    total: Decimal,
}

fn normalize_prompt(raw_text: &str) -> String {
    format!(
        r#"You are an expert receipt parser. Extract item details from the following raw text from an OCR scan of a receipt.
The text is from an Indonesian receipt.

Raw Text:
"""
{raw_text}
"""

You MUST respond with ONLY a valid JSON object in the following format. Do not include any other text, explanations, or markdown.
The JSON object should contain 'items' (an array of objects with 'name', 'qty', and 'price') and 'total' (a number).
- "name" should be a string.
- "qty" should be a number.
- "price" should be the total price for that line item as a number, not the unit price.
- "total" should be the grand total of the receipt. If not found, calculate it from the sum of item prices.

Example response:
{{
  "items": [
    {{ "name": "PRO MIE INSTAN", "qty": 3, "price": 7500 }},
    {{ "name": "BIMOLI MINYAK", "qty": 1, "price": 25000 }}
  ],
  "total": 32500
}}"#
    )
}

/// Normalize raw OCR text through the completion provider.
///
/// A response missing usable items or a usable total is not an error: the
/// empty result routes the caller to the regex fallback.
pub async fn normalize_ocr_text<C: CompletionProvider>(
    ai: &C,
    raw_text: &str,
) -> Result<ParsedNota> {
    let content = ai
        .complete(CompletionRequest {
            prompt: normalize_prompt(raw_text),
            max_tokens: NORMALIZE_MAX_TOKENS,
            temperature: NORMALIZE_TEMPERATURE,
        })
        .await?;

    match extract_json_object::<NormalizedNota>(&content) {
        Some(parsed) if !parsed.items.is_empty() && !parsed.total.is_zero() => {
            debug!(
                items = parsed.items.len(),
                total = %parsed.total,
                "normalization produced items"
            );
            Ok(ParsedNota {
                items: parsed.items,
                total: parsed.total,
                raw_text: raw_text.to_string(),
            })
        }
        _ => {
            debug!("normalization miss, returning empty result");
            Ok(ParsedNota::empty(raw_text))
        }
    }
}
