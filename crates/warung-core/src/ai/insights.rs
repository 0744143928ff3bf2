//! Advisory insight generation over parsed receipts and sales history.
//!
//! Everything here is best effort: callers log and swallow failures rather
//! than failing the request that triggered them.

use serde::Deserialize;

use super::client::{CompletionProvider, CompletionRequest};
use super::json::extract_json_object;
use crate::error::Result;
use crate::models::nota::{ParsedItem, ReceiptSummary};
use crate::models::report::{SalesSummary, TopItem};

const RECEIPT_MAX_TOKENS: u32 = 800;
const RECEIPT_TEMPERATURE: f32 = 0.7;

const MARKET_MAX_TOKENS: u32 = 1000;
const MARKET_TEMPERATURE: f32 = 0.7;

/// Fallback cap when the model ignores the JSON contract and answers in
/// prose: the first 500 characters become the insight text.
const PROSE_INSIGHT_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
struct ReceiptAnalysis {
    insights: String,
    #[serde(default)]
    suggestions: Vec<String>,
}

fn receipt_prompt(raw_text: &str, items: &[ParsedItem]) -> String {
    let listing = items
        .iter()
        .map(|item| format!("- {}: {}x @ Rp {}", item.name, item.qty, item.price))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an AI assistant for Indonesian warung (small shop) owners.

Analyze this receipt:
Raw Text: {raw_text}

Parsed Items:
{listing}

IMPORTANT: You MUST respond with ONLY a valid JSON object, nothing else.

Provide business insights and suggestions in this EXACT JSON format:
{{
  "insights": "Your insights here",
  "suggestions": ["suggestion 1", "suggestion 2", "suggestion 3"]
}}

Do not include any text before or after the JSON object."#
    )
}

/// Generate advisory insights for one parsed receipt.
pub async fn analyze_receipt<C: CompletionProvider>(
    ai: &C,
    raw_text: &str,
    items: &[ParsedItem],
) -> Result<ReceiptSummary> {
    let content = ai
        .complete(CompletionRequest {
            prompt: receipt_prompt(raw_text, items),
            max_tokens: RECEIPT_MAX_TOKENS,
            temperature: RECEIPT_TEMPERATURE,
        })
        .await?;

    match extract_json_object::<ReceiptAnalysis>(&content) {
        Some(analysis) => Ok(ReceiptSummary {
            insights: Some(analysis.insights),
            suggestions: analysis.suggestions,
        }),
        None => Ok(ReceiptSummary {
            insights: Some(content.chars().take(PROSE_INSIGHT_LIMIT).collect()),
            suggestions: Vec::new(),
        }),
    }
}

fn market_prompt(summary: &SalesSummary, top_items: &[TopItem]) -> String {
    let listing = top_items
        .iter()
        .take(5)
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. {} - {} units, Rp {} revenue, {} transactions",
                i + 1,
                item.name,
                item.total_qty,
                item.total_revenue,
                item.frequency
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a business analyst for Indonesian MSMEs.

Sales Summary:
- Total Sales: Rp {total_sales}
- Total Profit: Rp {total_profit}
- Average Profit Margin: {avg_margin}%
- Total Transactions: {transactions}

Top Selling Items:
{listing}

Provide comprehensive market insights and strategic recommendations for this warung owner in Indonesian context. Focus on:
1. Sales performance analysis
2. Product mix optimization
3. Pricing strategy
4. Growth opportunities

Keep it concise and actionable (max 300 words)."#,
        total_sales = summary.total_sales,
        total_profit = summary.total_profit,
        avg_margin = summary.avg_profit_margin,
        transactions = summary.transaction_count,
    )
}

/// Free-text market insights over the recorded sales history. No JSON
/// contract: the completion text is the result.
pub async fn market_insights<C: CompletionProvider>(
    ai: &C,
    summary: &SalesSummary,
    top_items: &[TopItem],
) -> Result<String> {
    ai.complete(CompletionRequest {
        prompt: market_prompt(summary, top_items),
        max_tokens: MARKET_MAX_TOKENS,
        temperature: MARKET_TEMPERATURE,
    })
    .await
}
