//! Pricing recommendations over the recorded sales history.
//!
//! Each item's average line price and sales stats go to the completion
//! provider under a strict-JSON contract; when the provider fails or the
//! response misses the contract, a deterministic markup calculation takes
//! over so the report is always complete.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracing::warn;

use crate::ai::{extract_json_object, CompletionProvider, CompletionRequest};
use crate::error::Result;
use crate::models::report::{PricingRecommendation, TopItem};
use crate::store::Store;

const PRICING_MAX_TOKENS: u32 = 500;
const PRICING_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Deserialize)]
struct AiPricing {
    recommended_price: Decimal,
    reasoning: String,
}

fn round0(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn pricing_prompt(item: &TopItem, current_price: Decimal, target_margin: Decimal) -> String {
    format!(
        r#"You are a pricing expert for Indonesian MSMEs (small businesses/warungs).

Item: {name}
Current Average Price: Rp {current_price}
Sales Data:
- Total Quantity Sold: {total_qty} units
- Total Revenue: Rp {total_revenue}
- Number of Transactions: {frequency}
Target Profit Margin: {target_margin}%

IMPORTANT: You MUST respond with ONLY a valid JSON object, nothing else. No explanations before or after.

Provide a recommended selling price and reasoning in this EXACT JSON format:
{{
  "recommended_price": 15000,
  "reasoning": "Your reasoning here"
}}

Do not include any text before or after the JSON object."#,
        name = item.name,
        total_qty = item.total_qty,
        total_revenue = item.total_revenue,
        frequency = item.frequency,
    )
}

fn fallback_reasoning(
    current_price: Decimal,
    recommended_price: Decimal,
    target_margin: Decimal,
    frequency: u64,
) -> String {
    let percent_change = if current_price.is_zero() {
        Decimal::ZERO
    } else {
        (recommended_price - current_price) / current_price * Decimal::from(100)
    };

    if percent_change.abs() < Decimal::from(5) {
        format!(
            "Your current pricing is optimal for a {target_margin}% profit margin. Sold {frequency} times."
        )
    } else if percent_change > Decimal::ZERO {
        format!(
            "Consider increasing price by {}% to achieve {target_margin}% margin. This item has been sold {frequency} times, indicating good demand.",
            round0(percent_change)
        )
    } else {
        format!(
            "You can reduce price by {}% while maintaining {target_margin}% margin, potentially increasing sales volume. Current sales: {frequency} transactions.",
            round0(percent_change.abs())
        )
    }
}

/// Deterministic recommendation: back the assumed profit share out of the
/// average price to estimate cost, then apply the target margin.
fn fallback_recommendation(
    item: &TopItem,
    current_price: Decimal,
    target_margin: Decimal,
    profit_rate: Decimal,
) -> PricingRecommendation {
    let estimated_cost = current_price / (Decimal::ONE + profit_rate);
    let recommended_price = round0(estimated_cost * (Decimal::ONE + target_margin / Decimal::from(100)));

    PricingRecommendation {
        item_name: item.name.clone(),
        current_price: round0(current_price),
        recommended_price,
        expected_margin: target_margin,
        reasoning: fallback_reasoning(current_price, recommended_price, target_margin, item.frequency),
        frequency: item.frequency,
    }
}

async fn recommend_one<C: CompletionProvider>(
    ai: &C,
    item: &TopItem,
    target_margin: Decimal,
    profit_rate: Decimal,
) -> PricingRecommendation {
    let current_price = if item.frequency > 0 {
        item.total_revenue / Decimal::from(item.frequency)
    } else {
        Decimal::ZERO
    };

    let completion = ai
        .complete(CompletionRequest {
            prompt: pricing_prompt(item, current_price, target_margin),
            max_tokens: PRICING_MAX_TOKENS,
            temperature: PRICING_TEMPERATURE,
        })
        .await;

    match completion {
        Ok(content) => match extract_json_object::<AiPricing>(&content) {
            Some(pricing) => PricingRecommendation {
                item_name: item.name.clone(),
                current_price: round0(current_price),
                recommended_price: round0(pricing.recommended_price),
                expected_margin: target_margin,
                reasoning: pricing.reasoning,
                frequency: item.frequency,
            },
            None => fallback_recommendation(item, current_price, target_margin, profit_rate),
        },
        Err(err) => {
            warn!(item = %item.name, %err, "pricing completion failed, using fallback");
            fallback_recommendation(item, current_price, target_margin, profit_rate)
        }
    }
}

/// Recommend prices for every item with sales history, most-sold first.
pub async fn recommendations<C: CompletionProvider>(
    ai: &C,
    store: &Store,
    user_id: Option<&str>,
    target_margin: Decimal,
    profit_rate: Decimal,
) -> Result<Vec<PricingRecommendation>> {
    let mut items = store.top_items(user_id, None, None, None)?;
    items.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        out.push(recommend_one(ai, item, target_margin, profit_rate).await);
    }
    Ok(out)
}

/// Recommendation for a single item by name (case-insensitive), if it has
/// any sales history.
pub async fn recommendation_for<C: CompletionProvider>(
    ai: &C,
    store: &Store,
    item_name: &str,
    user_id: Option<&str>,
    target_margin: Decimal,
    profit_rate: Decimal,
) -> Result<Option<PricingRecommendation>> {
    let items = store.top_items(user_id, None, None, None)?;
    let Some(item) = items
        .iter()
        .find(|item| item.name.eq_ignore_ascii_case(item_name))
    else {
        return Ok(None);
    };

    Ok(Some(recommend_one(ai, item, target_margin, profit_rate).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use crate::models::nota::{ParsedItem, ParsedNota};
    use crate::store::NewSession;
    use pretty_assertions::assert_eq;

    struct FixedAi(&'static str);

    impl CompletionProvider for FixedAi {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingAi;

    impl CompletionProvider for FailingAi {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            Err(UpstreamError::Completion {
                message: "unavailable".into(),
            }
            .into())
        }
    }

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        for price in [12_000, 12_000] {
            let nota = ParsedNota {
                items: vec![ParsedItem {
                    name: "Kopi".into(),
                    qty: 1,
                    price: Decimal::from(price),
                }],
                total: Decimal::from(price),
                raw_text: "raw".into(),
            };
            store
                .record_session(NewSession {
                    user_id: None,
                    nota: &nota,
                    profit: Decimal::from(price) * Decimal::new(20, 2),
                    profit_margin: Decimal::from(20),
                })
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn ai_recommendation_is_used_when_valid() {
        let store = seeded_store();
        let ai = FixedAi(r#"{"recommended_price": 13500, "reasoning": "Demand supports a raise"}"#);

        let recs = recommendations(&ai, &store, None, Decimal::from(25), Decimal::new(20, 2))
            .await
            .unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_name, "Kopi");
        assert_eq!(recs[0].current_price, Decimal::from(12_000));
        assert_eq!(recs[0].recommended_price, Decimal::from(13_500));
        assert_eq!(recs[0].reasoning, "Demand supports a raise");
        assert_eq!(recs[0].frequency, 2);
    }

    #[tokio::test]
    async fn provider_failure_uses_markup_fallback() {
        let store = seeded_store();

        let recs = recommendations(&FailingAi, &store, None, Decimal::from(25), Decimal::new(20, 2))
            .await
            .unwrap();

        // cost = 12000 / 1.2 = 10000; recommended = 10000 * 1.25 = 12500.
        assert_eq!(recs[0].recommended_price, Decimal::from(12_500));
        assert_eq!(recs[0].expected_margin, Decimal::from(25));
        assert!(recs[0].reasoning.contains("25%"));
    }

    #[tokio::test]
    async fn non_json_answer_uses_fallback() {
        let store = seeded_store();
        let ai = FixedAi("raise the price a bit");

        let recs = recommendations(&ai, &store, None, Decimal::from(25), Decimal::new(20, 2))
            .await
            .unwrap();
        assert_eq!(recs[0].recommended_price, Decimal::from(12_500));
    }

    #[tokio::test]
    async fn lookup_by_name_is_case_insensitive() {
        let store = seeded_store();
        let ai = FixedAi(r#"{"recommended_price": 13000, "reasoning": "ok"}"#);

        let rec = recommendation_for(&ai, &store, "kopi", None, Decimal::from(25), Decimal::new(20, 2))
            .await
            .unwrap();
        assert_eq!(rec.unwrap().recommended_price, Decimal::from(13_000));

        let missing =
            recommendation_for(&ai, &store, "unknown", None, Decimal::from(25), Decimal::new(20, 2))
                .await
                .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn fallback_reasoning_branches() {
        let small = fallback_reasoning(
            Decimal::from(10_000),
            Decimal::from(10_200),
            Decimal::from(25),
            3,
        );
        assert!(small.contains("optimal"));

        let raise = fallback_reasoning(
            Decimal::from(10_000),
            Decimal::from(12_000),
            Decimal::from(25),
            3,
        );
        assert!(raise.contains("increasing price by 20%"));

        let cut = fallback_reasoning(
            Decimal::from(10_000),
            Decimal::from(8_000),
            Decimal::from(25),
            3,
        );
        assert!(cut.contains("reduce price by 20%"));
    }
}
