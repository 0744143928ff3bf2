//! The receipt processing pipeline: recognize, parse, price, persist.

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::provider::OcrProvider;
use super::ReceiptUpload;
use crate::ai::{insights, normalizer, CompletionProvider};
use crate::error::{InputError, Result};
use crate::models::config::PricingConfig;
use crate::models::nota::{OcrItem, OcrProcessResponse, ParsedNota, ReceiptSummary};
use crate::nota;
use crate::store::{NewSession, Store};

/// One-pass pipeline over a single uploaded receipt. Requests are
/// independent: each run produces exactly one session or one error.
pub struct ReceiptPipeline<O, C> {
    ocr: O,
    ai: C,
    store: Store,
    pricing: PricingConfig,
}

impl<O: OcrProvider, C: CompletionProvider> ReceiptPipeline<O, C> {
    pub fn new(ocr: O, ai: C, store: Store, pricing: PricingConfig) -> Self {
        Self {
            ocr,
            ai,
            store,
            pricing,
        }
    }

    /// Process one uploaded receipt image end to end.
    pub async fn process(
        &self,
        upload: ReceiptUpload,
        user_id: Option<&str>,
    ) -> Result<OcrProcessResponse> {
        // Input checks come before any network round-trip.
        if upload.is_empty() {
            return Err(InputError::MissingFile.into());
        }

        let payload = self.ocr.recognize(upload.bytes, &upload.file_name).await?;
        let raw_text = nota::extract_text(&payload);

        let parsed = self.normalize_or_parse(&raw_text).await;

        if parsed.items.is_empty() {
            return Err(InputError::NoItems.into());
        }
        if parsed.total <= Decimal::ZERO {
            return Err(InputError::InvalidTotal(parsed.total).into());
        }

        let profit = parsed.total * self.pricing.profit_rate;
        let profit_margin = profit / parsed.total * Decimal::from(100);

        let session = self.store.record_session(NewSession {
            user_id: user_id.map(str::to_string),
            nota: &parsed,
            profit,
            profit_margin,
        })?;

        info!(
            session = %session.id,
            items = session.items.len(),
            total = %session.sale.total_amount,
            "receipt recorded"
        );

        // Advisory only: a failed insight call must not fail the request.
        let summary = match insights::analyze_receipt(&self.ai, &parsed.raw_text, &parsed.items)
            .await
        {
            Ok(summary) => summary,
            Err(err) => {
                warn!(%err, "insight generation failed, omitting summary");
                ReceiptSummary::default()
            }
        };

        Ok(OcrProcessResponse {
            items: parsed
                .items
                .iter()
                .map(|item| OcrItem {
                    name: item.name.clone(),
                    qty: item.qty,
                    price: item.price,
                })
                .collect(),
            total: session.sale.total_amount,
            profit: session.sale.profit,
            summary,
        })
    }

    /// AI normalization first; any error or an empty item set routes to the
    /// deterministic table parser.
    async fn normalize_or_parse(&self, raw_text: &str) -> ParsedNota {
        match normalizer::normalize_ocr_text(&self.ai, raw_text).await {
            Ok(parsed) if !parsed.is_empty() => parsed,
            Ok(_) => {
                info!("normalization returned no items, falling back to table parser");
                nota::parse_nota(raw_text)
            }
            Err(err) => {
                warn!(%err, "normalization failed, falling back to table parser");
                nota::parse_nota(raw_text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::CompletionRequest;
    use crate::error::{UpstreamError, WarungError};
    use crate::models::config::PricingConfig;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    const TABLE_TEXT: &str = "\
| 1 | Kopi Item | 2 pcs | 5.000/pcs | Rp10.000 |
| 2 | Roti | 1 pcs | 8.000/pcs | Rp8.000 |
Jumlah Total: Rp18.000";

    struct FixedOcr(Value);

    impl OcrProvider for FixedOcr {
        async fn recognize(&self, _image: Vec<u8>, _file_name: &str) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    struct PanickingOcr;

    impl OcrProvider for PanickingOcr {
        async fn recognize(&self, _image: Vec<u8>, _file_name: &str) -> Result<Value> {
            unreachable!("OCR must not be called for an empty upload");
        }
    }

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

    fn pipeline<O: OcrProvider, C: CompletionProvider>(ocr: O, ai: C) -> ReceiptPipeline<O, C> {
        ReceiptPipeline::new(ocr, ai, Store::open_in_memory().unwrap(), PricingConfig::default())
    }

    fn upload() -> ReceiptUpload {
        ReceiptUpload::new(vec![0xFF, 0xD8, 0xFF], "nota.jpg")
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_before_any_call() {
        let pipeline = pipeline(PanickingOcr, FailingAi);
        let err = pipeline
            .process(ReceiptUpload::new(Vec::new(), "nota.jpg"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WarungError::Input(InputError::MissingFile)
        ));
    }

    #[tokio::test]
    async fn regex_fallback_end_to_end() {
        // The AI path fails outright, so the table parser carries the request.
        let pipeline = pipeline(
            FixedOcr(json!({"extracted_text": TABLE_TEXT})),
            FailingAi,
        );

        let response = pipeline.process(upload(), Some("user-1")).await.unwrap();

        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].name, "Kopi Item");
        assert_eq!(response.items[0].qty, 2);
        assert_eq!(response.items[0].price, Decimal::from(10_000));
        assert_eq!(response.items[1].name, "Roti");
        assert_eq!(response.total, Decimal::from(18_000));
        assert_eq!(response.profit, Decimal::from(3_600));
        // The failed insight call is swallowed.
        assert_eq!(response.summary, ReceiptSummary::default());
    }

    #[tokio::test]
    async fn recorded_sale_carries_profit_margin() {
        let pipeline = pipeline(
            FixedOcr(json!({"extracted_text": TABLE_TEXT})),
            FailingAi,
        );
        pipeline.process(upload(), Some("user-1")).await.unwrap();

        let recent = pipeline.store.recent_sales(Some("user-1"), None).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].total_amount, Decimal::from(18_000));
        assert_eq!(recent[0].profit, Decimal::from(3_600));

        let summary = pipeline.store.sales_summary(Some("user-1"), None, None).unwrap();
        assert_eq!(summary.avg_profit_margin, Decimal::from(20));
    }

    #[tokio::test]
    async fn empty_normalization_falls_back_to_regex() {
        let pipeline = pipeline(
            FixedOcr(json!({"data": {"text": TABLE_TEXT}})),
            FixedAi(r#"{"items": [], "total": 0}"#),
        );

        let response = pipeline.process(upload(), None).await.unwrap();
        assert_eq!(response.total, Decimal::from(18_000));
    }

    #[tokio::test]
    async fn normalized_items_win_over_regex() {
        let pipeline = pipeline(
            FixedOcr(json!({"text": "free-form receipt text"})),
            FixedAi(r#"{"items": [{"name": "Sewa Kursi", "qty": 1, "price": 8000}], "total": 8000}"#),
        );

        let response = pipeline.process(upload(), None).await.unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].name, "Sewa Kursi");
        assert_eq!(response.total, Decimal::from(8_000));
    }

    #[tokio::test]
    async fn sum_fallback_when_no_total_line() {
        let text = "\
| 1 | Teh | 1 pcs | 5.000/pcs | Rp5.000 |
| 2 | Gula | 1 pcs | 3.000/pcs | Rp3.000 |";
        let pipeline = pipeline(FixedOcr(json!({"extracted_text": text})), FailingAi);

        let response = pipeline.process(upload(), None).await.unwrap();
        assert_eq!(response.total, Decimal::from(8_000));
    }

    #[tokio::test]
    async fn unparseable_text_is_rejected_as_no_items() {
        let pipeline = pipeline(
            FixedOcr(json!({"extracted_text": "nothing that looks like a table"})),
            FailingAi,
        );

        let err = pipeline.process(upload(), None).await.unwrap_err();
        assert!(matches!(err, WarungError::Input(InputError::NoItems)));
    }

    #[tokio::test]
    async fn zero_total_is_rejected_even_with_items() {
        let text = "| 1 | Gratis | 1 pcs | 0/pcs | Rp0 |";
        let pipeline = pipeline(FixedOcr(json!({"extracted_text": text})), FailingAi);

        let err = pipeline.process(upload(), None).await.unwrap_err();
        assert!(matches!(
            err,
            WarungError::Input(InputError::InvalidTotal(_))
        ));
    }

    #[tokio::test]
    async fn insights_are_attached_when_generation_succeeds() {
        // One canned completion serves both the normalizer (a miss: no
        // items/total keys) and the insight call (valid analysis JSON).
        let pipeline = pipeline(
            FixedOcr(json!({"extracted_text": TABLE_TEXT})),
            FixedAi(r#"{"insights": "Strong coffee sales", "suggestions": ["bundle with roti"]}"#),
        );

        let response = pipeline.process(upload(), None).await.unwrap();
        assert_eq!(
            response.summary.insights.as_deref(),
            Some("Strong coffee sales")
        );
        assert_eq!(response.summary.suggestions, vec!["bundle with roti".to_string()]);
        // Items still came from the regex fallback.
        assert_eq!(response.total, Decimal::from(18_000));
    }
}
