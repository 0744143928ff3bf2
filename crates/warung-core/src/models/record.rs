//! Persisted session, item, and sale records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OCR-to-parsed-result transaction. Created once per successful OCR
/// call and never mutated; owns its items and its sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,

    /// Owning user, when the caller was authenticated.
    pub user_id: Option<String>,

    /// Raw OCR text the receipt was parsed from.
    pub raw_text: String,

    /// JSON snapshot of the parsed items at ingest time.
    pub parsed_json: String,

    pub created_at: DateTime<Utc>,

    pub items: Vec<ItemRecord>,
    pub sale: SaleRecord,
}

/// One line item belonging to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: i64,
    pub session_id: String,
    pub name: String,
    pub qty: u32,

    /// Derived: subtotal / qty when qty > 0, else the subtotal itself.
    pub unit_price: Decimal,

    /// The line total as parsed.
    pub subtotal: Decimal,
}

/// Derived financial facts for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: i64,
    pub session_id: String,
    pub total_amount: Decimal,
    pub profit: Decimal,
    /// Percentage, `profit / total_amount * 100`.
    pub profit_margin: Decimal,
}
