//! Read-side report models: sales analytics and pricing advice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate sales figures over a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub total_profit: Decimal,

    /// Average profit margin percentage, rounded to two decimal places.
    pub avg_profit_margin: Decimal,

    pub transaction_count: u64,

    /// Rounded to two decimal places.
    pub avg_transaction_value: Decimal,
}

/// Per-item sales aggregate, ordered by revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopItem {
    pub name: String,
    pub total_qty: u64,
    pub total_revenue: Decimal,

    /// Number of receipt lines this item appeared on.
    pub frequency: u64,
}

/// One recently recorded sale with its item lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSale {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub item_count: usize,
    pub total_amount: Decimal,
    pub profit: Decimal,
    pub items: Vec<RecentSaleItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSaleItem {
    pub name: String,
    pub qty: u32,
    pub subtotal: Decimal,
}

/// Pricing advice for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecommendation {
    pub item_name: String,

    /// Current average selling price per receipt line.
    pub current_price: Decimal,

    pub recommended_price: Decimal,

    /// Target profit margin percentage the recommendation aims for.
    pub expected_margin: Decimal,

    pub reasoning: String,

    /// Number of recorded sales lines for the item.
    pub frequency: u64,
}
