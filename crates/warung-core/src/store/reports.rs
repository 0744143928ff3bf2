//! Read-side queries: sales summary, top items, recent sales.
//!
//! Amounts are stored as exact decimal text, so aggregation happens over
//! decoded `Decimal`s in code rather than through SQLite's float `SUM`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{parse_datetime, parse_decimal, Store};
use crate::error::{Result, StoreError};
use crate::models::report::{RecentSale, RecentSaleItem, SalesSummary, TopItem};

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Build a `WHERE` clause from optional user and date bounds. The date
/// column is qualified by the caller.
fn scope_clause(
    date_column: &str,
    user_id: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(user) = user_id {
        clauses.push("n.user_id = ?".to_string());
        args.push(Box::new(user.to_string()));
    }
    if let Some(start) = start {
        clauses.push(format!("{date_column} >= ?"));
        args.push(Box::new(start.to_rfc3339()));
    }
    if let Some(end) = end {
        clauses.push(format!("{date_column} <= ?"));
        args.push(Box::new(end.to_rfc3339()));
    }

    let clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (clause, args)
}

impl Store {
    /// Aggregate sales figures, optionally scoped to a user and UTC date
    /// range. An empty scope yields the all-zero summary.
    pub fn sales_summary(
        &self,
        user_id: Option<&str>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<SalesSummary> {
        let conn = self.lock();
        let (clause, args) = scope_clause("s.created_at", user_id, start, end);
        let sql = format!(
            "SELECT s.total_amount, s.profit, s.profit_margin
             FROM sales s JOIN sessions n ON n.id = s.session_id{clause}"
        );

        let mut stmt = conn.prepare(&sql).map_err(StoreError::from)?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(args.iter().map(|arg| arg.as_ref())),
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .map_err(StoreError::from)?;

        let mut summary = SalesSummary::default();
        let mut margin_sum = Decimal::ZERO;
        for row in rows {
            let (total, profit, margin) = row.map_err(StoreError::from)?;
            summary.total_sales += parse_decimal(total, "sales.total_amount")?;
            summary.total_profit += parse_decimal(profit, "sales.profit")?;
            margin_sum += parse_decimal(margin, "sales.profit_margin")?;
            summary.transaction_count += 1;
        }

        if summary.transaction_count == 0 {
            return Ok(summary);
        }

        let count = Decimal::from(summary.transaction_count);
        summary.avg_profit_margin = round2(margin_sum / count);
        summary.avg_transaction_value = round2(summary.total_sales / count);
        Ok(summary)
    }

    /// Per-item aggregates ordered by revenue descending. `limit` of `None`
    /// returns every item.
    pub fn top_items(
        &self,
        user_id: Option<&str>,
        limit: Option<usize>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<TopItem>> {
        let conn = self.lock();
        let (clause, args) = scope_clause("i.created_at", user_id, start, end);
        let sql = format!(
            "SELECT i.name, i.qty, i.subtotal
             FROM items i JOIN sessions n ON n.id = i.session_id{clause}"
        );

        let mut stmt = conn.prepare(&sql).map_err(StoreError::from)?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(args.iter().map(|arg| arg.as_ref())),
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .map_err(StoreError::from)?;

        let mut grouped: HashMap<String, TopItem> = HashMap::new();
        for row in rows {
            let (name, qty, subtotal) = row.map_err(StoreError::from)?;
            let subtotal = parse_decimal(subtotal, "items.subtotal")?;
            let entry = grouped.entry(name.clone()).or_insert_with(|| TopItem {
                name,
                total_qty: 0,
                total_revenue: Decimal::ZERO,
                frequency: 0,
            });
            entry.total_qty += u64::from(qty);
            entry.total_revenue += subtotal;
            entry.frequency += 1;
        }

        let mut items: Vec<TopItem> = grouped.into_values().collect();
        items.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    /// Most recently recorded sales, newest first.
    pub fn recent_sales(
        &self,
        user_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<RecentSale>> {
        let conn = self.lock();
        let (clause, mut args) = scope_clause("n.created_at", user_id, None, None);
        let mut sql = format!(
            "SELECT n.id, n.created_at
             FROM sessions n{clause} ORDER BY n.created_at DESC, n.rowid DESC"
        );
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            args.push(Box::new(limit as i64));
        }

        let mut stmt = conn.prepare(&sql).map_err(StoreError::from)?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(args.iter().map(|arg| arg.as_ref())),
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .map_err(StoreError::from)?;

        let headers: Vec<(String, String)> =
            rows.collect::<rusqlite::Result<_>>().map_err(StoreError::from)?;

        let mut sales = Vec::with_capacity(headers.len());
        for (id, created_at) in headers {
            let items = Self::session_items(&conn, &id)?;
            let sale = Self::session_sale(&conn, &id)?;

            sales.push(RecentSale {
                created_at: parse_datetime(created_at, "sessions.created_at")?,
                item_count: items.len(),
                total_amount: sale.total_amount,
                profit: sale.profit,
                items: items
                    .into_iter()
                    .map(|item| RecentSaleItem {
                        name: item.name,
                        qty: item.qty,
                        subtotal: item.subtotal,
                    })
                    .collect(),
                id,
            });
        }
        Ok(sales)
    }
}
