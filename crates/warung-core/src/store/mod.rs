//! SQLite persistence for sessions, items, and sales.
//!
//! One OCR attempt maps to one `sessions` row owning its `items` rows and
//! one `sales` row. Sessions are write-once; the only multi-row write is
//! the initial insert, which runs in a single transaction so no partial
//! state is ever visible.

mod reports;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::nota::ParsedNota;
use crate::models::record::{ItemRecord, SaleRecord, SessionRecord};

/// Input for recording one processed receipt.
pub struct NewSession<'a> {
    pub user_id: Option<String>,
    pub nota: &'a ParsedNota,
    pub profit: Decimal,
    pub profit_margin: Decimal,
}

/// SQLite-backed store.
pub struct Store {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id          TEXT PRIMARY KEY,
    user_id     TEXT,
    raw_text    TEXT NOT NULL,
    parsed_json TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    name       TEXT NOT NULL,
    qty        INTEGER NOT NULL,
    unit_price TEXT NOT NULL,
    subtotal   TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sales (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id    TEXT NOT NULL UNIQUE REFERENCES sessions(id) ON DELETE CASCADE,
    total_amount  TEXT NOT NULL,
    profit        TEXT NOT NULL,
    profit_margin TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_session ON items(session_id);
CREATE INDEX IF NOT EXISTS idx_items_name ON items(name);
CREATE INDEX IF NOT EXISTS idx_sessions_created ON sessions(created_at);
";

pub(crate) fn parse_decimal(value: String, field: &'static str) -> Result<Decimal> {
    value
        .parse()
        .map_err(|_| StoreError::Corrupt { field, value }.into())
}

pub(crate) fn parse_datetime(value: String, field: &'static str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::Corrupt { field, value }.into())
}

impl Store {
    /// Open (and migrate) the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(StoreError::from)?;
        Self::init(conn)
    }

    /// Open an in-memory store (tests and dry runs).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            warn!(%err, "could not enable WAL mode");
        }
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(StoreError::from)?;
        conn.execute_batch(SCHEMA).map_err(StoreError::from)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    /// Record one processed receipt: session + items + sale in a single
    /// transaction.
    pub fn record_session(&self, new: NewSession<'_>) -> Result<SessionRecord> {
        let mut conn = self.lock();
        let tx = conn.transaction().map_err(StoreError::from)?;

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let stamp = created_at.to_rfc3339();
        let parsed_json =
            serde_json::to_string(&new.nota.items).map_err(StoreError::from)?;

        tx.execute(
            "INSERT INTO sessions (id, user_id, raw_text, parsed_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, new.user_id, new.nota.raw_text, parsed_json, stamp],
        )
        .map_err(StoreError::from)?;

        let mut items = Vec::with_capacity(new.nota.items.len());
        for item in &new.nota.items {
            let unit_price = if item.qty > 0 {
                item.price / Decimal::from(item.qty)
            } else {
                item.price
            };

            tx.execute(
                "INSERT INTO items (session_id, name, qty, unit_price, subtotal, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    item.name,
                    item.qty,
                    unit_price.to_string(),
                    item.price.to_string(),
                    stamp
                ],
            )
            .map_err(StoreError::from)?;

            items.push(ItemRecord {
                id: tx.last_insert_rowid(),
                session_id: id.clone(),
                name: item.name.clone(),
                qty: item.qty,
                unit_price,
                subtotal: item.price,
            });
        }

        tx.execute(
            "INSERT INTO sales (session_id, total_amount, profit, profit_margin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                new.nota.total.to_string(),
                new.profit.to_string(),
                new.profit_margin.to_string(),
                stamp
            ],
        )
        .map_err(StoreError::from)?;

        let sale = SaleRecord {
            id: tx.last_insert_rowid(),
            session_id: id.clone(),
            total_amount: new.nota.total,
            profit: new.profit,
            profit_margin: new.profit_margin,
        };

        tx.commit().map_err(StoreError::from)?;

        info!(session = %id, items = items.len(), "session recorded");

        Ok(SessionRecord {
            id,
            user_id: new.user_id,
            raw_text: new.nota.raw_text.clone(),
            parsed_json,
            created_at,
            items,
            sale,
        })
    }

    /// Fetch one session with its items and sale.
    pub fn get_session(&self, id: &str) -> Result<SessionRecord> {
        let conn = self.lock();

        let header = conn
            .query_row(
                "SELECT id, user_id, raw_text, parsed_json, created_at
                 FROM sessions WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let items = Self::session_items(&conn, id)?;
        let sale = Self::session_sale(&conn, id)?;

        Ok(SessionRecord {
            id: header.0,
            user_id: header.1,
            raw_text: header.2,
            parsed_json: header.3,
            created_at: parse_datetime(header.4, "sessions.created_at")?,
            items,
            sale,
        })
    }

    /// Delete a session; items and sale cascade. Returns whether a row
    /// existed.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let conn = self.lock();
        let deleted = conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])
            .map_err(StoreError::from)?;
        Ok(deleted > 0)
    }

    fn item_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, u32, String, String)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    pub(crate) fn session_items(conn: &Connection, session_id: &str) -> Result<Vec<ItemRecord>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, session_id, name, qty, unit_price, subtotal
                 FROM items WHERE session_id = ?1 ORDER BY id",
            )
            .map_err(StoreError::from)?;

        let rows = stmt
            .query_map(params![session_id], Self::item_from_row)
            .map_err(StoreError::from)?;

        let mut items = Vec::new();
        for row in rows {
            let (id, session_id, name, qty, unit_price, subtotal) =
                row.map_err(StoreError::from)?;
            items.push(ItemRecord {
                id,
                session_id,
                name,
                qty,
                unit_price: parse_decimal(unit_price, "items.unit_price")?,
                subtotal: parse_decimal(subtotal, "items.subtotal")?,
            });
        }
        Ok(items)
    }

    pub(crate) fn session_sale(conn: &Connection, session_id: &str) -> Result<SaleRecord> {
        let row = conn
            .query_row(
                "SELECT id, session_id, total_amount, profit, profit_margin
                 FROM sales WHERE session_id = ?1",
                params![session_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::NotFound(format!("sale for session {session_id}")))?;

        Ok(SaleRecord {
            id: row.0,
            session_id: row.1,
            total_amount: parse_decimal(row.2, "sales.total_amount")?,
            profit: parse_decimal(row.3, "sales.profit")?,
            profit_margin: parse_decimal(row.4, "sales.profit_margin")?,
        })
    }
}
