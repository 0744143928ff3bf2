//! Data models: parsed receipts, persisted records, reports, configuration.

pub mod config;
pub mod nota;
pub mod record;
pub mod report;
