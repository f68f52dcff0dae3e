//! Core data models for the disaster report service.
//!
//! Reports are persisted whole through a `ReportStore` and serialize as
//! camelCase JSON via `serde`.

pub mod identity;
pub mod report;
