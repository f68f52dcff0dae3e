//! Persistence seam for disaster reports.
//!
//! The service talks to an ordered map from report id to report through
//! `ReportStore`. Two backends exist: an in-memory `BTreeMap` and SQLite.

pub mod memory;
pub mod sqlite;

use crate::models::report::DisasterReport;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryReportStore;
pub use sqlite::SqliteReportStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("stored report is corrupt: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered key-value storage for reports, keyed by `disaster_id`.
///
/// `insert` is an upsert. `values` yields reports in ascending key order.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn get(&self, id: &Uuid) -> StoreResult<Option<DisasterReport>>;
    async fn insert(&self, report: &DisasterReport) -> StoreResult<()>;
    async fn remove(&self, id: &Uuid) -> StoreResult<Option<DisasterReport>>;
    async fn values(&self) -> StoreResult<Vec<DisasterReport>>;

    /// Cheap liveness check used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}
