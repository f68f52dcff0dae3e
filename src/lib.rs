//! Disaster report store.
//!
//! An HTTP service that keeps disaster reports and their attached images in an
//! ordered key-value store. Only the caller who created a report may change it.
//!
//! - **`models`**: report, image and payload types plus the caller identity.
//! - **`stores`**: the `ReportStore` seam with in-memory and SQLite backends.
//! - **`services`**: validation, authorization and mutation rules, and ledger
//!   address derivation.
//! - **`handlers`** / **`routes`**: the axum HTTP surface.

pub mod auth;
pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

use axum::Router;
use services::report_service::ReportService;

/// Build the full application router over `service`.
pub fn app(service: ReportService) -> Router {
    routes::routes::routes().with_state(service)
}
