//! Defines routes for all disaster report operations.
//!
//! ## Structure
//! - **Report endpoints**
//!   - `GET    /reports`        — list every report
//!   - `POST   /reports`        — create report
//!   - `GET    /reports/{id}`   — fetch one report
//!   - `PUT    /reports/{id}`   — replace report fields
//!
//! - **Image endpoints**
//!   - `POST   /reports/images` — attach image
//!   - `DELETE /reports/images` — detach image
//!
//! - **Misc**
//!   - `GET    /addresses/{identity}` — ledger address for an identity
//!   - `GET    /healthz`, `GET /readyz`
//!
//! Mutating routes require the `x-caller-id` header.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        report_handlers::{
            add_image, create_report, delete_image, get_address, get_report, get_report_images,
            list_reports, update_report,
        },
    },
    services::report_service::ReportService,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for every route.
///
/// The router carries shared state (`ReportService`) to all handlers.
pub fn routes() -> Router<ReportService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // static `/reports/images` takes priority over `/reports/{id}`
        .route(
            "/reports/images",
            get(get_report_images).post(add_image).delete(delete_image),
        )
        .route("/reports", get(list_reports).post(create_report))
        .route("/reports/{id}", get(get_report).put(update_report))
        .route("/addresses/{identity}", get(get_address))
}
