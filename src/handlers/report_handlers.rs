//! HTTP handlers for report and image operations.
//! Each handler binds the caller and request body, then delegates to
//! `ReportService`.

use crate::{
    auth::Caller,
    errors::AppError,
    extract::ApiJson,
    models::{
        identity::CallerId,
        report::{DisasterReport, ImagePayload, ReportPayload},
    },
    services::{address::address_for_caller, report_service::ReportService},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

/// Response body for `GET /addresses/{identity}`.
#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub identity: String,
    pub address: String,
}

/// GET `/reports` — every stored report.
pub async fn list_reports(
    State(service): State<ReportService>,
) -> Result<Json<Vec<DisasterReport>>, AppError> {
    Ok(Json(service.list_all().await?))
}

/// GET `/reports/{id}`
pub async fn get_report(
    State(service): State<ReportService>,
    Path(id): Path<String>,
) -> Result<Json<DisasterReport>, AppError> {
    Ok(Json(service.get_by_id(&id).await?))
}

/// GET `/reports/images` — the static images route shadows `/reports/{id}`,
/// so a lookup of id `images` lands here and gets the usual id rejection.
pub async fn get_report_images(
    State(service): State<ReportService>,
) -> Result<Json<DisasterReport>, AppError> {
    Ok(Json(service.get_by_id("images").await?))
}

/// POST `/reports` — create a report owned by the caller.
pub async fn create_report(
    State(service): State<ReportService>,
    Caller(caller): Caller,
    ApiJson(payload): ApiJson<ReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = service.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// PUT `/reports/{id}` — replace a report's fields.
pub async fn update_report(
    State(service): State<ReportService>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ReportPayload>,
) -> Result<Json<DisasterReport>, AppError> {
    Ok(Json(service.update_by_id(&caller, &id, payload).await?))
}

/// POST `/reports/images` — attach an image.
pub async fn add_image(
    State(service): State<ReportService>,
    Caller(caller): Caller,
    ApiJson(payload): ApiJson<ImagePayload>,
) -> Result<Json<DisasterReport>, AppError> {
    Ok(Json(service.add_image(&caller, payload).await?))
}

/// DELETE `/reports/images` — detach the first matching image.
pub async fn delete_image(
    State(service): State<ReportService>,
    Caller(caller): Caller,
    ApiJson(payload): ApiJson<ImagePayload>,
) -> Result<Json<DisasterReport>, AppError> {
    Ok(Json(service.delete_image(&caller, payload).await?))
}

/// GET `/addresses/{identity}` — ledger address for an identity. No store access.
pub async fn get_address(Path(identity): Path<String>) -> Json<AddressResponse> {
    let address = address_for_caller(&CallerId::from(identity.as_str()));
    Json(AddressResponse { identity, address })
}
