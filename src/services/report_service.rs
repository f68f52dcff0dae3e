//! src/services/report_service.rs
//!
//! ReportService — create, read, update and image attach/detach for disaster
//! reports. Every mutation is validate → look up → authorize → mutate →
//! persist against exactly one report. Mutations are serialized by a single
//! write guard so two read-modify-write cycles never interleave.

use crate::{
    models::{
        identity::CallerId,
        report::{DisasterImage, DisasterReport, ImagePayload, ReportPayload},
    },
    services::validation::{parse_canonical_id, validate_image, validate_report},
    stores::{ReportStore, StoreError},
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    InvalidPayload(String),
    #[error("Invalid payload. Errors=[{}]", .0.join(", "))]
    Validation(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    NotAuthorized(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Owns the report store and enforces validation and authorship rules.
///
/// Cheap to clone; clones share the store and the write guard.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    write_guard: Arc<Mutex<()>>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Every stored report in store order.
    pub async fn list_all(&self) -> ReportResult<Vec<DisasterReport>> {
        Ok(self.store.values().await?)
    }

    /// Fetch a report by its canonical id.
    pub async fn get_by_id(&self, id: &str) -> ReportResult<DisasterReport> {
        let key = canonical_id(id, "id")?;
        self.store
            .get(&key)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("disaster report with id={id} not found")))
    }

    /// Validate `payload` and store it as a new report owned by `caller`.
    pub async fn create(
        &self,
        caller: &CallerId,
        payload: ReportPayload,
    ) -> ReportResult<DisasterReport> {
        ensure_valid_report(&payload)?;

        let _guard = self.write_guard.lock().await;
        let mut disaster_id = Uuid::new_v4();
        while self.store.get(&disaster_id).await?.is_some() {
            disaster_id = Uuid::new_v4();
        }

        let report = DisasterReport::new(disaster_id, caller.clone(), payload);
        self.store.insert(&report).await?;

        info!(
            disaster_id = %report.disaster_id,
            reporter_id = %caller,
            "created disaster report"
        );
        Ok(report)
    }

    /// Replace every payload field of report `id`. Only its reporter may do so.
    pub async fn update_by_id(
        &self,
        caller: &CallerId,
        id: &str,
        payload: ReportPayload,
    ) -> ReportResult<DisasterReport> {
        let key = canonical_id(id, "id")?;
        ensure_valid_report(&payload)?;

        let _guard = self.write_guard.lock().await;
        let mut report = self.store.get(&key).await?.ok_or_else(|| {
            ReportError::NotFound(format!(
                "cannot update report: disaster report with id={id} not found"
            ))
        })?;
        ensure_reporter(
            &report,
            caller,
            format!("you are not the reporter of this disaster report with id={id}"),
        )?;

        report.apply(payload);
        self.store.insert(&report).await?;

        info!(disaster_id = %key, reporter_id = %caller, "updated disaster report");
        Ok(report)
    }

    /// Append an image to the tail of a report's image list.
    pub async fn add_image(
        &self,
        caller: &CallerId,
        payload: ImagePayload,
    ) -> ReportResult<DisasterReport> {
        let key = canonical_id(&payload.disaster_id, "payload.disasterId")?;
        let errors = validate_image(&payload);
        if !errors.is_empty() {
            debug!(?errors, "rejected image payload");
            return Err(ReportError::InvalidPayload(format!(
                "Invalid payload. Errors=[{}]",
                errors.join(", ")
            )));
        }

        let _guard = self.write_guard.lock().await;
        let mut report = self.fetch_for_image(&key).await?;
        ensure_reporter(
            &report,
            caller,
            format!("you are not authorized to add images to this disaster with id={key}"),
        )?;

        let ImagePayload {
            timestamp,
            disaster_image_url,
            ..
        } = payload;
        report.disaster_images.push(DisasterImage {
            disaster_id: key,
            timestamp,
            disaster_image_url,
        });
        self.store.insert(&report).await?;

        info!(
            disaster_id = %key,
            images = report.disaster_images.len(),
            "attached disaster image"
        );
        Ok(report)
    }

    /// Remove the first image matching both timestamp and url.
    pub async fn delete_image(
        &self,
        caller: &CallerId,
        payload: ImagePayload,
    ) -> ReportResult<DisasterReport> {
        let key = canonical_id(&payload.disaster_id, "payload.disasterId")?;

        let _guard = self.write_guard.lock().await;
        let mut report = self.fetch_for_image(&key).await?;
        ensure_reporter(
            &report,
            caller,
            format!("you are not authorized to delete images from this disaster with id={key}"),
        )?;

        let index = report
            .find_image(&payload.timestamp, &payload.disaster_image_url)
            .ok_or_else(|| {
                ReportError::NotFound(format!(
                    "Image with timestamp={} and disasterImageUrl={} not found in disaster with id={}",
                    payload.timestamp, payload.disaster_image_url, key
                ))
            })?;
        report.disaster_images.remove(index);
        self.store.insert(&report).await?;

        info!(
            disaster_id = %key,
            images = report.disaster_images.len(),
            "detached disaster image"
        );
        Ok(report)
    }

    async fn fetch_for_image(&self, key: &Uuid) -> ReportResult<DisasterReport> {
        self.store
            .get(key)
            .await?
            .ok_or_else(|| ReportError::NotFound(format!("Disaster with id={key} not found")))
    }
}

fn canonical_id(raw: &str, label: &str) -> ReportResult<Uuid> {
    parse_canonical_id(raw).ok_or_else(|| {
        ReportError::InvalidPayload(format!("{label}={raw} is not in the valid format."))
    })
}

fn ensure_valid_report(payload: &ReportPayload) -> ReportResult<()> {
    let errors = validate_report(payload);
    if errors.is_empty() {
        Ok(())
    } else {
        debug!(?errors, "rejected report payload");
        Err(ReportError::Validation(errors))
    }
}

fn ensure_reporter(report: &DisasterReport, caller: &CallerId, msg: String) -> ReportResult<()> {
    if report.reporter_id == *caller {
        Ok(())
    } else {
        warn!(
            disaster_id = %report.disaster_id,
            caller = %caller,
            "caller is not the reporter"
        );
        Err(ReportError::NotAuthorized(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryReportStore;

    fn service() -> ReportService {
        ReportService::new(Arc::new(MemoryReportStore::new()))
    }

    fn amy() -> CallerId {
        CallerId::from("amy")
    }

    fn bob() -> CallerId {
        CallerId::from("bob")
    }

    fn payload() -> ReportPayload {
        ReportPayload {
            reporter_name: "Amy".into(),
            contact: "555-1234".into(),
            email: "amy@example.com".into(),
            disaster_type: "flood".into(),
            img_url: "http://x/1.png".into(),
            latitude: "12.5".into(),
            longitude: "-7.3".into(),
            city: "Lagos".into(),
            state: "Lagos".into(),
            date: "2024-03-01".into(),
            severity: "severe".into(),
            impact: "widespread".into(),
        }
    }

    fn image(report: &DisasterReport, ts: &str, url: &str) -> ImagePayload {
        ImagePayload {
            disaster_id: report.disaster_id.to_string(),
            timestamp: ts.into(),
            disaster_image_url: url.into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_identity_and_empty_images() {
        let svc = service();
        let report = svc.create(&amy(), payload()).await.unwrap();

        assert_eq!(report.reporter_id, amy());
        assert!(report.disaster_images.is_empty());
        assert_eq!(report.reporter_name, "Amy");
        assert!(parse_canonical_id(&report.disaster_id.to_string()).is_some());
    }

    #[tokio::test]
    async fn created_ids_are_unique() {
        let svc = service();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..20 {
            let report = svc.create(&amy(), payload()).await.unwrap();
            assert!(ids.insert(report.disaster_id));
        }
        assert_eq!(svc.list_all().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn get_returns_what_create_returned() {
        let svc = service();
        let created = svc.create(&amy(), payload()).await.unwrap();
        let fetched = svc
            .get_by_id(&created.disaster_id.to_string())
            .await
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_rejects_malformed_and_unknown_ids() {
        let svc = service();
        assert!(matches!(
            svc.get_by_id("not-a-uuid").await,
            Err(ReportError::InvalidPayload(_))
        ));
        assert!(matches!(
            svc.get_by_id(&Uuid::new_v4().to_string()).await,
            Err(ReportError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_reports_every_violation() {
        let svc = service();
        let mut bad = payload();
        bad.reporter_name = "".into();
        bad.email = "not-an-email".into();
        bad.latitude = "abc".into();

        let Err(ReportError::Validation(errors)) = svc.create(&amy(), bad).await else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3);
        for field in ["reporterName", "email", "latitude"] {
            assert!(errors.iter().any(|e| e.contains(field)), "missing {field}");
        }
        assert!(svc.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_identity() {
        let svc = service();
        let created = svc.create(&amy(), payload()).await.unwrap();
        let id = created.disaster_id.to_string();
        svc.add_image(&amy(), image(&created, "t1", "u1"))
            .await
            .unwrap();

        let mut changed = payload();
        changed.severity = "moderate".into();
        let updated = svc.update_by_id(&amy(), &id, changed).await.unwrap();

        assert_eq!(updated.severity, "moderate");
        assert_eq!(updated.disaster_id, created.disaster_id);
        assert_eq!(updated.reporter_id, amy());
        assert_eq!(updated.disaster_images.len(), 1);
        assert_eq!(svc.get_by_id(&id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_by_other_caller_is_rejected_and_leaves_record() {
        let svc = service();
        let created = svc.create(&amy(), payload()).await.unwrap();
        let id = created.disaster_id.to_string();

        let mut changed = payload();
        changed.city = "Abuja".into();
        let result = svc.update_by_id(&bob(), &id, changed).await;

        assert!(matches!(result, Err(ReportError::NotAuthorized(_))));
        assert_eq!(svc.get_by_id(&id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_error_precedence() {
        let svc = service();
        let mut bad = payload();
        bad.city = " ".into();

        assert!(matches!(
            svc.update_by_id(&amy(), "nope", bad.clone()).await,
            Err(ReportError::InvalidPayload(_))
        ));
        assert!(matches!(
            svc.update_by_id(&amy(), &Uuid::new_v4().to_string(), bad)
                .await,
            Err(ReportError::Validation(_))
        ));
        assert!(matches!(
            svc.update_by_id(&amy(), &Uuid::new_v4().to_string(), payload())
                .await,
            Err(ReportError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn add_then_delete_image_restores_sequence() {
        let svc = service();
        let created = svc.create(&amy(), payload()).await.unwrap();
        svc.add_image(&amy(), image(&created, "t1", "u1"))
            .await
            .unwrap();
        let before = svc
            .get_by_id(&created.disaster_id.to_string())
            .await
            .unwrap()
            .disaster_images;

        let added = svc
            .add_image(&amy(), image(&created, "t2", "u2"))
            .await
            .unwrap();
        assert_eq!(added.disaster_images.len(), 2);
        assert_eq!(added.disaster_images[1].timestamp, "t2");
        assert_eq!(added.disaster_images[1].disaster_id, created.disaster_id);

        let removed = svc
            .delete_image(&amy(), image(&created, "t2", "u2"))
            .await
            .unwrap();
        assert_eq!(removed.disaster_images, before);
    }

    #[tokio::test]
    async fn duplicate_images_are_kept_and_removed_one_at_a_time() {
        let svc = service();
        let created = svc.create(&amy(), payload()).await.unwrap();
        for _ in 0..2 {
            svc.add_image(&amy(), image(&created, "t", "u")).await.unwrap();
        }

        let after = svc
            .delete_image(&amy(), image(&created, "t", "u"))
            .await
            .unwrap();
        assert_eq!(after.disaster_images.len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_image_is_not_found_and_unchanged() {
        let svc = service();
        let created = svc.create(&amy(), payload()).await.unwrap();
        let with_image = svc
            .add_image(&amy(), image(&created, "t1", "u1"))
            .await
            .unwrap();

        let result = svc
            .delete_image(&amy(), image(&created, "t1", "other"))
            .await;
        assert!(matches!(result, Err(ReportError::NotFound(_))));

        let stored = svc
            .get_by_id(&created.disaster_id.to_string())
            .await
            .unwrap();
        assert_eq!(stored.disaster_images, with_image.disaster_images);
    }

    #[tokio::test]
    async fn image_operations_check_shape_existence_and_author() {
        let svc = service();
        let created = svc.create(&amy(), payload()).await.unwrap();

        let mut malformed = image(&created, "t", "u");
        malformed.disaster_id = "123".into();
        assert!(matches!(
            svc.add_image(&amy(), malformed.clone()).await,
            Err(ReportError::InvalidPayload(_))
        ));
        assert!(matches!(
            svc.delete_image(&amy(), malformed).await,
            Err(ReportError::InvalidPayload(_))
        ));

        assert!(matches!(
            svc.add_image(&amy(), image(&created, " ", "u")).await,
            Err(ReportError::InvalidPayload(_))
        ));

        let mut unknown = image(&created, "t", "u");
        unknown.disaster_id = Uuid::new_v4().to_string();
        assert!(matches!(
            svc.add_image(&amy(), unknown.clone()).await,
            Err(ReportError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete_image(&amy(), unknown).await,
            Err(ReportError::NotFound(_))
        ));

        assert!(matches!(
            svc.add_image(&bob(), image(&created, "t", "u")).await,
            Err(ReportError::NotAuthorized(_))
        ));
        svc.add_image(&amy(), image(&created, "t", "u")).await.unwrap();
        assert!(matches!(
            svc.delete_image(&bob(), image(&created, "t", "u")).await,
            Err(ReportError::NotAuthorized(_))
        ));
    }

    #[tokio::test]
    async fn scenario_payload_runs_against_sqlite() {
        let store = crate::stores::SqliteReportStore::connect("sqlite::memory:", 1)
            .await
            .unwrap();
        store.migrate().await.unwrap();
        let svc = ReportService::new(Arc::new(store));

        let created = svc.create(&amy(), payload()).await.unwrap();
        svc.add_image(&amy(), image(&created, "t1", "u1"))
            .await
            .unwrap();

        let listed = svc.list_all().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].disaster_images.len(), 1);
        assert_eq!(listed[0].email, "amy@example.com");
    }
}
