//! src/stores/sqlite.rs
//!
//! SQLite-backed `ReportStore`. A report is one row in `disaster_reports`
//! plus one row per attached image in `disaster_images`, ordered by `position`.
//! Writes replace the image rows wholesale inside a single transaction.

use super::{ReportStore, StoreError, StoreResult};
use crate::models::{
    identity::CallerId,
    report::{DisasterImage, DisasterReport},
};
use async_trait::async_trait;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{collections::BTreeMap, str::FromStr, sync::Arc};
use tracing::debug;
use uuid::Uuid;

/// Schema applied by `--migrate` and on every startup. Statements are idempotent.
const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const REPORT_COLUMNS: &str = "disaster_id, reporter_id, reporter_name, contact, email, \
     disaster_type, img_url, latitude, longitude, city, state, date, severity, impact";

#[derive(Clone)]
pub struct SqliteReportStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

#[derive(FromRow)]
struct ReportRow {
    disaster_id: String,
    reporter_id: String,
    reporter_name: String,
    contact: String,
    email: String,
    disaster_type: String,
    img_url: String,
    latitude: String,
    longitude: String,
    city: String,
    state: String,
    date: String,
    severity: String,
    impact: String,
}

#[derive(FromRow)]
struct ImageRow {
    disaster_id: String,
    timestamp: String,
    disaster_image_url: String,
}

impl SqliteReportStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Open a pool for `url`, creating the database file if it is missing.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Apply the embedded schema statement by statement.
    pub async fn migrate(&self) -> StoreResult<usize> {
        let statements = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        for stmt in &statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }

        Ok(statements.len())
    }

    async fn fetch_images(&self, id: &str) -> StoreResult<Vec<ImageRow>> {
        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT disaster_id, timestamp, disaster_image_url
             FROM disaster_images WHERE disaster_id = ? ORDER BY position ASC",
        )
        .bind(id)
        .fetch_all(&*self.db)
        .await?;
        Ok(rows)
    }
}

fn parse_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|err| StoreError::Corrupt(format!("disaster_id `{raw}`: {err}")))
}

fn assemble(row: ReportRow, images: Vec<ImageRow>) -> StoreResult<DisasterReport> {
    let disaster_id = parse_id(&row.disaster_id)?;
    let disaster_images = images
        .into_iter()
        .map(|img| {
            Ok(DisasterImage {
                disaster_id: parse_id(&img.disaster_id)?,
                timestamp: img.timestamp,
                disaster_image_url: img.disaster_image_url,
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(DisasterReport {
        disaster_id,
        reporter_id: CallerId::from(row.reporter_id),
        reporter_name: row.reporter_name,
        contact: row.contact,
        email: row.email,
        disaster_type: row.disaster_type,
        img_url: row.img_url,
        latitude: row.latitude,
        longitude: row.longitude,
        city: row.city,
        state: row.state,
        date: row.date,
        severity: row.severity,
        impact: row.impact,
        disaster_images,
    })
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn get(&self, id: &Uuid) -> StoreResult<Option<DisasterReport>> {
        let key = id.to_string();
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM disaster_reports WHERE disaster_id = ?"
        ))
        .bind(&key)
        .fetch_optional(&*self.db)
        .await?;

        match row {
            Some(row) => {
                let images = self.fetch_images(&key).await?;
                assemble(row, images).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, report: &DisasterReport) -> StoreResult<()> {
        let key = report.disaster_id.to_string();
        let mut tx = self.db.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO disaster_reports ({REPORT_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(disaster_id) DO UPDATE SET
                reporter_name = excluded.reporter_name,
                contact = excluded.contact,
                email = excluded.email,
                disaster_type = excluded.disaster_type,
                img_url = excluded.img_url,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                city = excluded.city,
                state = excluded.state,
                date = excluded.date,
                severity = excluded.severity,
                impact = excluded.impact"
        ))
        .bind(&key)
        .bind(report.reporter_id.as_str())
        .bind(&report.reporter_name)
        .bind(&report.contact)
        .bind(&report.email)
        .bind(&report.disaster_type)
        .bind(&report.img_url)
        .bind(&report.latitude)
        .bind(&report.longitude)
        .bind(&report.city)
        .bind(&report.state)
        .bind(&report.date)
        .bind(&report.severity)
        .bind(&report.impact)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM disaster_images WHERE disaster_id = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await?;

        for (position, image) in report.disaster_images.iter().enumerate() {
            sqlx::query(
                "INSERT INTO disaster_images (disaster_id, position, timestamp, disaster_image_url)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&key)
            .bind(position as i64)
            .bind(&image.timestamp)
            .bind(&image.disaster_image_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            "stored report {} with {} images",
            key,
            report.disaster_images.len()
        );
        Ok(())
    }

    async fn remove(&self, id: &Uuid) -> StoreResult<Option<DisasterReport>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let key = id.to_string();
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM disaster_images WHERE disaster_id = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM disaster_reports WHERE disaster_id = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(existing))
    }

    async fn values(&self) -> StoreResult<Vec<DisasterReport>> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM disaster_reports ORDER BY disaster_id ASC"
        ))
        .fetch_all(&*self.db)
        .await?;

        let image_rows = sqlx::query_as::<_, ImageRow>(
            "SELECT disaster_id, timestamp, disaster_image_url
             FROM disaster_images ORDER BY disaster_id ASC, position ASC",
        )
        .fetch_all(&*self.db)
        .await?;

        let mut images: BTreeMap<String, Vec<ImageRow>> = BTreeMap::new();
        for img in image_rows {
            images.entry(img.disaster_id.clone()).or_default().push(img);
        }

        rows.into_iter()
            .map(|row| {
                let attached = images.remove(&row.disaster_id).unwrap_or_default();
                assemble(row, attached)
            })
            .collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        let value = sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        if value == 1 {
            Ok(())
        } else {
            Err(StoreError::Corrupt(format!("unexpected ping result: {value}")))
        }
    }
}
