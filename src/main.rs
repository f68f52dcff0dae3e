use anyhow::{Context, Result};
use disaster_report_store::{
    app,
    config::{AppConfig, StoreBackend},
    services::report_service::ReportService,
    stores::{MemoryReportStore, ReportStore, SqliteReportStore},
};
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const MAX_DB_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting disaster-report-store with config: {:?}", cfg);

    let store: Arc<dyn ReportStore> = match cfg.backend {
        StoreBackend::Memory => {
            if migrate {
                anyhow::bail!("--migrate requires the sqlite backend");
            }
            tracing::warn!("Using in-memory store; reports are lost on shutdown");
            Arc::new(MemoryReportStore::new())
        }
        StoreBackend::Sqlite => {
            let store = open_sqlite(&cfg.database_url).await?;

            // --- Handle migration mode ---
            if migrate {
                tracing::info!("Database migration complete.");
                return Ok(()); // exit after migration
            }
            Arc::new(store)
        }
    };

    // --- Initialize core service ---
    let service = ReportService::new(store);

    // --- Build router ---
    let router = app(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}

/// Connect to SQLite, creating the parent directory if needed, and apply the schema.
async fn open_sqlite(db_url: &str) -> Result<SqliteReportStore> {
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    tracing::debug!("Interpreted SQLite path => {}", db_path);

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {:?}", parent))?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    let store = SqliteReportStore::connect(db_url, MAX_DB_CONNECTIONS)
        .await
        .with_context(|| format!("connecting to {}", db_url))?;

    let applied = store.migrate().await.context("applying schema")?;
    tracing::info!("Applied {} schema statements", applied);

    Ok(store)
}
