use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt, str::FromStr};

/// Which `ReportStore` backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown store backend `{}` (expected `sqlite` or `memory`)", other),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub backend: StoreBackend,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Disaster report store API")]
pub struct Args {
    /// Host to bind to (overrides DISASTER_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides DISASTER_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides DISASTER_STORE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Store backend, `sqlite` or `memory` (overrides DISASTER_STORE_BACKEND)
    #[arg(long)]
    pub store: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::merge(args, |key| env::var(key))?, migrate))
    }

    /// Merge parsed CLI args over values read through `lookup`.
    pub fn merge<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = lookup("DISASTER_STORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match lookup("DISASTER_STORE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing DISASTER_STORE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading DISASTER_STORE_PORT"),
        };
        let env_db = lookup("DISASTER_STORE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/disaster_reports.db".into());
        let env_backend =
            lookup("DISASTER_STORE_BACKEND").unwrap_or_else(|_| StoreBackend::Sqlite.to_string());

        // --- Merge ---
        let backend = args
            .store
            .unwrap_or(env_backend)
            .parse::<StoreBackend>()?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            backend,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
