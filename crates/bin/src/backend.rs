//! Backend creation and utility functions.

use std::path::PathBuf;

use listenink::SqlxBackend;

use crate::cli::{Backend, BackendConfig};

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// The SQLite database file under the configured data directory
fn sqlite_path(config: &BackendConfig) -> PathBuf {
    config
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("listenink.db")
}

/// Human-readable label for the configured backend
pub fn backend_label(config: &BackendConfig) -> String {
    match config.backend {
        Backend::Sqlite => format!("sqlite ({})", sqlite_path(config).display()),
        Backend::Postgres => match &config.postgres_url {
            Some(url) => format!("postgres ({})", redact_postgres_url(url)),
            None => "postgres".to_string(),
        },
    }
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    config: &BackendConfig,
) -> Result<SqlxBackend, Box<dyn std::error::Error>> {
    match config.backend {
        Backend::Sqlite => {
            let db_path = sqlite_path(config);
            if let Some(data_dir) = db_path.parent() {
                tokio::fs::create_dir_all(data_dir).await?;
            }

            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(SqlxBackend::open_sqlite(&db_path).await?)
        }
        Backend::Postgres => {
            let url = config
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or LISTENINK_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match SqlxBackend::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(backend)
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
    }
}
