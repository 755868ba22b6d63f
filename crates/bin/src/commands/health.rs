//! Health command - asks a running server which store it serves from.

use std::time::Duration;

use serde::Deserialize;

use crate::cli::HealthArgs;

/// Body of `GET /health`.
#[derive(Debug, Deserialize)]
struct HealthReport {
    status: String,
    backend: String,
}

impl HealthReport {
    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// The `/health` endpoint under `base`, which may already name it.
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

/// Run the health command. Fails unless the server reports itself healthy.
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("unhealthy: failed to reach {url}: {e}"))?;
    if !response.status().is_success() {
        return Err(format!("unhealthy: {url} answered HTTP {}", response.status()).into());
    }

    let report: HealthReport = response
        .json()
        .await
        .map_err(|e| format!("unhealthy: unexpected /health body from {url}: {e}"))?;
    if !report.is_healthy() {
        return Err(format!(
            "unhealthy: server reports '{}' (backend: {})",
            report.status, report.backend
        )
        .into());
    }

    println!("healthy (backend: {})", report.backend);
    Ok(())
}
