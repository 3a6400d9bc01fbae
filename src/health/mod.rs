//! Keep-alive pings against both backends.
//!
//! The backends sleep when idle, so the server pings them on start and then
//! on a fixed interval. Results are only logged.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{AdminClient, ApiError, ContentClient};

/// Which backend a ping went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingTarget {
    Api,
    Blog,
}

impl PingTarget {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Blog => "blog",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingOutcome {
    Ok,
    NotConfigured,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingReport {
    pub target: PingTarget,
    pub outcome: PingOutcome,
}

impl PingReport {
    fn from_result(target: PingTarget, result: Result<serde_json::Value, ApiError>) -> Self {
        let outcome = match result {
            Ok(body) => {
                debug!(backend = target.as_str(), body = %body, "Ping answered");
                PingOutcome::Ok
            }
            Err(ApiError::NotConfigured { name }) => {
                warn!(backend = target.as_str(), variable = name, "Ping skipped: base URL not configured");
                PingOutcome::NotConfigured
            }
            Err(e) => {
                warn!(backend = target.as_str(), error = %e, "Ping failed");
                PingOutcome::Failed(e.to_string())
            }
        };
        Self { target, outcome }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcome == PingOutcome::Ok
    }
}

/// Ping both backends concurrently.
pub async fn ping_once(admin: &AdminClient, content: &ContentClient) -> Vec<PingReport> {
    let (api, blog) = tokio::join!(admin.ping(), content.ping());
    vec![
        PingReport::from_result(PingTarget::Api, api),
        PingReport::from_result(PingTarget::Blog, blog),
    ]
}

/// Ping now, then every `interval`, until `shutdown` fires.
pub async fn run_loop(
    admin: AdminClient,
    content: ContentClient,
    interval: Duration,
    shutdown: CancellationToken,
) {
    info!(interval_secs = interval.as_secs(), "Starting backend pings");

    loop {
        let reports = tokio::select! {
            () = shutdown.cancelled() => break,
            reports = ping_once(&admin, &content) => reports,
        };
        let healthy = reports.iter().filter(|r| r.is_ok()).count();
        debug!(healthy, total = reports.len(), "Ping round complete");

        tokio::select! {
            () = shutdown.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    info!("Backend pings stopped");
}
