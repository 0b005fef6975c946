//! Background health/stats polling
//!
//! Polling failures never propagate. They only downgrade the status shown in
//! the status bar. Polls are not coordinated with user-triggered requests.

use crate::gateway::AnalysisBackend;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, warn};

/// Availability of the analysis service as seen through `/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ServiceState {
    #[default]
    Unknown,
    Online,
    Offline,
}

/// Latest polled status of the backend
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemStatus {
    /// Result of the last health check, `None` before the first one
    pub connected: Option<bool>,
    pub service: ServiceState,
    pub documents_processed: u64,
    /// Formats the backend accepts, from the last successful stats call
    pub supported_formats: Vec<String>,
}

/// Polls `/health` and `/stats` and keeps the latest [`SystemStatus`]
#[derive(Clone)]
pub struct StatusMonitor {
    backend: Arc<dyn AnalysisBackend>,
    status: Arc<RwLock<SystemStatus>>,
}

impl StatusMonitor {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            status: Arc::new(RwLock::new(SystemStatus::default())),
        }
    }

    pub async fn status(&self) -> SystemStatus {
        self.status.read().await.clone()
    }

    pub async fn check_health(&self) {
        let connected = match self.backend.health().await {
            Ok(()) => {
                debug!(backend = self.backend.name(), "Health check passed");
                true
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Health check failed");
                false
            }
        };
        self.status.write().await.connected = Some(connected);
    }

    pub async fn load_stats(&self) {
        match self.backend.stats().await {
            Ok(stats) => {
                let mut status = self.status.write().await;
                status.service = ServiceState::Online;
                status.documents_processed = stats.documents_processed.unwrap_or(0);
                status.supported_formats = stats.supported_formats;
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Stats request failed");
                self.status.write().await.service = ServiceState::Offline;
            }
        }
    }

    /// One health check followed by one stats load
    pub async fn poll_once(&self) {
        self.check_health().await;
        self.load_stats().await;
    }

    /// Start the polling task. The first tick fires immediately.
    pub fn start(&self, period: Duration) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                monitor.poll_once().await;
            }
        })
    }
}
