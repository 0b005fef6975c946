//! Insight Console - client for the data insight service
//!
//! This crate provides:
//! - An HTTP gateway to the analysis backend (upload, query, insights, stats, health)
//! - Explicit client state (uploaded files, analysis type, view state)
//! - A sequential upload pipeline that reports progress as events
//! - HTML view rendering as pure functions of state
//! - A web console and a CLI on top of the same controller

pub mod app;
pub mod gateway;
pub mod monitor;
pub mod pipeline;
pub mod render;
pub mod state;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use app::InsightApp;
pub use gateway::{AnalysisBackend, GatewayError, HttpGateway, UploadSource};
pub use monitor::{StatusMonitor, SystemStatus};
pub use pipeline::{UploadEvent, UploadPipeline};
pub use state::{AnalysisType, ClientState, Tab, UploadedFileRecord};

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the console
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClientConfig {
    /// Backend origin including the `/api` prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Seconds between health/stats polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Optional per-request timeout (unset = wait forever)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Number of uploads shown in the recent uploads list
    #[serde(default = "default_recent_uploads")]
    pub recent_uploads: usize,

    /// Address the web console binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_api_base_url() -> String { "http://localhost:5000/api".to_string() }
fn default_poll_interval() -> u64 { 30 }
fn default_recent_uploads() -> usize { 3 }
fn default_listen_addr() -> String { "127.0.0.1:8080".to_string() }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: None,
            recent_uploads: default_recent_uploads(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.recent_uploads, 3);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_config_overrides() {
        let config = ClientConfig::from_toml_str(
            r#"
api_base_url = "http://analysis.internal:9000/api"
poll_interval_secs = 5
request_timeout_secs = 20
"#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://analysis.internal:9000/api");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        std::fs::write(&path, "recent_uploads = 5\n").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.recent_uploads, 5);

        let missing = ClientConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(ClientConfig::from_toml_str("poll_interval_secs = \"soon\"").is_err());
    }
}
