//! Backend gateway abstraction and wire types

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when talking to the analysis backend
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport failure or an undecodable response body
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// 2xx response that carries an error of its own
    #[error("{0}")]
    Application(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Decode `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A file to be uploaded, already read into memory
#[derive(Debug, Clone)]
pub struct UploadSource {
    /// File name as the user knows it
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming it after its final path component
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Metadata the backend attaches to an ingested file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadMetadata {
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Response body of `POST /upload`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_id: String,
    #[serde(default)]
    pub metadata: Option<UploadMetadata>,
    #[serde(default)]
    pub validation: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn file_type(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.file_type.as_deref())
    }

    /// Turn an embedded `"status": "error"` into a failure
    pub fn into_result(self) -> Result<Self, GatewayError> {
        if self.status.as_deref() == Some("error") {
            let message = self.error.unwrap_or_else(|| "Upload failed".to_string());
            return Err(GatewayError::Application(message));
        }
        if self.file_id.is_empty() {
            return Err(GatewayError::Application(
                "Upload response is missing a file id".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Body of `POST /query`
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub analysis_type: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, analysis_type: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            analysis_type: analysis_type.into(),
        }
    }
}

/// A data source the backend cites for an answer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRef {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// Response body of `POST /query`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub analysis: String,
    /// Certainty in [0, 1]
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub trends: Option<Vec<String>>,
    #[serde(default)]
    pub comparisons: Option<Vec<String>>,
    #[serde(default)]
    pub sources: Option<Vec<SourceRef>>,
}

/// Response body of `GET /insights/{file_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub insights: String,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_summary: String,
}

/// Response body of `GET /stats`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub documents_processed: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub supported_formats: Vec<String>,
}

/// Trait for analysis backends
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Upload one file as multipart field `file`
    async fn upload(&self, source: &UploadSource) -> Result<UploadResponse, GatewayError>;

    /// Ask a natural-language question
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult, GatewayError>;

    /// Generate insights for an uploaded file
    async fn fetch_insights(&self, file_id: &str) -> Result<InsightResult, GatewayError>;

    async fn stats(&self) -> Result<StatsResponse, GatewayError>;

    /// Succeeds iff the health endpoint answers 2xx
    async fn health(&self) -> Result<(), GatewayError>;
}
