//! Scripted backend for unit tests

use crate::gateway::{
    AnalysisBackend, GatewayError, InsightResult, QueryRequest, QueryResult, StatsResponse,
    UploadMetadata, UploadResponse, UploadSource,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// In-memory backend that records every call it receives
#[derive(Default)]
pub struct MockBackend {
    /// Upload failures keyed by file name
    upload_failures: HashMap<String, String>,
    query_result: Mutex<Option<QueryResult>>,
    insight_result: Mutex<Option<InsightResult>>,
    healthy: AtomicBool,
    stats_available: AtomicBool,
    documents: u64,
    /// How long each upload takes
    upload_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            stats_available: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn failing_upload(mut self, name: &str, message: &str) -> Self {
        self.upload_failures
            .insert(name.to_string(), message.to_string());
        self
    }

    pub fn with_query_result(self, result: QueryResult) -> Self {
        *self.query_result.lock().unwrap() = Some(result);
        self
    }

    pub fn with_insight_result(self, result: InsightResult) -> Self {
        *self.insight_result.lock().unwrap() = Some(result);
        self
    }

    pub fn with_documents(mut self, documents: u64) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = Some(delay);
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_stats_available(&self, available: bool) {
        self.stats_available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, source: &UploadSource) -> Result<UploadResponse, GatewayError> {
        self.record(format!("upload:{}", source.name));
        match self.upload_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        if let Some(message) = self.upload_failures.get(&source.name) {
            return Err(GatewayError::Application(message.clone()));
        }
        let ext = source.name.rsplit('.').next().map(str::to_string);
        Ok(UploadResponse {
            status: Some("success".to_string()),
            file_id: format!("id-{}", source.name),
            metadata: Some(UploadMetadata {
                file_type: ext,
                filename: Some(source.name.clone()),
            }),
            validation: serde_json::json!({"is_valid": true}),
            error: None,
        })
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResult, GatewayError> {
        self.record(format!("query:{}:{}", request.analysis_type, request.query));
        self.query_result
            .lock()
            .unwrap()
            .clone()
            .ok_or(GatewayError::HttpStatus(500))
    }

    async fn fetch_insights(&self, file_id: &str) -> Result<InsightResult, GatewayError> {
        self.record(format!("insights:{}", file_id));
        self.insight_result
            .lock()
            .unwrap()
            .clone()
            .ok_or(GatewayError::HttpStatus(404))
    }

    async fn stats(&self) -> Result<StatsResponse, GatewayError> {
        self.record("stats".to_string());
        if !self.stats_available.load(Ordering::SeqCst) {
            return Err(GatewayError::HttpStatus(502));
        }
        Ok(StatsResponse {
            documents_processed: Some(self.documents),
            supported_formats: vec!["csv".to_string(), "json".to_string()],
        })
    }

    async fn health(&self) -> Result<(), GatewayError> {
        self.record("health".to_string());
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::HttpStatus(503))
        }
    }
}
