//! Application controller
//!
//! `InsightApp` owns the client state, the backend gateway and the status
//! monitor. Every user action (upload, query, insights, delete, tab and
//! analysis-type selection) is a method here; views are rendered from a
//! state snapshot afterwards.

use crate::gateway::{AnalysisBackend, GatewayError, HttpGateway, QueryRequest, UploadSource};
use crate::monitor::StatusMonitor;
use crate::pipeline::{UploadEvent, UploadPipeline};
use crate::render;
use crate::state::{AnalysisType, ClientState, Tab, UploadOutcome};
use crate::ClientConfig;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info, warn};


/// Prompts offered by "Try Sample Query"
pub const SAMPLE_QUERIES: [&str; 6] = [
    "What are the key trends in this dataset?",
    "Show me statistical summary of the data",
    "Identify any outliers or anomalies",
    "Compare performance across different categories",
    "What insights can you derive from this data?",
    "Generate business recommendations based on the analysis",
];

/// Outcome of an upload batch
#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Final progress percentage
    pub progress: u8,
    /// Rendered status panel
    pub status_html: String,
}

pub struct InsightApp {
    backend: Arc<dyn AnalysisBackend>,
    pipeline: UploadPipeline,
    monitor: StatusMonitor,
    state: Arc<RwLock<ClientState>>,
    /// Held for the whole of an upload batch
    batch_lock: Arc<Mutex<()>>,
    recent_limit: usize,
}

fn apply_upload_event(state: &mut ClientState, event: &UploadEvent) {
    match event {
        UploadEvent::Uploaded { name, record } => {
            state.add_file(record.clone());
            state.upload_outcomes.push(UploadOutcome::Uploaded { name: name.clone() });
        }
        UploadEvent::Failed { name, message } => {
            state.upload_outcomes.push(UploadOutcome::Failed {
                name: name.clone(),
                message: message.clone(),
            });
        }
        UploadEvent::Progress(progress) => {
            state.upload_progress = Some(progress.percent());
        }
        UploadEvent::Finished { .. } => {
            state.upload_progress = Some(100);
        }
        UploadEvent::Started { .. } => {}
    }
}

fn summarize(state: &ClientState) -> UploadSummary {
    let succeeded = state.upload_outcomes.iter().filter(|o| o.is_success()).count();
    UploadSummary {
        succeeded,
        failed: state.upload_outcomes.len() - succeeded,
        progress: state.upload_progress.unwrap_or(100),
        status_html: render::render_upload_status(&state.upload_outcomes),
    }
}

impl InsightApp {
    pub fn new(backend: Arc<dyn AnalysisBackend>, config: &ClientConfig) -> Self {
        Self {
            pipeline: UploadPipeline::new(Arc::clone(&backend)),
            monitor: StatusMonitor::new(Arc::clone(&backend)),
            backend,
            state: Arc::new(RwLock::new(ClientState::new())),
            batch_lock: Arc::new(Mutex::new(())),
            recent_limit: config.recent_uploads,
        }
    }

    /// Build an app talking HTTP to `config.api_base_url`
    pub fn from_config(config: &ClientConfig) -> Result<Self, GatewayError> {
        let gateway = HttpGateway::new(&config.api_base_url, config.request_timeout())?;
        Ok(Self::new(Arc::new(gateway), config))
    }

    pub fn monitor(&self) -> &StatusMonitor {
        &self.monitor
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit
    }

    pub async fn snapshot(&self) -> ClientState {
        self.state.read().await.clone()
    }

    /// Render the whole console for the current state
    pub async fn render_page(&self) -> String {
        let status = self.monitor.status().await;
        let state = self.state.read().await;
        render::render_page(&state, &status, self.recent_limit)
    }

    pub async fn switch_tab(&self, tab: Tab) {
        self.state.write().await.active_tab = tab;
    }

    pub async fn set_analysis_type(&self, tag: AnalysisType) {
        debug!(analysis_type = %tag, "Analysis type selected");
        self.state.write().await.set_analysis_type(tag);
    }

    pub async fn upload(&self, sources: Vec<UploadSource>) -> UploadSummary {
        self.upload_with(sources, |_| {}).await
    }

    /// Upload a batch and hand each pipeline event to `observer` as it
    /// arrives.
    ///
    /// Events are applied to the state on a background task, so a batch
    /// that has started runs to completion and lands in the file list even
    /// if this future is dropped. Batches run one at a time; a second batch
    /// waits for the first to finish.
    pub async fn upload_with<F>(&self, sources: Vec<UploadSource>, mut observer: F) -> UploadSummary
    where
        F: FnMut(&UploadEvent),
    {
        let batch_guard = Arc::clone(&self.batch_lock).lock_owned().await;
        {
            let mut state = self.state.write().await;
            state.active_tab = Tab::Upload;
            state.upload_outcomes.clear();
            state.upload_progress = Some(0);
        }

        let (mut events, pipeline_task) = self.pipeline.spawn(sources);
        let (tx, mut forwarded) = mpsc::unbounded_channel();
        let state = Arc::clone(&self.state);

        let applier = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                apply_upload_event(&mut *state.write().await, &event);
                // the caller may be gone; the batch still finishes
                let _ = tx.send(event);
            }
            if let Err(e) = pipeline_task.await {
                warn!(error = %e, "Upload task ended abnormally");
            }

            let summary = summarize(&*state.read().await);
            drop(batch_guard);
            summary
        });

        while let Some(event) = forwarded.recv().await {
            observer(&event);
        }

        match applier.await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Upload state task ended abnormally");
                summarize(&*self.state.read().await)
            }
        }
    }

    /// Submit a query with the current analysis type and render the result
    /// panel. Blank queries are ignored.
    pub async fn submit_query(&self, text: &str) -> Option<String> {
        let query = text.trim();
        if query.is_empty() {
            return None;
        }

        let analysis_type = {
            let mut state = self.state.write().await;
            state.active_tab = Tab::Query;
            state.query_draft = text.to_string();
            state.analysis_type().as_str().to_string()
        };

        let request = QueryRequest::new(query, analysis_type);
        let panel = match self.backend.query(&request).await {
            Ok(result) => {
                info!(analysis_type = %request.analysis_type, confidence = ?result.confidence, "Query answered");
                render::render_query_results(&result)
            }
            Err(e) => {
                warn!(error = %e, "Query failed");
                render::render_query_error(&e.to_string())
            }
        };

        self.state.write().await.query_panel = Some(panel.clone());
        Some(panel)
    }

    /// Generate insights for `file_id` and render the insights panel.
    /// An empty selection is ignored.
    pub async fn generate_insights(&self, file_id: &str) -> Option<String> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return None;
        }

        {
            let mut state = self.state.write().await;
            state.active_tab = Tab::Insights;
            state.selected_insight_file = Some(file_id.to_string());
        }

        let panel = match self.backend.fetch_insights(file_id).await {
            Ok(result) => {
                info!(file_id, "Insights generated");
                render::render_insights(&result)
            }
            Err(e) => {
                warn!(file_id, error = %e, "Insight generation failed");
                render::render_insights_error(&e.to_string())
            }
        };

        self.state.write().await.insights_panel = Some(panel.clone());
        Some(panel)
    }

    /// Files tab "Insights" action
    pub async fn view_file_insights(&self, file_id: &str) -> Option<String> {
        self.generate_insights(file_id).await
    }

    /// Files tab "Query" action: pre-fill the query box for a known file
    pub async fn query_file(&self, file_id: &str) -> bool {
        let mut state = self.state.write().await;
        let Some(name) = state.file(file_id).map(|f| f.name.clone()) else {
            return false;
        };
        state.query_draft = format!("Analyze the data from {}", name);
        state.active_tab = Tab::Query;
        true
    }

    /// Remove a file from the local list.
    ///
    /// No backend call is made: the backend keeps the file.
    pub async fn delete_file(&self, file_id: &str) -> bool {
        let removed = self.state.write().await.remove_file(file_id);
        if removed {
            info!(file_id, "File removed from local list");
        }
        removed
    }

    /// Fill the query box with one of [`SAMPLE_QUERIES`]
    pub async fn use_sample_query(&self) -> &'static str {
        let sample = *SAMPLE_QUERIES
            .choose(&mut rand::thread_rng())
            .unwrap_or(&SAMPLE_QUERIES[0]);

        let mut state = self.state.write().await;
        state.query_draft = sample.to_string();
        state.active_tab = Tab::Query;
        sample
    }
}
