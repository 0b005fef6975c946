//! Sequential upload pipeline
//!
//! Files are uploaded one at a time. Each upload completes before the next
//! request is issued, and a failure never stops the batch. Progress is
//! reported to the subscriber as a stream of [`UploadEvent`]s.

use crate::gateway::{AnalysisBackend, UploadSource};
use crate::state::UploadedFileRecord;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Progress of a batch, reported after every file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub completed: usize,
    pub total: usize,
}

impl UploadProgress {
    /// Completed share as a whole percentage
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) as f64 / self.total as f64).round() as u8
    }
}

/// Events emitted while a batch is processed
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Started { total: usize },
    Uploaded { name: String, record: UploadedFileRecord },
    Failed { name: String, message: String },
    Progress(UploadProgress),
    Finished { succeeded: usize, failed: usize },
}

/// Runs batches of uploads against a backend
#[derive(Clone)]
pub struct UploadPipeline {
    backend: Arc<dyn AnalysisBackend>,
}

impl UploadPipeline {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    /// Run the batch on a background task and return its event stream.
    /// The stream ends after `Finished`.
    pub fn spawn(&self, sources: Vec<UploadSource>) -> (mpsc::Receiver<UploadEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(sources.len().max(1) * 2 + 2);
        let pipeline = self.clone();
        let handle = tokio::spawn(async move {
            pipeline.run(sources, tx).await;
        });
        (rx, handle)
    }

    /// Upload every source in order, sending events to `tx`.
    /// A dropped receiver does not stop the batch.
    pub async fn run(&self, sources: Vec<UploadSource>, tx: mpsc::Sender<UploadEvent>) {
        let total = sources.len();
        let mut succeeded = 0;
        let mut failed = 0;

        info!(total, backend = self.backend.name(), "Starting upload batch");
        let _ = tx.send(UploadEvent::Started { total }).await;

        for (index, source) in sources.into_iter().enumerate() {
            let event = match self.backend.upload(&source).await {
                Ok(response) => {
                    succeeded += 1;
                    debug!(file = %source.name, file_id = %response.file_id, "Upload succeeded");
                    UploadEvent::Uploaded {
                        record: UploadedFileRecord::from_response(&source.name, &response, Utc::now()),
                        name: source.name,
                    }
                }
                Err(e) => {
                    failed += 1;
                    warn!(file = %source.name, error = %e, "Upload failed");
                    UploadEvent::Failed {
                        name: source.name,
                        message: e.to_string(),
                    }
                }
            };
            let _ = tx.send(event).await;
            let _ = tx
                .send(UploadEvent::Progress(UploadProgress {
                    completed: index + 1,
                    total,
                }))
                .await;
        }

        info!(succeeded, failed, "Upload batch finished");
        let _ = tx.send(UploadEvent::Finished { succeeded, failed }).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;

    async fn collect(backend: Arc<MockBackend>, names: &[&str]) -> Vec<UploadEvent> {
        let pipeline = UploadPipeline::new(backend);
        let sources = names
            .iter()
            .map(|n| UploadSource::new(*n, b"data".to_vec()))
            .collect();
        let (mut rx, handle) = pipeline.spawn(sources);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        handle.await.unwrap();
        events
    }

    #[test]
    fn test_progress_percent() {
        let p = |completed, total| UploadProgress { completed, total }.percent();
        assert_eq!(p(1, 3), 33);
        assert_eq!(p(2, 3), 67);
        assert_eq!(p(3, 3), 100);
        assert_eq!(p(0, 0), 100);
    }

    #[tokio::test]
    async fn test_n_files_issue_n_sequential_uploads() {
        let backend = Arc::new(MockBackend::new());
        let events = collect(backend.clone(), &["a.csv", "b.json", "c.pdf"]).await;

        assert_eq!(
            backend.calls(),
            vec!["upload:a.csv", "upload:b.json", "upload:c.pdf"]
        );

        let progress: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                UploadEvent::Progress(p) => Some(p.percent()),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![33, 67, 100]);
    }

    #[tokio::test]
    async fn test_event_order_per_file() {
        let backend = Arc::new(MockBackend::new());
        let events = collect(backend, &["a.csv"]).await;

        assert_eq!(events.len(), 4);
        assert_eq!(events[0], UploadEvent::Started { total: 1 });
        assert!(matches!(&events[1], UploadEvent::Uploaded { name, record } if name == "a.csv" && record.id == "id-a.csv"));
        assert_eq!(
            events[2],
            UploadEvent::Progress(UploadProgress { completed: 1, total: 1 })
        );
        assert_eq!(events[3], UploadEvent::Finished { succeeded: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let backend = Arc::new(
            MockBackend::new().failing_upload("bad.txt", "Unsupported file format: txt"),
        );
        let events = collect(backend.clone(), &["bad.txt", "good.csv"]).await;

        assert_eq!(backend.calls(), vec!["upload:bad.txt", "upload:good.csv"]);
        assert!(events.contains(&UploadEvent::Failed {
            name: "bad.txt".to_string(),
            message: "Unsupported file format: txt".to_string(),
        }));
        assert!(events.iter().any(
            |e| matches!(e, UploadEvent::Uploaded { name, .. } if name == "good.csv")
        ));
        assert_eq!(
            events.last(),
            Some(&UploadEvent::Finished { succeeded: 1, failed: 1 })
        );
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let backend = Arc::new(MockBackend::new());
        let events = collect(backend.clone(), &[]).await;
        assert!(backend.calls().is_empty());
        assert_eq!(
            events,
            vec![
                UploadEvent::Started { total: 0 },
                UploadEvent::Finished { succeeded: 0, failed: 0 }
            ]
        );
    }
}
