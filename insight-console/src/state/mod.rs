//! Client-side state: uploaded files, analysis type and view state
//!
//! Nothing here is persisted or reconciled with the backend. The file list
//! reflects only the uploads of the current session.

use crate::gateway::UploadResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about a successfully uploaded file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFileRecord {
    /// Identifier issued by the backend
    pub id: String,
    /// Name of the file on the client side
    pub name: String,
    /// Extension-derived type reported by the backend
    pub file_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    /// Opaque validation report from the backend
    pub validation: serde_json::Value,
}

impl UploadedFileRecord {
    pub fn from_response(name: impl Into<String>, response: &UploadResponse, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id: response.file_id.clone(),
            name: name.into(),
            file_type: response.file_type().map(str::to_string),
            uploaded_at,
            validation: response.validation.clone(),
        }
    }

    /// Upper-cased type label, `UNKNOWN` when the backend sent none
    pub fn type_label(&self) -> String {
        self.file_type.as_deref().unwrap_or("unknown").to_uppercase()
    }
}

/// Analysis mode sent with every query. Any string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisType(String);

impl AnalysisType {
    /// Tags the backend distinguishes, with their display labels
    pub const KNOWN: [(&'static str, &'static str); 4] = [
        ("general", "General"),
        ("statistical", "Statistical"),
        ("trend", "Trends"),
        ("comparative", "Comparative"),
    ];

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AnalysisType {
    fn default() -> Self {
        Self::new("general")
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four console views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Tab {
    #[default]
    Upload,
    Query,
    Files,
    Insights,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Upload, Tab::Query, Tab::Files, Tab::Insights];

    pub fn id(&self) -> &'static str {
        match self {
            Tab::Upload => "upload",
            Tab::Query => "query",
            Tab::Files => "files",
            Tab::Insights => "insights",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Upload => "Upload",
            Tab::Query => "Query",
            Tab::Files => "Files",
            Tab::Insights => "Insights",
        }
    }

    /// Digit that selects this tab together with Ctrl or Cmd
    pub fn shortcut(&self) -> char {
        match self {
            Tab::Upload => '1',
            Tab::Query => '2',
            Tab::Files => '3',
            Tab::Insights => '4',
        }
    }

    pub fn from_id(id: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|t| t.id() == id)
    }

    /// Map a key press to a tab. Only Ctrl/Cmd + 1..4 match.
    pub fn from_shortcut(key: char, ctrl: bool, meta: bool) -> Option<Tab> {
        if !(ctrl || meta) {
            return None;
        }
        Tab::ALL.into_iter().find(|t| t.shortcut() == key)
    }
}

/// Result of one file in an upload batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UploadOutcome {
    Uploaded { name: String },
    Failed { name: String, message: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

/// Everything the views are rendered from
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    files: Vec<UploadedFileRecord>,
    analysis_type: AnalysisType,

    pub active_tab: Tab,
    /// Text in the query box
    pub query_draft: String,
    /// File chosen in the insights selector
    pub selected_insight_file: Option<String>,
    /// Progress of the last upload batch, 0..=100
    pub upload_progress: Option<u8>,
    pub upload_outcomes: Vec<UploadOutcome>,
    /// Last rendered query panel
    pub query_panel: Option<String>,
    /// Last rendered insights panel
    pub insights_panel: Option<String>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files in upload completion order
    pub fn files(&self) -> &[UploadedFileRecord] {
        &self.files
    }

    pub fn file(&self, id: &str) -> Option<&UploadedFileRecord> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Append a record. Ids are not de-duplicated.
    pub fn add_file(&mut self, record: UploadedFileRecord) {
        self.files.push(record);
    }

    /// Remove every record with `id`, keeping the others in order.
    /// Returns whether anything was removed.
    pub fn remove_file(&mut self, id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        if self.selected_insight_file.as_deref() == Some(id) {
            self.selected_insight_file = None;
        }
        self.files.len() != before
    }

    /// Most recent uploads, newest first
    pub fn recent_files(&self, limit: usize) -> impl Iterator<Item = &UploadedFileRecord> {
        self.files.iter().rev().take(limit)
    }

    pub fn analysis_type(&self) -> &AnalysisType {
        &self.analysis_type
    }

    pub fn set_analysis_type(&mut self, tag: AnalysisType) {
        self.analysis_type = tag;
    }
}
