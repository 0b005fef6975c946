//! HTML fragments for each region of the console

use super::format::{ConfidenceTier, file_icon, format_analysis_text, format_date, html_escape};
use crate::gateway::{InsightResult, QueryResult, SourceRef};
use crate::monitor::{ServiceState, SystemStatus};
use crate::state::{UploadOutcome, UploadedFileRecord};
use chrono::Local;

fn local_date(record: &UploadedFileRecord) -> String {
    format_date(&record.uploaded_at.with_timezone(&Local))
}

fn record_icon(record: &UploadedFileRecord) -> &'static str {
    file_icon(record.file_type.as_deref().unwrap_or(""))
}

fn item_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!(r#"<div class="source-item">{}</div>"#, html_escape(item)))
        .collect()
}

fn source_list(sources: &[SourceRef]) -> String {
    sources
        .iter()
        .map(|source| {
            format!(
                r#"<div class="source-item"><strong>{}</strong> ({})</div>"#,
                html_escape(source.filename.as_deref().unwrap_or("Unknown")),
                html_escape(source.file_type.as_deref().unwrap_or("Unknown type")),
            )
        })
        .collect()
}

/// Badge showing the rounded confidence percentage in its tier colour
pub fn confidence_badge(confidence: Option<f64>) -> String {
    let tier = ConfidenceTier::from_score(confidence);
    let percent = (confidence.unwrap_or(0.0) * 100.0).round() as i64;
    format!(
        r#"<span class="confidence-badge {}">{}% Confidence</span>"#,
        tier.css_class(),
        percent
    )
}

pub fn render_query_results(result: &QueryResult) -> String {
    let mut html = format!(
        r#"<div class="result-card fade-in">
<div class="result-header"><h4><i class="fas fa-brain"></i> Analysis Results</h4>{}</div>
<div class="result-content">{}</div>"#,
        confidence_badge(result.confidence),
        format_analysis_text(&result.analysis),
    );

    // trends and comparisons show up whenever the backend sends them
    if let Some(trends) = &result.trends {
        html.push_str(&format!(
            r#"<div class="sources"><h5><i class="fas fa-arrow-trend-up"></i> Trends Identified</h5>{}</div>"#,
            item_list(trends)
        ));
    }
    if let Some(comparisons) = &result.comparisons {
        html.push_str(&format!(
            r#"<div class="sources"><h5><i class="fas fa-balance-scale"></i> Comparisons</h5>{}</div>"#,
            item_list(comparisons)
        ));
    }
    if let Some(sources) = result.sources.as_ref().filter(|s| !s.is_empty()) {
        html.push_str(&format!(
            r#"<div class="sources"><h5><i class="fas fa-file-alt"></i> Data Sources</h5>{}</div>"#,
            source_list(sources)
        ));
    }

    html.push_str("</div>");
    html
}

pub fn render_query_error(message: &str) -> String {
    format!(
        r#"<div class="result-card error-card">
<div class="result-header"><h4 class="error-text"><i class="fas fa-exclamation-triangle"></i> Error</h4></div>
<div class="result-content">{}</div>
</div>"#,
        html_escape(message)
    )
}

pub fn render_insights(result: &InsightResult) -> String {
    let recommendations = match result.recommendations.as_deref() {
        Some(recs) if !recs.is_empty() => format!(
            r#"<div class="sources"><h5><i class="fas fa-bullseye"></i> Key Recommendations</h5>{}</div>"#,
            item_list(recs)
        ),
        _ => String::new(),
    };

    format!(
        r#"<div class="card fade-in insights-card">
<h3 class="accent-text"><i class="fas fa-lightbulb"></i> Business Insights</h3>
<div class="result-content">{}</div>
{}
<div class="data-summary">
<h5><i class="fas fa-info-circle"></i> Data Summary</h5>
<p class="muted">{}</p>
</div>
</div>"#,
        format_analysis_text(&result.insights),
        recommendations,
        html_escape(&result.data_summary),
    )
}

pub fn render_insights_error(message: &str) -> String {
    format!(
        r#"<div class="card error-card insights-card">
<h4 class="error-text"><i class="fas fa-exclamation-triangle"></i> Error Generating Insights</h4>
<p>{}</p>
</div>"#,
        html_escape(message)
    )
}

/// One status line of an upload batch
pub fn render_upload_outcome(outcome: &UploadOutcome) -> String {
    match outcome {
        UploadOutcome::Uploaded { name } => format!(
            r#"<div class="file-item slide-in upload-ok"><span><i class="fas fa-check-circle"></i> {} uploaded successfully</span></div>"#,
            html_escape(name)
        ),
        UploadOutcome::Failed { name, message } => format!(
            r#"<div class="file-item slide-in upload-failed"><span><i class="fas fa-exclamation-circle"></i> Failed to upload {}: {}</span></div>"#,
            html_escape(name),
            html_escape(message)
        ),
    }
}

pub fn render_upload_status(outcomes: &[UploadOutcome]) -> String {
    outcomes.iter().map(render_upload_outcome).collect()
}

/// Progress bar for the last batch; nothing when no batch has run
pub fn render_progress(progress: Option<u8>) -> String {
    match progress {
        Some(percent) => format!(
            r#"<div class="progress-bar"><div class="progress-fill" style="width: {}%"></div></div>"#,
            percent.min(100)
        ),
        None => String::new(),
    }
}

pub fn render_file_count(count: usize) -> String {
    format!("{} files", count)
}

/// The Files tab list, or its empty state
pub fn render_files_list(files: &[UploadedFileRecord]) -> String {
    if files.is_empty() {
        return r#"<div class="empty-state">
<i class="fas fa-folder-open"></i>
<p>No files uploaded yet</p>
<a class="btn" href="/?tab=upload">Upload Your First File</a>
</div>"#
            .to_string();
    }

    files
        .iter()
        .map(|file| {
            let id = urlencoding::encode(&file.id);
            format!(
                r#"<div class="file-item slide-in">
<div class="file-info">
<i class="file-icon {icon}"></i>
<div><div class="file-name">{name}</div><div class="file-meta">{kind} &bull; {date}</div></div>
</div>
<div class="file-actions">
<a class="action-btn" href="/files/{id}/insights"><i class="fas fa-chart-line"></i> Insights</a>
<a class="action-btn" href="/files/{id}/query"><i class="fas fa-search"></i> Query</a>
<form method="post" action="/files/{id}/delete" onsubmit="return confirm('Are you sure you want to delete this file?')">
<button class="action-btn" type="submit"><i class="fas fa-trash"></i> Delete</button>
</form>
</div>
</div>"#,
                icon = record_icon(file),
                name = html_escape(&file.name),
                kind = html_escape(&file.type_label()),
                date = local_date(file),
                id = id,
            )
        })
        .collect()
}

/// Sidebar list of the newest uploads
pub fn render_recent_uploads<'a>(recent: impl IntoIterator<Item = &'a UploadedFileRecord>) -> String {
    let items: String = recent
        .into_iter()
        .map(|file| {
            format!(
                r#"<div class="file-item compact"><div class="file-info"><i class="{}"></i><div><div class="file-name">{}</div><div class="file-meta">{}</div></div></div></div>"#,
                record_icon(file),
                html_escape(&file.name),
                local_date(file),
            )
        })
        .collect();

    if items.is_empty() {
        r#"<div class="muted centered">No files uploaded yet</div>"#.to_string()
    } else {
        items
    }
}

/// `<option>`s for the insights file selector
pub fn render_insight_file_select(files: &[UploadedFileRecord], selected: Option<&str>) -> String {
    let mut html = String::from(r#"<option value="">Select a file for insights...</option>"#);
    for file in files {
        let marker = if selected == Some(file.id.as_str()) { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{}"{}>{} ({})</option>"#,
            html_escape(&file.id),
            marker,
            html_escape(&file.name),
            html_escape(&file.type_label()),
        ));
    }
    html
}

/// Connection dot and label, service state and document count
pub fn render_system_status(status: &SystemStatus) -> String {
    let (connection_class, connection_label) = match status.connected {
        Some(true) => ("status-ok", "Connected"),
        Some(false) => ("status-error", "Disconnected"),
        None => ("status-pending", "Connecting..."),
    };
    let (service_class, service_label) = match status.service {
        ServiceState::Online => ("status-ok", "Online"),
        ServiceState::Offline => ("status-error", "Offline"),
        ServiceState::Unknown => ("status-pending", "Checking..."),
    };

    format!(
        r#"<div class="status-indicator"><span class="status-dot {connection_class}"></span><span id="connectionStatus">{connection_label}</span></div>
<div class="stat"><span class="stat-label">System</span> <span id="systemStatus" class="{service_class}">{service_label}</span></div>
<div class="stat"><span class="stat-label">Documents</span> <span id="totalDocs">{docs}</span></div>"#,
        docs = status.documents_processed,
    )
}
