//! Whole-page rendering: one pure function from state to document

use super::format::html_escape;
use super::views::{
    render_file_count, render_files_list, render_insight_file_select, render_progress,
    render_recent_uploads, render_system_status, render_upload_status,
};
use crate::monitor::SystemStatus;
use crate::state::{AnalysisType, ClientState, Tab};

const STYLE: &str = r#"
:root {
    --primary-color: #667eea;
    --success-color: #48bb78;
    --error-color: #f56565;
    --text-secondary: #718096;
    --card: #ffffff;
    --bg: #f4f6fb;
}
* { box-sizing: border-box; }
body { font-family: system-ui, sans-serif; background: var(--bg); margin: 0; color: #2d3748; }
header { display: flex; justify-content: space-between; align-items: center; padding: 1rem 2rem; background: var(--card); }
nav a { margin-right: 1rem; text-decoration: none; color: var(--text-secondary); }
nav a.active { color: var(--primary-color); font-weight: 600; }
main { display: grid; grid-template-columns: 1fr 280px; gap: 1.5rem; padding: 2rem; }
.tab-content { display: none; }
.tab-content.active { display: block; }
.card, .result-card { background: var(--card); border-radius: 12px; padding: 1.5rem; margin-bottom: 1.5rem; }
.error-card { border: 1px solid var(--error-color); }
.error-text { color: var(--error-color); }
.accent-text { color: var(--primary-color); }
.muted { color: var(--text-secondary); }
.centered { text-align: center; padding: 1rem; }
.empty-state { text-align: center; padding: 3rem; color: var(--text-secondary); }
.file-item { display: flex; justify-content: space-between; align-items: center; padding: 0.8rem; margin: 0.5rem 0; background: var(--bg); border-radius: 8px; }
.file-meta { font-size: 0.8rem; color: var(--text-secondary); }
.upload-ok { border-left: 3px solid var(--success-color); }
.upload-failed { border-left: 3px solid var(--error-color); }
.progress-bar { height: 6px; background: #e2e8f0; border-radius: 3px; }
.progress-fill { height: 100%; background: var(--primary-color); border-radius: 3px; }
.confidence-badge { padding: 0.2rem 0.6rem; border-radius: 12px; font-size: 0.8rem; }
.confidence-high { background: rgba(72, 187, 120, 0.15); color: var(--success-color); }
.confidence-medium { background: rgba(236, 201, 75, 0.2); color: #b7791f; }
.confidence-low { background: rgba(245, 101, 101, 0.15); color: var(--error-color); }
.analysis-option.active { background: var(--primary-color); color: #fff; }
.status-dot { display: inline-block; width: 8px; height: 8px; border-radius: 50%; margin-right: 0.4rem; }
.status-dot.status-ok { background: var(--success-color); }
.status-dot.status-error { background: var(--error-color); }
.status-dot.status-pending { background: var(--text-secondary); }
.status-error { color: var(--error-color); }
"#;

fn shortcut_script() -> String {
    let cases: String = Tab::ALL
        .iter()
        .map(|tab| format!("'{}': '{}',", tab.shortcut(), tab.id()))
        .collect();
    format!(
        r#"<script>
const TAB_SHORTCUTS = {{{cases}}};
document.addEventListener('keydown', function (e) {{
    if ((e.ctrlKey || e.metaKey) && TAB_SHORTCUTS[e.key]) {{
        e.preventDefault();
        window.location.href = '/?tab=' + TAB_SHORTCUTS[e.key];
    }}
}});
</script>"#
    )
}

fn nav(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            let class = if *tab == active { "nav-link active" } else { "nav-link" };
            format!(
                r#"<a class="{}" href="/?tab={}" title="Ctrl+{}">{}</a>"#,
                class,
                tab.id(),
                tab.shortcut(),
                tab.label()
            )
        })
        .collect()
}

fn tab_section(tab: Tab, active: Tab, body: String) -> String {
    let class = if tab == active { "tab-content active" } else { "tab-content" };
    format!(
        r#"<section id="{}-tab" class="{}">{}</section>"#,
        tab.id(),
        class,
        body
    )
}

fn upload_tab(state: &ClientState, status: &SystemStatus) -> String {
    let accept = status
        .supported_formats
        .iter()
        .map(|f| format!(".{}", html_escape(f)))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"<div class="card">
<h2><i class="fas fa-cloud-upload-alt"></i> Upload Data Files</h2>
<form method="post" action="/upload" enctype="multipart/form-data">
<input type="file" name="file" multiple accept="{accept}">
<button class="btn" type="submit">Upload</button>
</form>
<div id="progressBar">{progress}</div>
<div id="uploadStatus">{outcomes}</div>
</div>"#,
        progress = render_progress(state.upload_progress),
        outcomes = render_upload_status(&state.upload_outcomes),
    )
}

fn analysis_options(current: &AnalysisType) -> String {
    AnalysisType::KNOWN
        .iter()
        .map(|(tag, label)| {
            let class = if current.as_str() == *tag {
                "analysis-option active"
            } else {
                "analysis-option"
            };
            format!(
                r#"<button class="{}" type="submit" name="analysis_type" value="{}">{}</button>"#,
                class, tag, label
            )
        })
        .collect()
}

fn query_tab(state: &ClientState) -> String {
    format!(
        r#"<div class="card">
<h2><i class="fas fa-comments"></i> Ask Your Data</h2>
<form method="post" action="/analysis-type" class="analysis-types">{options}</form>
<form method="post" action="/query">
<textarea id="queryInput" name="query" rows="4" placeholder="Ask a question about your data...">{draft}</textarea>
<button id="querySubmit" class="btn" type="submit"><i class="fas fa-paper-plane"></i></button>
</form>
<a class="btn btn-secondary" href="/sample-query"><i class="fas fa-lightbulb"></i> Try Sample Query</a>
</div>
<div id="queryResults">{results}</div>"#,
        options = analysis_options(state.analysis_type()),
        draft = html_escape(&state.query_draft),
        results = state.query_panel.as_deref().unwrap_or(""),
    )
}

fn files_tab(state: &ClientState) -> String {
    format!(
        r#"<div class="card">
<div class="card-header"><h2><i class="fas fa-folder"></i> Uploaded Files</h2><span id="fileCount">{count}</span></div>
<div id="filesList">{list}</div>
</div>"#,
        count = render_file_count(state.files().len()),
        list = render_files_list(state.files()),
    )
}

fn insights_tab(state: &ClientState) -> String {
    format!(
        r#"<div class="card">
<h2><i class="fas fa-lightbulb"></i> Generate Insights</h2>
<form method="post" action="/insights">
<select id="insightFileSelect" name="file_id">{options}</select>
<button id="generateInsights" class="btn" type="submit"><i class="fas fa-magic"></i> Generate Insights</button>
</form>
</div>
<div id="insightsResults">{results}</div>"#,
        options = render_insight_file_select(state.files(), state.selected_insight_file.as_deref()),
        results = state.insights_panel.as_deref().unwrap_or(""),
    )
}

fn sidebar(state: &ClientState, recent_limit: usize) -> String {
    format!(
        r#"<aside>
<div class="card"><h4>Total Files</h4><div id="totalFiles">{total}</div></div>
<div class="card"><h4>Recent Uploads</h4><div id="recentUploads">{recent}</div></div>
</aside>"#,
        total = state.files().len(),
        recent = render_recent_uploads(state.recent_files(recent_limit)),
    )
}

/// Render the complete console document for `state`
pub fn render_page(state: &ClientState, status: &SystemStatus, recent_limit: usize) -> String {
    let active = state.active_tab;
    let tabs = [
        tab_section(Tab::Upload, active, upload_tab(state, status)),
        tab_section(Tab::Query, active, query_tab(state)),
        tab_section(Tab::Files, active, files_tab(state)),
        tab_section(Tab::Insights, active, insights_tab(state)),
    ]
    .concat();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Insight Console</title>
<style>{style}</style>
</head>
<body>
<header>
<h1><i class="fas fa-chart-pie"></i> Insight Console</h1>
<nav>{nav}</nav>
<div class="system-status">{status}</div>
</header>
<main>
<div class="tabs">{tabs}</div>
{sidebar}
</main>
{script}
</body>
</html>"#,
        style = STYLE,
        nav = nav(active),
        status = render_system_status(status),
        tabs = tabs,
        sidebar = sidebar(state, recent_limit),
        script = shortcut_script(),
    )
}
