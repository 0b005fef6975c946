//! View rendering
//!
//! Every function here maps state or a backend response to an HTML string.
//! Nothing touches the network or mutates state.

mod format;
mod page;
mod views;

pub use format::{ConfidenceTier, file_icon, format_analysis_text, format_date, html_escape};
pub use page::render_page;
pub use views::{
    confidence_badge, render_file_count, render_files_list, render_insight_file_select,
    render_insights, render_insights_error, render_progress, render_query_error,
    render_query_results, render_recent_uploads, render_system_status, render_upload_outcome,
    render_upload_status,
};
