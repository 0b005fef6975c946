//! Text formatting helpers shared by all views

use chrono::{DateTime, TimeZone};
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("valid regex"));
static PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+\.?\d*%)").expect("valid regex"));

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Light markdown for backend prose.
///
/// Passes run in a fixed order: line breaks, `**bold**`, `*italic*`, then
/// percentages. Bold must run before italic so the single-asterisk pattern
/// never sees the delimiters of a bold span.
pub fn format_analysis_text(text: &str) -> String {
    let escaped = html_escape(text).replace('\n', "<br>");
    let bold = BOLD.replace_all(&escaped, "<strong>${1}</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>${1}</em>");
    PERCENT
        .replace_all(
            &italic,
            r#"<span style="color: var(--primary-color); font-weight: bold;">${1}</span>"#,
        )
        .into_owned()
}

/// Display tier of a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// `> 0.7` is high, `> 0.4` is medium, anything else (or no score) is low
    pub fn from_score(confidence: Option<f64>) -> Self {
        let c = confidence.unwrap_or(0.0);
        if c > 0.7 {
            ConfidenceTier::High
        } else if c > 0.4 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "confidence-high",
            ConfidenceTier::Medium => "confidence-medium",
            ConfidenceTier::Low => "confidence-low",
        }
    }
}

/// Icon class for a file type; unknown types get a generic file icon
pub fn file_icon(file_type: &str) -> &'static str {
    match file_type {
        "csv" => "fas fa-table",
        "xlsx" | "xls" => "fas fa-file-excel",
        "json" | "xml" => "fas fa-code",
        "pdf" => "fas fa-file-pdf",
        "docx" => "fas fa-file-word",
        "db" | "sqlite" | "sqlite3" | "accdb" | "mdb" => "fas fa-database",
        _ => "fas fa-file",
    }
}

/// `Oct 16, 2026, 09:05 AM`
pub fn format_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}
