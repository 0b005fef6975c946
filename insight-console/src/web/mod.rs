//! Web console: binds HTTP form actions to controller actions
//!
//! Each action mutates the client state through [`InsightApp`] and answers
//! with the page rendered from the new state (or a redirect to it).

use crate::app::InsightApp;
use crate::gateway::UploadSource;
use crate::render::{
    render_files_list, render_insight_file_select, render_recent_uploads, render_system_status,
};
use crate::state::{AnalysisType, Tab};
use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Largest request body accepted by `/upload`
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct TabParams {
    tab: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryForm {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisTypeForm {
    analysis_type: String,
}

#[derive(Debug, Deserialize)]
struct InsightsForm {
    #[serde(default)]
    file_id: String,
}

/// Create the console router
pub fn create_router(app: Arc<InsightApp>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/query", post(submit_query))
        .route("/analysis-type", post(set_analysis_type))
        .route("/sample-query", get(sample_query))
        .route("/insights", post(generate_insights))
        .route("/files/{id}/insights", get(file_insights))
        .route("/files/{id}/query", get(file_query))
        .route("/files/{id}/delete", post(delete_file))
        .route("/fragments/{view}", get(fragment))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn index(State(app): State<Arc<InsightApp>>, Query(params): Query<TabParams>) -> Html<String> {
    if let Some(tab) = params.tab.as_deref().and_then(Tab::from_id) {
        app.switch_tab(tab).await;
    }
    Html(app.render_page().await)
}

async fn upload(
    State(app): State<Arc<InsightApp>>,
    mut multipart: Multipart,
) -> Result<Html<String>, MultipartError> {
    let mut sources = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        // an empty file input still submits one nameless part
        let Some(name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        sources.push(UploadSource::new(name, bytes.to_vec()));
    }

    debug!(files = sources.len(), "Upload form received");
    if sources.is_empty() {
        app.switch_tab(Tab::Upload).await;
    } else {
        app.upload(sources).await;
    }
    Ok(Html(app.render_page().await))
}

async fn submit_query(State(app): State<Arc<InsightApp>>, Form(form): Form<QueryForm>) -> Html<String> {
    if app.submit_query(&form.query).await.is_none() {
        app.switch_tab(Tab::Query).await;
    }
    Html(app.render_page().await)
}

async fn set_analysis_type(
    State(app): State<Arc<InsightApp>>,
    Form(form): Form<AnalysisTypeForm>,
) -> Redirect {
    app.set_analysis_type(AnalysisType::new(form.analysis_type)).await;
    Redirect::to("/?tab=query")
}

async fn sample_query(State(app): State<Arc<InsightApp>>) -> Redirect {
    app.use_sample_query().await;
    Redirect::to("/?tab=query")
}

async fn generate_insights(
    State(app): State<Arc<InsightApp>>,
    Form(form): Form<InsightsForm>,
) -> Html<String> {
    if app.generate_insights(&form.file_id).await.is_none() {
        app.switch_tab(Tab::Insights).await;
    }
    Html(app.render_page().await)
}

async fn file_insights(State(app): State<Arc<InsightApp>>, Path(id): Path<String>) -> Html<String> {
    app.view_file_insights(&id).await;
    Html(app.render_page().await)
}

async fn file_query(State(app): State<Arc<InsightApp>>, Path(id): Path<String>) -> Redirect {
    if app.query_file(&id).await {
        Redirect::to("/?tab=query")
    } else {
        Redirect::to("/?tab=files")
    }
}

async fn delete_file(State(app): State<Arc<InsightApp>>, Path(id): Path<String>) -> Redirect {
    app.delete_file(&id).await;
    Redirect::to("/?tab=files")
}

/// Single regions of the page, for partial refreshes
async fn fragment(
    State(app): State<Arc<InsightApp>>,
    Path(view): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let state = app.snapshot().await;
    let html = match view.as_str() {
        "files" => render_files_list(state.files()),
        "recent" => render_recent_uploads(state.recent_files(app.recent_limit())),
        "select" => render_insight_file_select(state.files(), state.selected_insight_file.as_deref()),
        "status" => render_system_status(&app.monitor().status().await),
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(Html(html))
}
