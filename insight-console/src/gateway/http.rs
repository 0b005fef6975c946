//! HTTP gateway to the analysis backend

use super::{
    AnalysisBackend, GatewayError, InsightResult, QueryRequest, QueryResult, StatsResponse,
    UploadResponse, UploadSource,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// reqwest-backed gateway. No retries, no backoff, no auth.
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for `base_url` (origin + `/api`)
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = Client::builder()
            .user_agent(format!("insight-console/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::HttpStatus(status.as_u16()));
    }
    Ok(response)
}

#[async_trait]
impl AnalysisBackend for HttpGateway {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn upload(&self, source: &UploadSource) -> Result<UploadResponse, GatewayError> {
        let part = Part::bytes(source.bytes.clone()).file_name(source.name.clone());
        let form = Form::new().part("file", part);

        debug!(file = %source.name, bytes = source.bytes.len(), "Uploading file");

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;

        let body: UploadResponse = check_status(response)?.json().await?;
        body.into_result()
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResult, GatewayError> {
        debug!(analysis_type = %request.analysis_type, "Submitting query");

        let response = self
            .client
            .post(self.url("/query"))
            .json(request)
            .send()
            .await?;

        Ok(check_status(response)?.json().await?)
    }

    async fn fetch_insights(&self, file_id: &str) -> Result<InsightResult, GatewayError> {
        let url = self.url(&format!("/insights/{}", urlencoding::encode(file_id)));
        debug!(file_id, "Requesting insights");

        let response = self.client.get(url).send().await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn stats(&self) -> Result<StatsResponse, GatewayError> {
        let response = self.client.get(self.url("/stats")).send().await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn health(&self) -> Result<(), GatewayError> {
        let response = self.client.get(self.url("/health")).send().await?;
        check_status(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Multipart, Path};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    /// Serve `api` under `/api` on an ephemeral port and return the base URL
    async fn spawn_backend(api: Router) -> String {
        let app = Router::new().nest("/api", api);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    async fn echo_upload(mut multipart: Multipart) -> Json<Value> {
        let mut name = String::new();
        let mut size = 0;
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() == Some("file") {
                name = field.file_name().unwrap_or_default().to_string();
                size = field.bytes().await.unwrap().len();
            }
        }
        if name.ends_with(".txt") {
            return Json(json!({
                "file_id": "rejected",
                "status": "error",
                "error": "Unsupported file format: txt"
            }));
        }
        Json(json!({
            "file_id": format!("id-{}", name),
            "status": "success",
            "metadata": {"file_type": name.rsplit('.').next(), "filename": name},
            "validation": {"is_valid": true, "bytes": size}
        }))
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let base = spawn_backend(Router::new().route("/upload", post(echo_upload))).await;
        let gateway = HttpGateway::new(&base, None).unwrap();

        let response = gateway
            .upload(&UploadSource::new("sales.csv", b"a,b\n1,2\n".to_vec()))
            .await
            .unwrap();
        assert_eq!(response.file_id, "id-sales.csv");
        assert_eq!(response.file_type(), Some("csv"));
        assert_eq!(response.validation["bytes"], 8);
    }

    #[tokio::test]
    async fn test_upload_embedded_error() {
        let base = spawn_backend(Router::new().route("/upload", post(echo_upload))).await;
        let gateway = HttpGateway::new(&base, None).unwrap();

        let err = gateway
            .upload(&UploadSource::new("notes.txt", b"hello".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Application(_)));
        assert_eq!(err.to_string(), "Unsupported file format: txt");
    }

    #[tokio::test]
    async fn test_query_posts_json_body() {
        let api = Router::new().route(
            "/query",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "analysis": format!("{} / {}", body["query"].as_str().unwrap(), body["analysis_type"].as_str().unwrap()),
                    "confidence": 0.82,
                    "trends": ["Trend detected: growth"]
                }))
            }),
        );
        let gateway = HttpGateway::new(spawn_backend(api).await, None).unwrap();

        let result = gateway
            .query(&QueryRequest::new("Top regions?", "trend"))
            .await
            .unwrap();
        assert_eq!(result.analysis, "Top regions? / trend");
        assert_eq!(result.confidence, Some(0.82));
        assert_eq!(result.trends.unwrap(), vec!["Trend detected: growth"]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_failure() {
        let api = Router::new()
            .route("/query", post(|| async { StatusCode::BAD_REQUEST }))
            .route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let gateway = HttpGateway::new(spawn_backend(api).await, None).unwrap();

        let err = gateway
            .query(&QueryRequest::new("x", "general"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 400");
        assert!(matches!(
            gateway.health().await,
            Err(GatewayError::HttpStatus(503))
        ));
    }

    #[tokio::test]
    async fn test_upload_server_error_is_http_failure() {
        let api = Router::new().route("/upload", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let gateway = HttpGateway::new(spawn_backend(api).await, None).unwrap();

        let err = gateway
            .upload(&UploadSource::new("sales.csv", b"a,b\n".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::HttpStatus(500)));
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn test_stats_with_null_formats() {
        let api = Router::new().route(
            "/stats",
            get(|| async { Json(json!({"documents_processed": 7, "supported_formats": null})) }),
        );
        let gateway = HttpGateway::new(spawn_backend(api).await, None).unwrap();

        let stats = gateway.stats().await.unwrap();
        assert_eq!(stats.documents_processed, Some(7));
        assert!(stats.supported_formats.is_empty());
    }

    #[tokio::test]
    async fn test_insights_path_and_stats() {
        let api = Router::new()
            .route(
                "/insights/{file_id}",
                get(|Path(file_id): Path<String>| async move {
                    Json(json!({
                        "insights": format!("insights for {}", file_id),
                        "recommendations": ["You should restock"],
                        "data_summary": "3 rows..."
                    }))
                }),
            )
            .route(
                "/stats",
                get(|| async { Json(json!({"documents_processed": 42, "supported_formats": ["csv"]})) }),
            )
            .route("/health", get(|| async { Json(json!({"status": "healthy"})) }));
        let gateway = HttpGateway::new(format!("{}/", spawn_backend(api).await), None).unwrap();

        let insights = gateway.fetch_insights("abc-123").await.unwrap();
        assert_eq!(insights.insights, "insights for abc-123");
        assert_eq!(insights.data_summary, "3 rows...");

        let stats = gateway.stats().await.unwrap();
        assert_eq!(stats.documents_processed, Some(42));
        assert_eq!(stats.supported_formats, vec!["csv"]);

        assert!(gateway.health().await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = HttpGateway::new(format!("http://{}/api", addr), None).unwrap();
        assert!(matches!(
            gateway.health().await,
            Err(GatewayError::Network(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gateway = HttpGateway::new("http://localhost:5000/api/", None).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:5000/api");
        assert_eq!(gateway.url("/stats"), "http://localhost:5000/api/stats");
    }
}
