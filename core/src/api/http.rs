//! reqwest-backed query API client.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use probate_types::{AnalyzeResponse, DashboardConfig, Filters, ShortlistPage};

use super::{ApiError, DashboardApi, ShortlistQuery, UploadFile, filter_params, shortlist_params};
use crate::normalize::unwrap_single;
use crate::sources::ChartSource;

/// Deadline for upload and analyze requests, which carry whole files
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Longest error body kept in `ApiError::Status`
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    /// Client with the configured per-request timeout. No retries are made.
    pub fn new(config: &DashboardConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, ApiError> {
        tracing::debug!(path, params = params.len(), "GET");
        let response = self
            .client
            .get(self.url(path))
            .query(params)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                path: path.to_string(),
                source,
            })?;
        read_json(path, response).await
    }

    async fn post_file(
        &self,
        path: &str,
        params: &[(String, String)],
        file: UploadFile,
    ) -> Result<Response, ApiError> {
        tracing::debug!(path, file = %file.file_name, bytes = file.bytes.len(), "POST multipart");
        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new().part("file", part);
        self.client
            .post(self.url(path))
            .query(params)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|source| ApiError::Request {
                path: path.to_string(),
                source,
            })
    }
}

/// Read the body, mapping non-2xx to `Status`.
async fn read_body(path: &str, response: Response) -> Result<Vec<u8>, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(|source| ApiError::Request {
        path: path.to_string(),
        source,
    })?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        return Err(ApiError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            body: text.trim().chars().take(MAX_ERROR_BODY).collect(),
        });
    }
    Ok(body.to_vec())
}

/// Successful body as JSON. An empty body reads as null.
async fn read_json(path: &str, response: Response) -> Result<Value, ApiError> {
    let body = read_body(path, response).await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(path: &str, raw: Value) -> Result<T, ApiError> {
    serde_json::from_value(unwrap_single(raw)).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

impl DashboardApi for HttpApi {
    async fn fetch_chart(&self, source: ChartSource, filters: &Filters) -> Result<Value, ApiError> {
        let path = format!("/charts/{}", source.endpoint());
        self.get(&path, &filter_params(filters)).await
    }

    async fn fetch_shortlist(&self, query: &ShortlistQuery) -> Result<ShortlistPage, ApiError> {
        let raw = self.get("/shortlist", &shortlist_params(query)).await?;
        decode("/shortlist", raw)
    }

    async fn upload(&self, file: UploadFile) -> Result<(), ApiError> {
        // Only the status matters; the body is whatever the ingest reports
        let response = self.post_file("/upload", &[], file).await?;
        read_body("/upload", response).await?;
        Ok(())
    }

    async fn analyze(&self, file: UploadFile, max_records: u32) -> Result<AnalyzeResponse, ApiError> {
        let params = [("max_records".to_string(), max_records.to_string())];
        let response = self.post_file("/analyze", &params, file).await?;
        let raw = read_json("/analyze", response).await?;
        decode("/analyze", raw)
    }
}
