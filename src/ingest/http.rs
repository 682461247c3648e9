use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ingest::{file_name, ExtractionResult, FieldExtractor, FileUploader, UploadedFile};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;

/// Client for a hosted upload/extraction backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("health-whatif/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

async fn read_json(url: &str, response: Response) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("failed reading response body: {url}"))?;
    if !status.is_success() {
        let preview: String = body.chars().take(180).collect();
        return Err(anyhow!("POST {url} returned {status}: {preview}"));
    }
    serde_json::from_str(&body).with_context(|| format!("invalid JSON response: {url}"))
}

#[async_trait]
impl FileUploader for HttpBackend {
    async fn upload(&self, path: &Path) -> Result<UploadedFile> {
        let url = self.endpoint("integrations/upload");
        let name = file_name(path);
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed reading upload: {}", path.display()))?;
        let response = self
            .authorize(self.client.post(&url))
            .header("content-type", "application/octet-stream")
            .header("x-file-name", name.as_str())
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("failed POST request: {url}"))?;
        let value = read_json(&url, response).await?;
        let parsed: UploadResponse = serde_json::from_value(value)
            .with_context(|| format!("upload response missing file_url: {url}"))?;
        Ok(UploadedFile {
            name,
            url: parsed.file_url,
        })
    }
}

#[async_trait]
impl FieldExtractor for HttpBackend {
    async fn extract(&self, file_url: &str, schema: &Value) -> Result<ExtractionResult> {
        let url = self.endpoint("integrations/extract");
        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "file_url": file_url, "json_schema": schema }))
            .send()
            .await
            .with_context(|| format!("failed POST request: {url}"))?;
        let value = read_json(&url, response).await?;
        serde_json::from_value(value).with_context(|| format!("unexpected extraction payload: {url}"))
    }
}
