pub mod http;
pub mod local;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::Config;
use crate::dataset::draft::parse_number;
use crate::dataset::DatasetDraft;
use crate::ingest::http::HttpBackend;
use crate::ingest::local::{CsvExtractor, LocalUploader};

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

static EXTRACTION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "total_volume": { "type": "number" },
            "cost_per_unit": { "type": "number" },
            "baseline_value": { "type": "number" },
            "clinician_hours_per_unit": { "type": "number" }
        }
    })
});

pub fn extraction_schema() -> &'static Value {
    &EXTRACTION_SCHEMA
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    #[serde(alias = "file_url")]
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Success,
    Error,
}

/// Backends may return numbers or numeric strings such as `"12,000"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedFields {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cost_per_unit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub baseline_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub clinician_hours_per_unit: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

/// Strings go through the same sanitising as form input; unparseable text
/// is treated as absent.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawNumber::Number(value)) => Some(value),
        Some(RawNumber::Text(text)) => parse_number(&text),
        None => None,
    })
}

impl ExtractedFields {
    /// Returns false for names outside the extraction schema.
    pub fn set(&mut self, field: &str, value: f64) -> bool {
        match field {
            "total_volume" => self.total_volume = Some(value),
            "cost_per_unit" => self.cost_per_unit = Some(value),
            "baseline_value" => self.baseline_value = Some(value),
            "clinician_hours_per_unit" => self.clinician_hours_per_unit = Some(value),
            _ => return false,
        }
        true
    }

    pub fn count(&self) -> usize {
        [
            self.total_volume,
            self.cost_per_unit,
            self.baseline_value,
            self.clinician_hours_per_unit,
        ]
        .iter()
        .filter(|value| value.is_some())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.total_volume.is_none()
            && self.cost_per_unit.is_none()
            && self.baseline_value.is_none()
            && self.clinician_hours_per_unit.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub status: ExtractionStatus,
    #[serde(default)]
    pub output: Option<ExtractedFields>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ExtractionResult {
    pub fn success(output: ExtractedFields) -> Self {
        Self {
            status: ExtractionStatus::Success,
            output: Some(output),
            details: None,
        }
    }

    pub fn failed(details: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Error,
            output: None,
            details: Some(details.into()),
        }
    }
}

#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadedFile>;
}

#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, file_url: &str, schema: &Value) -> Result<ExtractionResult>;
}

/// Outcome of uploading a file and (for CSV) pre-filling the dataset draft.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub uploaded: UploadedFile,
    pub extracted: Option<ExtractedFields>,
    pub draft: DatasetDraft,
}

#[derive(Clone)]
pub struct Ingest {
    uploader: Arc<dyn FileUploader>,
    extractor: Arc<dyn FieldExtractor>,
}

impl Ingest {
    pub fn new(uploader: Arc<dyn FileUploader>, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            uploader,
            extractor,
        }
    }

    /// Remote backend when `backend.base_url` is set, local files otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.backend.base_url.trim().is_empty() {
            let uploader = LocalUploader::new(config.resolved_upload_dir());
            return Ok(Self::new(Arc::new(uploader), Arc::new(CsvExtractor)));
        }
        let backend = Arc::new(HttpBackend::new(
            &config.backend.base_url,
            non_empty(&config.backend.api_key),
        )?);
        Ok(Self::new(backend.clone(), backend))
    }

    pub async fn extract(&self, file_url: &str) -> Result<ExtractionResult> {
        self.extractor
            .extract(file_url, extraction_schema())
            .await
            .context("failed to extract data from file, please try again")
    }

    pub async fn ingest_file(&self, path: &Path, mut draft: DatasetDraft) -> Result<IngestOutcome> {
        ensure_supported(path)?;
        let uploaded = self
            .uploader
            .upload(path)
            .await
            .context("failed to upload file, please try again")?;
        info!("uploaded {} to {}", uploaded.name, uploaded.url);
        draft.file_url = Some(uploaded.url.clone());

        let mut extracted = None;
        if has_extension(path, "csv") {
            let result = self.extract(&uploaded.url).await?;
            match (result.status, result.output) {
                (ExtractionStatus::Success, Some(fields)) => {
                    draft.merge_extracted(&fields);
                    extracted = Some(fields);
                }
                (status, _) => warn!(
                    "extraction returned {status:?}: {}",
                    result.details.as_deref().unwrap_or("no details")
                ),
            }
        }

        Ok(IngestOutcome {
            uploaded,
            extracted,
            draft,
        })
    }
}

pub fn ensure_supported(path: &Path) -> Result<()> {
    if SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| has_extension(path, ext))
    {
        return Ok(());
    }
    Err(anyhow!(
        "unsupported file type {}; expected one of {:?}",
        path.display(),
        SUPPORTED_EXTENSIONS
    ))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string())
}

/// Maps a `file://` URL (or bare path) back to a local path.
pub(crate) fn local_path_from_url(file_url: &str) -> Result<PathBuf> {
    if let Some(stripped) = file_url.strip_prefix("file://") {
        return Ok(PathBuf::from(stripped));
    }
    if file_url.contains("://") {
        return Err(anyhow!(
            "local extraction only supports file URLs, got {file_url}"
        ));
    }
    Ok(PathBuf::from(file_url))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
