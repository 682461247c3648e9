use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::dataset::draft::parse_number;
use crate::ingest::{
    file_name, local_path_from_url, ExtractedFields, ExtractionResult, FieldExtractor,
    FileUploader, UploadedFile,
};

/// Stores uploads under a directory, keyed by content hash.
#[derive(Debug, Clone)]
pub struct LocalUploader {
    dir: PathBuf,
}

impl LocalUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl FileUploader for LocalUploader {
    async fn upload(&self, path: &Path) -> Result<UploadedFile> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed reading upload: {}", path.display()))?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed creating upload directory: {}", self.dir.display()))?;

        let name = file_name(path);
        let digest = sha256_hex(&bytes);
        let dest = self.dir.join(format!("{}-{name}", &digest[..16]));
        tokio::fs::write(&dest, &bytes)
            .await
            .with_context(|| format!("failed writing upload: {}", dest.display()))?;
        let absolute = tokio::fs::canonicalize(&dest).await?;
        debug!("stored {} bytes at {}", bytes.len(), absolute.display());

        Ok(UploadedFile {
            name,
            url: format!("file://{}", absolute.display()),
        })
    }
}

/// Pulls schema fields out of a local CSV file.
///
/// Two layouts are understood: a header row naming the fields, or two-column
/// `field,value` rows.
#[derive(Debug, Clone, Copy)]
pub struct CsvExtractor;

#[async_trait]
impl FieldExtractor for CsvExtractor {
    async fn extract(&self, file_url: &str, schema: &Value) -> Result<ExtractionResult> {
        let path = local_path_from_url(file_url)?;
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed reading {}", path.display()))?;
        let wanted = schema_fields(schema);
        let fields = extract_fields(&bytes, &wanted)?;
        if fields.is_empty() {
            return Ok(ExtractionResult::failed(format!(
                "no columns matched {wanted:?}"
            )));
        }
        Ok(ExtractionResult::success(fields))
    }
}

fn schema_fields(schema: &Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

/// Reads both layouts and keeps whichever recognises more fields. A
/// key/value file whose first key is a field name also looks like a header
/// row, so neither layout can be ruled out from the first row alone.
pub fn extract_fields(bytes: &[u8], wanted: &[String]) -> Result<ExtractedFields> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("malformed CSV")?;

    let by_header = header_layout(&rows, wanted);
    let by_key = key_value_layout(&rows, wanted);
    if by_key.count() > by_header.count() {
        Ok(by_key)
    } else {
        Ok(by_header)
    }
}

fn header_layout(rows: &[csv::StringRecord], wanted: &[String]) -> ExtractedFields {
    let mut fields = ExtractedFields::default();
    let Some((header, body)) = rows.split_first() else {
        return fields;
    };
    for (idx, name) in header.iter().enumerate() {
        let name = normalize_header(name);
        if !wanted.contains(&name) {
            continue;
        }
        let first = body
            .iter()
            .filter_map(|row| row.get(idx))
            .find_map(parse_number);
        if let Some(value) = first {
            fields.set(&name, value);
        }
    }
    fields
}

fn key_value_layout(rows: &[csv::StringRecord], wanted: &[String]) -> ExtractedFields {
    let mut fields = ExtractedFields::default();
    for row in rows {
        let (Some(key), Some(raw)) = (row.get(0), row.get(1)) else {
            continue;
        };
        let key = normalize_header(key);
        if !wanted.contains(&key) {
            continue;
        }
        if let Some(value) = parse_number(raw) {
            fields.set(&key, value);
        }
    }
    fields
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use crate::ingest::extraction_schema;

    use super::*;

    fn wanted() -> Vec<String> {
        schema_fields(extraction_schema())
    }

    #[test]
    fn extracts_first_numeric_value_per_column() {
        let csv = b"region,total_volume,cost_per_unit\nAuckland,,83.33\nWaikato,12000,90\n";
        let fields = extract_fields(csv, &wanted()).expect("extract");
        assert_eq!(fields.total_volume, Some(12_000.0));
        assert_eq!(fields.cost_per_unit, Some(83.33));
        assert!(fields.baseline_value.is_none());
    }

    #[test]
    fn extracts_key_value_layout() {
        let csv = b"Total Volume,200000\nBaseline Value,15%\nnotes,ignored\n";
        let fields = extract_fields(csv, &wanted()).expect("extract");
        assert_eq!(fields.total_volume, Some(200_000.0));
        assert_eq!(fields.baseline_value, Some(15.0));
        assert!(fields.cost_per_unit.is_none());
    }

    #[test]
    fn key_value_layout_starting_with_field_name() {
        let csv = b"total_volume,200000\ncost_per_unit,83.33\n";
        let fields = extract_fields(csv, &wanted()).expect("extract");
        assert_eq!(fields.total_volume, Some(200_000.0));
        assert_eq!(fields.cost_per_unit, Some(83.33));
        assert!(fields.clinician_hours_per_unit.is_none());
    }

    #[test]
    fn single_column_header_file_still_reads_values() {
        let csv = b"total_volume\n1000\n";
        let fields = extract_fields(csv, &wanted()).expect("extract");
        assert_eq!(fields.total_volume, Some(1_000.0));
    }

    #[test]
    fn unrelated_csv_extracts_nothing() {
        let csv = b"a,b\n1,2\n";
        assert!(extract_fields(csv, &wanted()).expect("extract").is_empty());
        assert!(extract_fields(b"", &wanted()).expect("extract").is_empty());
    }

    #[test]
    fn extractor_reports_failure_without_matches() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "x,y\n1,2\n").expect("write");
        let url = format!("file://{}", path.display());
        let result = tokio_test::block_on(CsvExtractor.extract(&url, extraction_schema()))
            .expect("extract");
        assert_eq!(result.status, crate::ingest::ExtractionStatus::Error);
        assert!(result.output.is_none());
    }

    #[test]
    fn uploads_are_content_addressed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("nzeps.csv");
        std::fs::write(&source, "total_volume\n1\n").expect("write");
        let uploader = LocalUploader::new(dir.path().join("store"));
        let first = tokio_test::block_on(uploader.upload(&source)).expect("upload");
        let second = tokio_test::block_on(uploader.upload(&source)).expect("upload");
        assert_eq!(first.url, second.url);
        assert!(first.url.ends_with("-nzeps.csv"));
    }
}
