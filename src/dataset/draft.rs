use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::{DatasetError, NewDataset};
use crate::ingest::ExtractedFields;
use crate::scenario::ScenarioId;

/// Free-text form state for a dataset before it is saved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatasetDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub scenario: String,
    #[serde(default)]
    pub baseline_value: String,
    #[serde(default)]
    pub cost_per_unit: String,
    #[serde(default)]
    pub total_volume: String,
    #[serde(default)]
    pub clinician_hours_per_unit: String,
    #[serde(default)]
    pub file_url: Option<String>,
}

impl DatasetDraft {
    /// Extracted values replace whatever the form held for the same field.
    pub fn merge_extracted(&mut self, fields: &ExtractedFields) {
        if let Some(v) = fields.total_volume {
            self.total_volume = v.to_string();
        }
        if let Some(v) = fields.cost_per_unit {
            self.cost_per_unit = v.to_string();
        }
        if let Some(v) = fields.baseline_value {
            self.baseline_value = v.to_string();
        }
        if let Some(v) = fields.clinician_hours_per_unit {
            self.clinician_hours_per_unit = v.to_string();
        }
    }

    pub fn into_new_dataset(self) -> Result<NewDataset, DatasetError> {
        if self.name.trim().is_empty() {
            return Err(DatasetError::MissingName);
        }
        if self.scenario.trim().is_empty() {
            return Err(DatasetError::MissingType);
        }
        let scenario = ScenarioId::from_str(&self.scenario)?;
        let dataset = NewDataset {
            name: self.name.trim().to_string(),
            scenario,
            baseline_value: coerce_number(&self.baseline_value),
            cost_per_unit: coerce_number(&self.cost_per_unit),
            total_volume: coerce_number(&self.total_volume),
            clinician_hours_per_unit: coerce_number(&self.clinician_hours_per_unit),
            file_url: self.file_url.filter(|url| !url.trim().is_empty()),
        };
        dataset.validate()?;
        Ok(dataset)
    }
}

/// Blank or unparseable input counts as zero. Trailing junk after a leading
/// number is ignored, so `"12abc"` reads as 12.
pub fn coerce_number(raw: &str) -> f64 {
    parse_number(raw)
        .or_else(|| leading_number(raw))
        .unwrap_or(0.0)
}

fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    trimmed
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .rev()
        .find_map(|end| parse_number(&trimmed[..end]))
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let sanitized: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '%' | '_' | '$'))
        .collect();
    sanitized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
