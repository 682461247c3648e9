pub mod draft;
pub mod migrations;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scenario::{check_non_negative, ParamError, ScenarioId, ScenarioParams};

pub use draft::{coerce_number, DatasetDraft};
pub use store::DatasetStore;

/// A persisted, user-supplied override of a scenario's default parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub scenario: ScenarioId,
    pub baseline_value: f64,
    pub cost_per_unit: f64,
    pub total_volume: f64,
    pub clinician_hours_per_unit: f64,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    pub fn params(&self) -> ScenarioParams {
        ScenarioParams::new(
            self.total_volume,
            self.cost_per_unit,
            self.clinician_hours_per_unit,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDataset {
    pub name: String,
    #[serde(rename = "type")]
    pub scenario: ScenarioId,
    #[serde(default)]
    pub baseline_value: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub clinician_hours_per_unit: f64,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset name is required")]
    MissingName,
    #[error("dataset type is required")]
    MissingType,
    #[error(transparent)]
    UnknownType(#[from] crate::scenario::ScenarioParseError),
    #[error(transparent)]
    InvalidParam(#[from] ParamError),
}

impl NewDataset {
    pub fn params(&self) -> ScenarioParams {
        ScenarioParams::new(
            self.total_volume,
            self.cost_per_unit,
            self.clinician_hours_per_unit,
        )
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.name.trim().is_empty() {
            return Err(DatasetError::MissingName);
        }
        self.params().validate()?;
        check_non_negative("baseline_value", self.baseline_value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_dataset(name: &str, volume: f64) -> NewDataset {
        NewDataset {
            name: name.to_string(),
            scenario: ScenarioId::Dna,
            baseline_value: 15.0,
            cost_per_unit: 150.0,
            total_volume: volume,
            clinician_hours_per_unit: 0.5,
            file_url: None,
        }
    }

    #[test]
    fn validate_requires_name_and_non_negative_values() {
        assert!(new_dataset("Auckland DNA Data 2024", 50_000.0)
            .validate()
            .is_ok());
        assert!(matches!(
            new_dataset("  ", 1.0).validate(),
            Err(DatasetError::MissingName)
        ));
        assert!(matches!(
            new_dataset("Bad", -5.0).validate(),
            Err(DatasetError::InvalidParam(ParamError::Negative { .. }))
        ));
    }

    #[test]
    fn deserializes_type_field_and_missing_numbers() {
        let parsed: NewDataset =
            serde_json::from_str(r#"{"name":"Canterbury","type":"ASH","total_volume":900}"#)
                .unwrap();
        assert_eq!(parsed.scenario, ScenarioId::Ash);
        assert_eq!(parsed.total_volume, 900.0);
        assert_eq!(parsed.cost_per_unit, 0.0);
        assert!(parsed.file_url.is_none());
    }
}
