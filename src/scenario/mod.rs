pub mod defaults;
pub mod resolve;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::default_params;
pub use resolve::{resolve_params, resolve_params_raw, EffectiveParams, ParamsSource};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScenarioId {
    #[serde(rename = "DNA", alias = "dna")]
    Dna,
    #[serde(rename = "ASH", alias = "ash")]
    Ash,
    #[serde(rename = "NZePS", alias = "nzeps", alias = "NZEPS")]
    NzePs,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 3] = [ScenarioId::Dna, ScenarioId::Ash, ScenarioId::NzePs];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Dna => "dna",
            Self::Ash => "ash",
            Self::NzePs => "nzeps",
        }
    }

    pub fn profile(&self) -> ScenarioProfile {
        match self {
            Self::Dna => ScenarioProfile {
                id: *self,
                title: "DNA",
                subtitle: "Did Not Attend",
                description: "Reduce missed appointments across primary care",
                unit_label: "appointments",
                slider_label: "Reduce missed appointments",
                slider_unit: "%",
                slider_max: 100,
            },
            Self::Ash => ScenarioProfile {
                id: *self,
                title: "ASH",
                subtitle: "Ambulatory Sensitive Hospitalisations",
                description: "Prevent avoidable hospital admissions",
                unit_label: "admissions",
                slider_label: "Reduce avoidable admissions",
                slider_unit: "%",
                slider_max: 100,
            },
            Self::NzePs => ScenarioProfile {
                id: *self,
                title: "NZePS",
                subtitle: "NZ e-Prescription Service",
                description: "Increase electronic prescription uptake",
                unit_label: "prescriptions",
                slider_label: "Increase e-prescription uptake",
                slider_unit: "pp",
                slider_max: 100,
            },
        }
    }
}

impl Display for ScenarioId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Dna => "DNA",
            Self::Ash => "ASH",
            Self::NzePs => "NZePS",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown scenario: {0}")]
pub struct ScenarioParseError(pub String);

impl FromStr for ScenarioId {
    type Err = ScenarioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "dna" | "did-not-attend" => Ok(Self::Dna),
            "ash" | "ambulatory-sensitive" => Ok(Self::Ash),
            "nzeps" | "e-prescription" => Ok(Self::NzePs),
            _ => Err(ScenarioParseError(s.to_string())),
        }
    }
}

/// Display metadata for a scenario, as shown on the selector and slider.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioProfile {
    pub id: ScenarioId,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub unit_label: &'static str,
    pub slider_label: &'static str,
    pub slider_unit: &'static str,
    pub slider_max: u8,
}

/// Baseline inputs for the impact calculator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScenarioParams {
    pub total_volume: f64,
    pub cost_per_unit: f64,
    pub clinician_hours_per_unit: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("improvement percent must be within 0..=100, got {0}")]
    PercentOutOfRange(f64),
}

impl ScenarioParams {
    pub fn new(total_volume: f64, cost_per_unit: f64, clinician_hours_per_unit: f64) -> Self {
        Self {
            total_volume,
            cost_per_unit,
            clinician_hours_per_unit,
        }
    }

    /// Rejects negative and non-finite inputs. The calculator itself never
    /// calls this; it is applied where parameters enter the system.
    pub fn validate(&self) -> Result<(), ParamError> {
        check_non_negative("total_volume", self.total_volume)?;
        check_non_negative("cost_per_unit", self.cost_per_unit)?;
        check_non_negative("clinician_hours_per_unit", self.clinician_hours_per_unit)?;
        Ok(())
    }
}

pub fn check_non_negative(field: &'static str, value: f64) -> Result<(), ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite { field, value });
    }
    if value < 0.0 {
        return Err(ParamError::Negative { field, value });
    }
    Ok(())
}

pub fn check_percent(percent: f64) -> Result<f64, ParamError> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ParamError::PercentOutOfRange(percent));
    }
    Ok(percent)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_scenarios_case_insensitively() {
        assert_eq!(ScenarioId::from_str("DNA").unwrap(), ScenarioId::Dna);
        assert_eq!(ScenarioId::from_str(" ash ").unwrap(), ScenarioId::Ash);
        assert_eq!(ScenarioId::from_str("NZePS").unwrap(), ScenarioId::NzePs);
        assert_eq!(
            ScenarioId::from_str("did_not_attend").unwrap(),
            ScenarioId::Dna
        );
        assert!(ScenarioId::from_str("XYZ").is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for id in ScenarioId::ALL {
            assert_eq!(ScenarioId::from_str(&id.to_string()).unwrap(), id);
            assert_eq!(ScenarioId::from_str(id.as_slug()).unwrap(), id);
        }
    }

    #[test]
    fn serializes_with_display_names() {
        let json = serde_json::to_string(&ScenarioId::NzePs).unwrap();
        assert_eq!(json, "\"NZePS\"");
        let parsed: ScenarioId = serde_json::from_str("\"dna\"").unwrap();
        assert_eq!(parsed, ScenarioId::Dna);
    }

    #[test]
    fn validation_rejects_negative_and_nan() {
        assert!(ScenarioParams::new(10.0, 1.0, 0.5).validate().is_ok());
        assert_eq!(
            ScenarioParams::new(-1.0, 1.0, 0.5).validate(),
            Err(ParamError::Negative {
                field: "total_volume",
                value: -1.0
            })
        );
        assert!(matches!(
            ScenarioParams::new(1.0, f64::NAN, 0.5).validate(),
            Err(ParamError::NotFinite {
                field: "cost_per_unit",
                ..
            })
        ));
    }

    #[test]
    fn percent_bounds() {
        assert!(check_percent(0.0).is_ok());
        assert!(check_percent(100.0).is_ok());
        assert!(check_percent(100.5).is_err());
        assert!(check_percent(-1.0).is_err());
    }
}
