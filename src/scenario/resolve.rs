use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::Dataset;
use crate::scenario::{default_params, ScenarioId, ScenarioParams};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamsSource {
    Default,
    Dataset { id: i64, name: String },
}

impl std::fmt::Display for ParamsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "built-in default"),
            Self::Dataset { name, .. } => write!(f, "dataset \"{name}\""),
        }
    }
}

/// The single parameter set active for a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectiveParams {
    pub scenario: ScenarioId,
    pub params: ScenarioParams,
    pub source: ParamsSource,
}

/// Picks the first dataset whose type matches, otherwise the built-in default.
///
/// `datasets` is expected newest first, as returned by the store, so the most
/// recently uploaded dataset wins.
pub fn resolve_params(scenario: ScenarioId, datasets: &[Dataset]) -> EffectiveParams {
    if let Some(dataset) = datasets.iter().find(|d| d.scenario == scenario) {
        debug!("using dataset {} for {scenario}", dataset.name);
        return EffectiveParams {
            scenario,
            params: dataset.params(),
            source: ParamsSource::Dataset {
                id: dataset.id,
                name: dataset.name.clone(),
            },
        };
    }
    EffectiveParams {
        scenario,
        params: default_params(scenario),
        source: ParamsSource::Default,
    }
}

/// Resolves a raw identifier. Unknown identifiers silently fall back to the
/// DNA defaults; this masks bad input and is logged at warn level.
pub fn resolve_params_raw(raw: &str, datasets: &[Dataset]) -> EffectiveParams {
    match ScenarioId::from_str(raw) {
        Ok(id) => resolve_params(id, datasets),
        Err(_) => {
            warn!("unknown scenario {raw:?}, falling back to DNA defaults");
            EffectiveParams {
                scenario: ScenarioId::Dna,
                params: default_params(ScenarioId::Dna),
                source: ParamsSource::Default,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn dataset(id: i64, name: &str, scenario: ScenarioId, volume: f64) -> Dataset {
        Dataset {
            id,
            name: name.to_string(),
            scenario,
            baseline_value: 15.0,
            cost_per_unit: 150.0,
            total_volume: volume,
            clinician_hours_per_unit: 0.5,
            file_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn falls_back_to_defaults_without_matching_dataset() {
        let datasets = vec![dataset(1, "Auckland ASH", ScenarioId::Ash, 500.0)];
        let effective = resolve_params(ScenarioId::Dna, &datasets);
        assert_eq!(effective.source, ParamsSource::Default);
        assert_eq!(effective.params, default_params(ScenarioId::Dna));
    }

    #[test]
    fn first_matching_dataset_wins() {
        let datasets = vec![
            dataset(3, "Newest DNA", ScenarioId::Dna, 50_000.0),
            dataset(2, "Older DNA", ScenarioId::Dna, 40_000.0),
        ];
        let effective = resolve_params(ScenarioId::Dna, &datasets);
        assert_eq!(effective.params.total_volume, 50_000.0);
        assert_eq!(
            effective.source,
            ParamsSource::Dataset {
                id: 3,
                name: "Newest DNA".to_string()
            }
        );
    }

    #[test]
    fn unknown_raw_scenario_uses_dna_defaults() {
        let datasets = vec![dataset(1, "Waikato DNA", ScenarioId::Dna, 1.0)];
        let effective = resolve_params_raw("XYZ", &datasets);
        assert_eq!(effective.scenario, ScenarioId::Dna);
        assert_eq!(effective.source, ParamsSource::Default);
        assert_eq!(effective.params, default_params(ScenarioId::Dna));
    }
}
