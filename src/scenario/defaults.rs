use crate::scenario::{ScenarioId, ScenarioParams};

const DNA_DEFAULTS: ScenarioParams = ScenarioParams {
    total_volume: 200_000.0,
    cost_per_unit: 83.33,
    clinician_hours_per_unit: 0.33335,
};

const ASH_DEFAULTS: ScenarioParams = ScenarioParams {
    total_volume: 10_000.0,
    cost_per_unit: 1_072.0,
    clinician_hours_per_unit: 1.675,
};

const NZEPS_DEFAULTS: ScenarioParams = ScenarioParams {
    total_volume: 1_000_000.0,
    cost_per_unit: 13.33,
    clinician_hours_per_unit: 0.1667,
};

/// Built-in national baselines used when no dataset overrides a scenario.
pub fn default_params(scenario: ScenarioId) -> ScenarioParams {
    match scenario {
        ScenarioId::Dna => DNA_DEFAULTS,
        ScenarioId::Ash => ASH_DEFAULTS,
        ScenarioId::NzePs => NZEPS_DEFAULTS,
    }
}
