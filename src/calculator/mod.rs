pub mod impact;

use serde::{Deserialize, Serialize};

use crate::scenario::{ParamsSource, ScenarioId};

pub use impact::{compute, compute_effective, sweep};

/// Projected effect of improving a scenario by `percentage` percent.
///
/// Values are unrounded; rounding happens only when rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub estimated_savings: f64,
    pub units_saved: f64,
    pub hours_reclaimed: f64,
    pub percentage: f64,
    pub scenario: ScenarioId,
    pub params_source: ParamsSource,
}
