use crate::calculator::CalculationResult;
use crate::scenario::{EffectiveParams, ParamsSource, ScenarioId, ScenarioParams};

/// Linear impact projection.
///
/// Returns `None` when `improvement_percent` is zero: a zero slider means "no
/// calculation", not a zero-valued result. Inputs are not validated here;
/// negative or NaN values propagate through the arithmetic.
pub fn compute(
    scenario: ScenarioId,
    params: &ScenarioParams,
    improvement_percent: f64,
) -> Option<CalculationResult> {
    compute_with_source(scenario, params, improvement_percent, ParamsSource::Default)
}

pub fn compute_effective(
    effective: &EffectiveParams,
    improvement_percent: f64,
) -> Option<CalculationResult> {
    compute_with_source(
        effective.scenario,
        &effective.params,
        improvement_percent,
        effective.source.clone(),
    )
}

fn compute_with_source(
    scenario: ScenarioId,
    params: &ScenarioParams,
    improvement_percent: f64,
    params_source: ParamsSource,
) -> Option<CalculationResult> {
    if improvement_percent == 0.0 {
        return None;
    }

    let improvement = improvement_percent / 100.0;
    let current_cost = params.total_volume * params.cost_per_unit;
    let estimated_savings = current_cost * improvement;
    let units_saved = params.total_volume * improvement;
    let hours_reclaimed = units_saved * params.clinician_hours_per_unit;

    Some(CalculationResult {
        estimated_savings,
        units_saved,
        hours_reclaimed,
        percentage: improvement_percent,
        scenario,
        params_source,
    })
}

/// Evaluates the projection at every multiple of `step` up to 100 percent.
pub fn sweep(effective: &EffectiveParams, step: u8) -> Vec<CalculationResult> {
    let step = step.clamp(1, 100);
    (1..=100u8 / step)
        .filter_map(|i| compute_effective(effective, f64::from(i * step)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{default_params, resolve_params};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn dna_at_fifty_percent() {
        let result = compute(ScenarioId::Dna, &default_params(ScenarioId::Dna), 50.0)
            .expect("missing result");
        assert!(approx(result.estimated_savings, 8_333_000.0));
        assert!(approx(result.units_saved, 100_000.0));
        assert!(approx(result.hours_reclaimed, 33_335.0));
        assert_eq!(result.percentage, 50.0);
        assert_eq!(result.scenario, ScenarioId::Dna);
    }

    #[test]
    fn ash_at_full_improvement() {
        let result = compute(ScenarioId::Ash, &default_params(ScenarioId::Ash), 100.0)
            .expect("missing result");
        assert!(approx(result.estimated_savings, 10_720_000.0));
        assert!(approx(result.units_saved, 10_000.0));
        assert!(approx(result.hours_reclaimed, 16_750.0));
    }

    #[test]
    fn zero_percent_yields_no_result() {
        for id in ScenarioId::ALL {
            assert!(compute(id, &default_params(id), 0.0).is_none());
        }
        let zero_params = ScenarioParams::new(0.0, 0.0, 0.0);
        let zero_valued = compute(ScenarioId::Dna, &zero_params, 10.0).expect("missing result");
        assert_eq!(zero_valued.estimated_savings, 0.0);
    }

    #[test]
    fn results_are_non_negative_and_monotonic() {
        for id in ScenarioId::ALL {
            let params = default_params(id);
            let mut previous: Option<CalculationResult> = None;
            for p in 1..=100 {
                let result = compute(id, &params, f64::from(p)).expect("missing result");
                assert_eq!(result.percentage, f64::from(p));
                assert!(result.estimated_savings >= 0.0);
                assert!(result.units_saved >= 0.0);
                assert!(result.hours_reclaimed >= 0.0);
                if let Some(prev) = &previous {
                    assert!(result.estimated_savings >= prev.estimated_savings);
                    assert!(result.units_saved >= prev.units_saved);
                    assert!(result.hours_reclaimed >= prev.hours_reclaimed);
                }
                previous = Some(result);
            }
        }
    }

    #[test]
    fn negative_inputs_propagate_without_error() {
        let params = ScenarioParams::new(-100.0, 10.0, 1.0);
        let result = compute(ScenarioId::Ash, &params, 50.0).expect("missing result");
        assert_eq!(result.units_saved, -50.0);
        let nan = compute(ScenarioId::Ash, &ScenarioParams::new(f64::NAN, 1.0, 1.0), 50.0)
            .expect("missing result");
        assert!(nan.estimated_savings.is_nan());
    }

    #[test]
    fn effective_params_carry_their_source() {
        let effective = resolve_params(ScenarioId::NzePs, &[]);
        let result = compute_effective(&effective, 25.0).expect("missing result");
        assert_eq!(result.params_source, ParamsSource::Default);
        assert!(approx(result.units_saved, 250_000.0));
    }

    #[test]
    fn sweep_covers_each_step() {
        let effective = resolve_params(ScenarioId::Dna, &[]);
        let rows = sweep(&effective, 25);
        let percents: Vec<f64> = rows.iter().map(|r| r.percentage).collect();
        assert_eq!(percents, vec![25.0, 50.0, 75.0, 100.0]);
        assert_eq!(sweep(&effective, 0).len(), 100);
        assert_eq!(sweep(&effective, 30).len(), 3);
    }
}
