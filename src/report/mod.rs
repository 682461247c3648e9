//! Display-time derivations layered on top of a calculation: unit labels,
//! week equivalents, projected uplift and currency formatting.

use serde::Serialize;

use crate::calculator::CalculationResult;
use crate::config::ReportConfig;
use crate::recommendations::{rank, RankedRecommendation};

#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub result: CalculationResult,
    pub unit_label: &'static str,
    pub weeks_equivalent: f64,
    pub projected_uplift: f64,
    pub currency: String,
    pub recommendations: Vec<RankedRecommendation>,
}

pub fn build_report(result: CalculationResult, settings: &ReportConfig) -> ImpactReport {
    let unit_label = result.scenario.profile().unit_label;
    let weeks_equivalent = weeks_equivalent(result.hours_reclaimed, settings.hours_per_week);
    let projected_uplift = result.estimated_savings * settings.uplift_factor;
    let recommendations = rank(result.scenario);
    ImpactReport {
        result,
        unit_label,
        weeks_equivalent,
        projected_uplift,
        currency: settings.currency.clone(),
        recommendations,
    }
}

/// Full-time weeks covered by the reclaimed hours, rounded.
pub fn weeks_equivalent(hours: f64, hours_per_week: f64) -> f64 {
    if hours_per_week <= 0.0 {
        return 0.0;
    }
    (hours / hours_per_week).round()
}

/// Whole-dollar amount with thousands separators, e.g. `$8,333,000`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs()))
}

pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(rounded.abs()))
}

fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = format!("{value:.0}");
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute;
    use crate::scenario::{default_params, ScenarioId};

    #[test]
    fn formats_currency_and_counts() {
        assert_eq!(format_currency(8_333_000.4), "$8,333,000");
        assert_eq!(format_currency(999.5), "$1,000");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(-1234.0), "-$1,234");
        assert_eq!(format_count(33_334.99), "33,335");
        assert_eq!(format_count(100.0), "100");
    }

    #[test]
    fn report_derives_weeks_and_uplift() {
        let result = compute(ScenarioId::Dna, &default_params(ScenarioId::Dna), 50.0)
            .expect("missing result");
        let report = build_report(result, &ReportConfig::default());
        assert_eq!(report.unit_label, "appointments");
        assert_eq!(report.weeks_equivalent, 833.0);
        assert!((report.projected_uplift - 9_999_600.0).abs() < 1e-3);
        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.currency, "NZD");
    }

    #[test]
    fn weeks_equivalent_guards_zero_divisor() {
        assert_eq!(weeks_equivalent(400.0, 0.0), 0.0);
        assert_eq!(weeks_equivalent(60.0, 40.0), 2.0);
    }

    #[test]
    fn capitalizes_unit_labels() {
        assert_eq!(capitalize("admissions"), "Admissions");
        assert_eq!(capitalize(""), "");
    }
}
