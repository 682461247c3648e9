use anyhow::Result;

use crate::calculator::CalculationResult;
use crate::dataset::Dataset;
use crate::recommendations::RankedRecommendation;

pub fn calculations_to_csv(results: &[CalculationResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "scenario",
        "percentage",
        "estimated_savings",
        "units_saved",
        "hours_reclaimed",
        "params_source",
    ])?;
    for result in results {
        writer.write_record([
            result.scenario.to_string(),
            format!("{}", result.percentage),
            format!("{:.2}", result.estimated_savings),
            format!("{:.2}", result.units_saved),
            format!("{:.2}", result.hours_reclaimed),
            result.params_source.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn recommendations_to_csv(items: &[RankedRecommendation]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "rank",
        "title",
        "category",
        "impact",
        "effort",
        "ratio",
        "impact_band",
        "effort_band",
        "description",
    ])?;
    for item in items {
        let rec = &item.recommendation;
        writer.write_record([
            item.rank.to_string(),
            rec.title.to_string(),
            rec.category.to_string(),
            rec.impact.to_string(),
            rec.effort.to_string(),
            format!("{:.4}", item.ratio),
            item.impact_band.label().to_string(),
            item.effort_band.label().to_string(),
            rec.description.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn datasets_to_csv(datasets: &[Dataset]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "name",
        "type",
        "baseline_value",
        "cost_per_unit",
        "total_volume",
        "clinician_hours_per_unit",
        "file_url",
        "created_at",
    ])?;
    for d in datasets {
        writer.write_record([
            d.id.to_string(),
            d.name.clone(),
            d.scenario.to_string(),
            d.baseline_value.to_string(),
            d.cost_per_unit.to_string(),
            d.total_volume.to_string(),
            d.clinician_hours_per_unit.to_string(),
            d.file_url.clone().unwrap_or_default(),
            d.created_at.to_rfc3339(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute;
    use crate::recommendations::rank;
    use crate::scenario::{default_params, ScenarioId};

    #[test]
    fn calculation_csv_has_header_and_row() {
        let result = compute(ScenarioId::Ash, &default_params(ScenarioId::Ash), 100.0)
            .expect("missing result");
        let csv = calculations_to_csv(&[result]).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("scenario,percentage"));
        assert!(lines[1].starts_with("ASH,100,10720000.00,10000.00,16750.00"));
    }

    #[test]
    fn recommendation_csv_preserves_rank_order() {
        let csv = recommendations_to_csv(&rank(ScenarioId::Dna)).expect("csv");
        let second = csv.lines().nth(2).expect("row");
        assert!(second.starts_with("2,Patient Education Program,Education,60,40,1.5000,medium,low"));
    }
}
