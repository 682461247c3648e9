use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::calculator::CalculationResult;
use crate::dataset::Dataset;
use crate::ingest::IngestOutcome;
use crate::recommendations::{Band, RankedRecommendation};
use crate::report::{capitalize, format_count, format_currency, ImpactReport};
use crate::scenario::{EffectiveParams, ScenarioProfile};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn band_color(band: Band, higher_is_better: bool) -> Color {
    match (band, higher_is_better) {
        (Band::High, true) | (Band::Low, false) => Color::Green,
        (Band::Medium, _) => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn render_scenarios_table(rows: &[(ScenarioProfile, EffectiveParams)]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Scenario",
        "Name",
        "Goal",
        "Annual Volume",
        "Cost/Unit",
        "Hours/Unit",
        "Source",
    ]);
    for (profile, effective) in rows {
        table.add_row(vec![
            profile.title.to_string(),
            profile.subtitle.to_string(),
            format!("{} (0-{}{})", profile.slider_label, profile.slider_max, profile.slider_unit),
            format_count(effective.params.total_volume),
            format!("{:.2}", effective.params.cost_per_unit),
            format!("{}", effective.params.clinician_hours_per_unit),
            effective.source.to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_report(report: &ImpactReport) -> String {
    let result = &report.result;
    let unit = report.unit_label;

    let mut table = new_table();
    table.set_header(vec!["Metric", "Value", "Detail"]);
    table.add_row(Row::from(vec![
        Cell::new(format!("Estimated {} Savings", report.currency)),
        Cell::new(format_currency(result.estimated_savings)).fg(Color::Green),
        Cell::new(format!("{}% improvement", result.percentage)),
    ]));
    table.add_row(Row::from(vec![
        Cell::new(format!("{} Saved", capitalize(unit))),
        Cell::new(format_count(result.units_saved)).fg(Color::Blue),
        Cell::new(format!("{} {unit} annually", format_count(result.units_saved))),
    ]));
    table.add_row(Row::from(vec![
        Cell::new("Clinician Hours Reclaimed"),
        Cell::new(format_count(result.hours_reclaimed)).fg(Color::Magenta),
        Cell::new(format!("{} weeks equivalent", report.weeks_equivalent)),
    ]));

    let mut out = String::new();
    out.push_str(&format!(
        "{} scenario using {}\n",
        result.scenario, result.params_source
    ));
    out.push_str(&table.to_string());
    out.push('\n');
    out.push_str(&render_recommendations_table(&report.recommendations));
    out.push_str(&format!(
        "\nImplementing the top-ranked recommendations could unlock up to {} in additional annual savings beyond the {}% base improvement.",
        format_currency(report.projected_uplift),
        result.percentage
    ));
    out
}

pub fn render_recommendations_table(items: &[RankedRecommendation]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Rank",
        "Recommendation",
        "Category",
        "Impact",
        "Effort",
        "Ratio",
        "Description",
    ]);
    for item in items {
        let rec = &item.recommendation;
        table.add_row(Row::from(vec![
            Cell::new(format!("#{}", item.rank)),
            Cell::new(rec.title),
            Cell::new(rec.category),
            Cell::new(format!("{}%", rec.impact)).fg(band_color(item.impact_band, true)),
            Cell::new(format!("{}%", rec.effort)).fg(band_color(item.effort_band, false)),
            Cell::new(format!("{:.2}", item.ratio)),
            Cell::new(rec.description),
        ]));
    }
    table.to_string()
}

pub fn render_sweep_table(results: &[CalculationResult], unit_label: &str) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Improvement".to_string(),
        "Savings".to_string(),
        format!("{} Saved", capitalize(unit_label)),
        "Hours Reclaimed".to_string(),
    ]);
    for result in results {
        table.add_row(vec![
            format!("{}%", result.percentage),
            format_currency(result.estimated_savings),
            format_count(result.units_saved),
            format_count(result.hours_reclaimed),
        ]);
    }
    table.to_string()
}

pub fn render_datasets_table(datasets: &[Dataset]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "ID",
        "Name",
        "Type",
        "Baseline",
        "Volume",
        "Cost/Unit",
        "Hours/Unit",
        "File",
        "Created",
    ]);
    for d in datasets {
        table.add_row(vec![
            d.id.to_string(),
            d.name.clone(),
            d.scenario.to_string(),
            format!("{}", d.baseline_value),
            format_count(d.total_volume),
            format!("{:.2}", d.cost_per_unit),
            format!("{}", d.clinician_hours_per_unit),
            d.file_url.clone().unwrap_or_else(|| "-".to_string()),
            d.created_at.to_rfc3339(),
        ]);
    }
    table.to_string()
}

pub fn render_ingest_table(outcome: &IngestOutcome) -> String {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["File".to_string(), outcome.uploaded.name.clone()]);
    table.add_row(vec!["URL".to_string(), outcome.uploaded.url.clone()]);
    let extracted = if outcome.extracted.is_some() {
        "Data automatically extracted"
    } else {
        "No fields extracted"
    };
    table.add_row(vec!["Extraction".to_string(), extracted.to_string()]);
    let draft = &outcome.draft;
    for (label, value) in [
        ("total_volume", &draft.total_volume),
        ("cost_per_unit", &draft.cost_per_unit),
        ("baseline_value", &draft.baseline_value),
        ("clinician_hours_per_unit", &draft.clinician_hours_per_unit),
    ] {
        let shown = if value.is_empty() { "-" } else { value.as_str() };
        table.add_row(vec![label.to_string(), shown.to_string()]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute;
    use crate::config::ReportConfig;
    use crate::recommendations::rank;
    use crate::report::build_report;
    use crate::scenario::{default_params, ScenarioId};

    #[test]
    fn report_lists_savings_and_top_recommendation() {
        let result = compute(ScenarioId::Dna, &default_params(ScenarioId::Dna), 50.0)
            .expect("missing result");
        let rendered = render_report(&build_report(result, &ReportConfig::default()));
        assert!(rendered.contains("$8,333,000"));
        assert!(rendered.contains("Appointments Saved"));
        assert!(rendered.contains("833 weeks equivalent"));
        assert!(rendered.contains("SMS Reminder System"));
        assert!(rendered.contains("$9,999,600"));
    }

    #[test]
    fn recommendations_table_shows_badges() {
        let rendered = render_recommendations_table(&rank(ScenarioId::NzePs));
        assert!(rendered.contains("#1"));
        assert!(rendered.contains("#3"));
        assert!(rendered.contains("Provider Training Program"));
    }
}
