use std::str::FromStr;

use tracing::debug;

use crate::recommendations::{
    catalog, effort_band, impact_band, RankedRecommendation, Recommendation,
};
use crate::scenario::ScenarioId;

pub fn rank(scenario: ScenarioId) -> Vec<RankedRecommendation> {
    rank_catalog(catalog(scenario))
}

/// Unknown identifiers rank to an empty list.
pub fn rank_raw(raw: &str) -> Vec<RankedRecommendation> {
    match ScenarioId::from_str(raw) {
        Ok(id) => rank(id),
        Err(_) => {
            debug!("no recommendation catalog for {raw:?}");
            Vec::new()
        }
    }
}

/// Orders entries by descending impact/effort. `sort_by` is stable, so equal
/// ratios keep catalog order.
pub fn rank_catalog(entries: &[Recommendation]) -> Vec<RankedRecommendation> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.ratio().total_cmp(&a.ratio()));
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, recommendation)| RankedRecommendation {
            rank: idx + 1,
            ratio: recommendation.ratio(),
            impact_band: impact_band(recommendation.impact),
            effort_band: effort_band(recommendation.effort),
            recommendation,
        })
        .collect()
}
