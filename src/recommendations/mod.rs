pub mod catalog;
pub mod ranker;

use serde::Serialize;

pub use catalog::catalog;
pub use ranker::{rank, rank_catalog, rank_raw};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Settings,
    Zap,
    Users,
    Target,
}

/// Static catalog entry. Impact and effort are 0-100 scores.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub title: &'static str,
    pub impact: u8,
    pub effort: u8,
    pub description: &'static str,
    pub category: &'static str,
    pub icon: Icon,
}

impl Recommendation {
    pub fn ratio(&self) -> f64 {
        f64::from(self.impact) / f64::from(self.effort)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

pub fn impact_band(impact: u8) -> Band {
    if impact >= 80 {
        Band::High
    } else if impact >= 60 {
        Band::Medium
    } else {
        Band::Low
    }
}

pub fn effort_band(effort: u8) -> Band {
    if effort <= 40 {
        Band::Low
    } else if effort <= 60 {
        Band::Medium
    } else {
        Band::High
    }
}

/// A catalog entry after ranking. `rank` is the 1-based position badge.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedRecommendation {
    pub rank: usize,
    pub ratio: f64,
    pub impact_band: Band,
    pub effort_band: Band,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(impact_band(80), Band::High);
        assert_eq!(impact_band(79), Band::Medium);
        assert_eq!(impact_band(60), Band::Medium);
        assert_eq!(impact_band(59), Band::Low);
        assert_eq!(effort_band(40), Band::Low);
        assert_eq!(effort_band(41), Band::Medium);
        assert_eq!(effort_band(60), Band::Medium);
        assert_eq!(effort_band(61), Band::High);
    }
}
