use serde::{Deserialize, Serialize};

use super::scoring::round2;
use crate::domain::product::Product;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Excellent,
    Good,
    Average,
    Poor,
}

impl QualityTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Average,
            _ => Self::Poor,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityTier {
    VeryReliable,
    Reliable,
    Moderate,
    Unreliable,
}

impl ReliabilityTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::VeryReliable,
            70..=89 => Self::Reliable,
            50..=69 => Self::Moderate,
            _ => Self::Unreliable,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDistribution {
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub poor: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliabilityDistribution {
    pub very_reliable: usize,
    pub reliable: usize,
    pub moderate: usize,
    pub unreliable: usize,
}

/// Aggregate view of a result set. `price_range` is absent for an empty set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub product_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    pub quality_distribution: QualityDistribution,
    pub reliability_distribution: ReliabilityDistribution,
}

pub fn analyze_trends(products: &[Product]) -> TrendSummary {
    let mut summary = TrendSummary { product_count: products.len(), ..TrendSummary::default() };
    if products.is_empty() {
        return summary;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut total = 0.0;
    for product in products {
        min = min.min(product.price);
        max = max.max(product.price);
        total += product.price;

        let quality = &mut summary.quality_distribution;
        match QualityTier::from_score(product.quality_score) {
            QualityTier::Excellent => quality.excellent += 1,
            QualityTier::Good => quality.good += 1,
            QualityTier::Average => quality.average += 1,
            QualityTier::Poor => quality.poor += 1,
        }

        let reliability = &mut summary.reliability_distribution;
        match ReliabilityTier::from_score(product.site_reliability) {
            ReliabilityTier::VeryReliable => reliability.very_reliable += 1,
            ReliabilityTier::Reliable => reliability.reliable += 1,
            ReliabilityTier::Moderate => reliability.moderate += 1,
            ReliabilityTier::Unreliable => reliability.unreliable += 1,
        }
    }

    summary.price_range = Some(PriceRange { min, max, average: round2(total / products.len() as f64) });
    summary
}
