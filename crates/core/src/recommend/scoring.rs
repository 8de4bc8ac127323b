//! Scoring arithmetic for recommendations

use serde::{Deserialize, Serialize};

use super::reason::ReasonLocale;
use super::types::{Profile, ScoredProduct};
use super::{
    DEFAULT_ALTERNATIVES_LIMIT, DEFAULT_BUDGET_HEADROOM, DEFAULT_MIN_RELIABILITY,
    DEFAULT_PRICE_CEILING, HIGH_WEIGHTS, LOW_WEIGHTS, MEDIUM_WEIGHTS,
};
use crate::domain::product::Product;

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight of the 0-100 cheapness score
    pub price: f64,
    /// Weight of the product quality score
    pub quality: f64,
    /// Weight of the seller reliability score
    pub reliability: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.price + self.quality + self.reliability
    }
}

/// One weight triple per profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileWeights {
    pub low: ScoringWeights,
    pub medium: ScoringWeights,
    pub high: ScoringWeights,
}

impl Default for ProfileWeights {
    fn default() -> Self {
        Self { low: LOW_WEIGHTS, medium: MEDIUM_WEIGHTS, high: HIGH_WEIGHTS }
    }
}

impl ProfileWeights {
    pub fn for_profile(&self, profile: Profile) -> ScoringWeights {
        match profile {
            Profile::Low => self.low,
            Profile::Medium => self.medium,
            Profile::High => self.high,
        }
    }
}

/// Tunables injected into the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub weights: ProfileWeights,
    /// Price at which the cheapness score reaches zero
    pub price_ceiling: f64,
    /// Products sold below this site reliability are gated out
    pub min_reliability: u32,
    /// Size of the "show me something else" list
    pub alternatives_limit: usize,
    /// Candidate pool bound relative to the budget (`price <= budget * headroom`)
    pub budget_headroom: f64,
    pub locale: ReasonLocale,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ProfileWeights::default(),
            price_ceiling: DEFAULT_PRICE_CEILING,
            min_reliability: DEFAULT_MIN_RELIABILITY,
            alternatives_limit: DEFAULT_ALTERNATIVES_LIMIT,
            budget_headroom: DEFAULT_BUDGET_HEADROOM,
            locale: ReasonLocale::default(),
        }
    }
}

impl ScoringConfig {
    /// Highest price worth fetching as a candidate for `budget`.
    pub fn candidate_price_cap(&self, budget: f64) -> f64 {
        budget * self.budget_headroom
    }
}

/// Score calculator for recommendation candidates
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ProfileWeights,
    price_ceiling: f64,
}

impl ScoreCalculator {
    pub fn new(weights: ProfileWeights, price_ceiling: f64) -> Self {
        Self { weights, price_ceiling }
    }

    /// Linear inverse of price against the ceiling, clamped at zero.
    /// Non-positive prices score 100.
    pub fn price_score(&self, price: f64) -> f64 {
        if price <= 0.0 {
            return 100.0;
        }
        round2((100.0 * (1.0 - price / self.price_ceiling)).max(0.0))
    }

    pub fn global_score(&self, product: &Product, profile: Profile) -> f64 {
        let weights = self.weights.for_profile(profile);
        let total = weights.price * self.price_score(product.price)
            + weights.quality * f64::from(product.quality_score)
            + weights.reliability * f64::from(product.site_reliability);
        round2(total)
    }

    pub fn score(&self, product: &Product, profile: Profile) -> ScoredProduct {
        ScoredProduct {
            product: product.clone(),
            global_score: self.global_score(product, profile),
            reason: None,
        }
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(ProfileWeights::default(), DEFAULT_PRICE_CEILING)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
