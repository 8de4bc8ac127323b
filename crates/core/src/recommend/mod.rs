//! Recommendation Scorer
//!
//! Ranks a candidate product list for a shopper's budget and profile:
//! - Gates out sellers below a minimum reliability (falling back to the full
//!   list when nobody passes)
//! - Picks the cheapest in-budget, most reliable and best quality products
//! - Scores every candidate with profile-weighted price/quality/reliability
//!   and explains the top one
//! - Summarizes price and tier distributions of a result set

use crate::errors::DomainError;

mod engine;
mod reason;
mod scoring;
mod trends;
mod types;

pub use engine::Recommender;
pub use reason::ReasonLocale;
pub use scoring::{ProfileWeights, ScoreCalculator, ScoringConfig, ScoringWeights};
pub use trends::{
    analyze_trends, PriceRange, QualityDistribution, QualityTier, ReliabilityDistribution,
    ReliabilityTier, TrendSummary,
};
pub use types::{Profile, RecommendationSet, ScoredProduct};

pub const LOW_WEIGHTS: ScoringWeights = ScoringWeights { price: 0.5, quality: 0.2, reliability: 0.3 };
pub const MEDIUM_WEIGHTS: ScoringWeights =
    ScoringWeights { price: 0.3, quality: 0.4, reliability: 0.3 };
pub const HIGH_WEIGHTS: ScoringWeights = ScoringWeights { price: 0.1, quality: 0.5, reliability: 0.4 };

pub const DEFAULT_PRICE_CEILING: f64 = 2000.0;
pub const DEFAULT_MIN_RELIABILITY: u32 = 60;
pub const DEFAULT_ALTERNATIVES_LIMIT: usize = 3;
pub const DEFAULT_BUDGET_HEADROOM: f64 = 1.2;
pub const MAX_REASON_CLAUSES: usize = 3;

/// A budget must be a positive, finite amount.
pub fn validate_budget(budget: f64) -> Result<f64, DomainError> {
    if budget.is_finite() && budget > 0.0 {
        Ok(budget)
    } else {
        Err(DomainError::InvalidInput {
            field: "budget",
            reason: format!("must be a positive amount, got {budget}"),
        })
    }
}
