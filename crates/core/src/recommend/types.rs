//! Types for the Recommendation Scorer

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Coarse affordability/quality preference ("social class") of a shopper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Price matters most
    Low,
    /// Balanced
    #[default]
    Medium,
    /// Quality and reliability matter most
    High,
}

impl Profile {
    /// Parse a profile tag; unrecognized values fall back to `Medium`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl From<&str> for Profile {
    fn from(value: &str) -> Self {
        Self::parse_lenient(value)
    }
}

/// A product with its composite score for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: Product,
    /// Weighted composite, rounded to 2 decimals
    pub global_score: f64,
    /// Human-readable justification, set on the personalized pick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Named picks derived from one candidate list. Absent keys mean no candidate
/// qualified (e.g. nothing within budget for `cheapest`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheapest: Option<ScoredProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_reliable: Option<ScoredProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_quality: Option<ScoredProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalized: Option<ScoredProduct>,
}

impl RecommendationSet {
    pub fn is_empty(&self) -> bool {
        self.cheapest.is_none()
            && self.most_reliable.is_none()
            && self.best_quality.is_none()
            && self.personalized.is_none()
    }
}
