//! Recommender implementation

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use super::scoring::{ScoreCalculator, ScoringConfig};
use super::trends::{self, TrendSummary};
use super::types::{Profile, RecommendationSet, ScoredProduct};
use crate::domain::product::{Product, ProductId};

/// Stateless scorer over caller-supplied candidate lists.
#[derive(Debug, Clone)]
pub struct Recommender {
    config: ScoringConfig,
    calculator: ScoreCalculator,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl Recommender {
    pub fn new(config: ScoringConfig) -> Self {
        let calculator = ScoreCalculator::new(config.weights, config.price_ceiling);
        Self { config, calculator }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn price_score(&self, price: f64) -> f64 {
        self.calculator.price_score(price)
    }

    pub fn global_score(&self, product: &Product, profile: Profile) -> f64 {
        self.calculator.global_score(product, profile)
    }

    /// Drops products sold by sites below `min_reliability`. When nothing
    /// passes, the unfiltered list is returned.
    pub fn reliability_gate<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let gated: Vec<&Product> = products
            .iter()
            .filter(|product| product.site_reliability >= self.config.min_reliability)
            .collect();

        if gated.is_empty() && !products.is_empty() {
            debug!(
                event_name = "recommend.gate.fallback",
                min_reliability = self.config.min_reliability,
                candidates = products.len(),
                "no candidate passed the reliability gate, using the full list"
            );
            return products.iter().collect();
        }
        gated
    }

    pub fn recommend(&self, products: &[Product], budget: f64, profile: Profile) -> RecommendationSet {
        let gated = self.reliability_gate(products);
        if gated.is_empty() {
            return RecommendationSet::default();
        }

        let cheapest = first_best(gated.iter().filter(|product| product.price <= budget), |a, b| {
            b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal)
        });
        let most_reliable =
            first_best(gated.iter(), |a, b| a.site_reliability.cmp(&b.site_reliability));
        let best_quality = first_best(gated.iter(), |a, b| a.quality_score.cmp(&b.quality_score));

        let personalized = self.ranked(gated.iter().copied(), profile).into_iter().next().map(
            |mut top| {
                top.reason = Some(self.config.locale.explain(&top.product, budget, profile));
                top
            },
        );

        RecommendationSet {
            cheapest: cheapest.map(|product| self.calculator.score(product, profile)),
            most_reliable: most_reliable.map(|product| self.calculator.score(product, profile)),
            best_quality: best_quality.map(|product| self.calculator.score(product, profile)),
            personalized,
        }
    }

    /// Top-scored candidates outside `exclude_ids`, each with its own reason.
    pub fn alternatives(
        &self,
        products: &[Product],
        budget: f64,
        profile: Profile,
        exclude_ids: &[ProductId],
    ) -> Vec<ScoredProduct> {
        let excluded: HashSet<ProductId> = exclude_ids.iter().copied().collect();
        let remaining = products.iter().filter(|product| !excluded.contains(&product.id));

        self.ranked(remaining, profile)
            .into_iter()
            .take(self.config.alternatives_limit)
            .map(|mut scored| {
                scored.reason = Some(self.config.locale.explain(&scored.product, budget, profile));
                scored
            })
            .collect()
    }

    pub fn analyze_trends(&self, products: &[Product]) -> TrendSummary {
        trends::analyze_trends(products)
    }

    /// Scores and sorts descending by global score; ties keep input order.
    fn ranked<'a, I>(&self, products: I, profile: Profile) -> Vec<ScoredProduct>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut scored: Vec<ScoredProduct> =
            products.into_iter().map(|product| self.calculator.score(product, profile)).collect();
        scored.sort_by(|a, b| b.global_score.partial_cmp(&a.global_score).unwrap_or(Ordering::Equal));
        scored
    }
}

/// Greatest element under `cmp`, keeping the earliest on ties.
fn first_best<'a, 'b, I, F>(items: I, cmp: F) -> Option<&'a Product>
where
    I: Iterator<Item = &'b &'a Product>,
    'a: 'b,
    F: Fn(&Product, &Product) -> Ordering,
{
    items.fold(None, |best: Option<&'a Product>, candidate| match best {
        Some(current) if cmp(*candidate, current) != Ordering::Greater => Some(current),
        _ => Some(*candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::{ReasonLocale, DEFAULT_MIN_RELIABILITY};

    fn product(id: i64, price: f64, quality: u32, reliability: u32) -> Product {
        Product::new(id, format!("Item {id}"), "Brand", "electronics", price)
            .with_quality_score(quality)
            .with_site("Shop", reliability)
    }

    fn ids(products: &[&Product]) -> Vec<i64> {
        products.iter().map(|product| product.id.0).collect()
    }

    #[test]
    fn test_reliability_gate_filters_below_threshold() {
        let recommender = Recommender::default();
        let products = vec![product(1, 100.0, 80, 50), product(2, 100.0, 80, 70), product(3, 100.0, 80, 90)];

        assert_eq!(recommender.config().min_reliability, DEFAULT_MIN_RELIABILITY);
        assert_eq!(ids(&recommender.reliability_gate(&products)), vec![2, 3]);
    }

    #[test]
    fn test_reliability_gate_falls_back_to_full_list() {
        let recommender = Recommender::default();
        let products = vec![product(1, 100.0, 80, 10), product(2, 100.0, 80, 59)];

        assert_eq!(ids(&recommender.reliability_gate(&products)), vec![1, 2]);
    }

    #[test]
    fn test_personalized_has_max_global_score() {
        let recommender = Recommender::default();
        let products = vec![
            product(1, 1199.0, 95, 90),
            product(2, 1299.0, 94, 95),
            product(3, 399.0, 70, 85),
            product(4, 50.0, 40, 40),
        ];

        for profile in [Profile::Low, Profile::Medium, Profile::High] {
            let set = recommender.recommend(&products, 1500.0, profile);
            let personalized = set.personalized.expect("personalized pick");
            let max = recommender
                .reliability_gate(&products)
                .into_iter()
                .map(|product| recommender.global_score(product, profile))
                .fold(f64::MIN, f64::max);

            assert_eq!(personalized.global_score, max);
            assert!(personalized.reason.is_some());
        }
    }

    #[test]
    fn test_named_picks() {
        let recommender = Recommender::default();
        let products = vec![
            product(1, 900.0, 95, 80),
            product(2, 400.0, 70, 95),
            product(3, 300.0, 60, 95),
            product(4, 10.0, 99, 20),
        ];

        let set = recommender.recommend(&products, 1000.0, Profile::Medium);

        // product 4 is gated out despite being cheapest and best quality
        assert_eq!(set.cheapest.map(|pick| pick.product.id.0), Some(3));
        // tie on 95 keeps the first seen
        assert_eq!(set.most_reliable.map(|pick| pick.product.id.0), Some(2));
        assert_eq!(set.best_quality.map(|pick| pick.product.id.0), Some(1));
    }

    #[test]
    fn test_cheapest_absent_when_over_budget() {
        let recommender = Recommender::default();
        let products = vec![product(1, 600.0, 80, 80), product(2, 700.0, 80, 80)];

        let set = recommender.recommend(&products, 500.0, Profile::Medium);
        assert!(set.cheapest.is_none());
        assert!(set.personalized.is_some());
    }

    #[test]
    fn test_unknown_profile_scores_like_medium() {
        let recommender = Recommender::default();
        let products = vec![product(1, 500.0, 80, 80), product(2, 1500.0, 95, 95)];

        let unknown = recommender.recommend(&products, 1000.0, Profile::parse_lenient("royalty"));
        let medium = recommender.recommend(&products, 1000.0, Profile::Medium);
        assert_eq!(unknown, medium);
    }

    #[test]
    fn test_empty_input_yields_empty_set() {
        let set = Recommender::default().recommend(&[], 1000.0, Profile::High);
        assert!(set.is_empty());
    }

    #[test]
    fn test_alternatives_exclude_ids_and_limit() {
        let recommender = Recommender::default();
        let products: Vec<Product> =
            (1..=6).map(|id| product(id, 100.0 * id as f64, 70 + id as u32, 80)).collect();

        let alternatives =
            recommender.alternatives(&products, 1000.0, Profile::High, &[ProductId(6), ProductId(5)]);

        let ids: Vec<i64> = alternatives.iter().map(|scored| scored.product.id.0).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&5) && !ids.contains(&6));
        assert!(alternatives.windows(2).all(|pair| pair[0].global_score >= pair[1].global_score));
        assert!(alternatives.iter().all(|scored| scored.reason.is_some()));
    }

    #[test]
    fn test_injected_configuration_is_used() {
        let recommender = Recommender::new(ScoringConfig {
            min_reliability: 95,
            alternatives_limit: 1,
            locale: ReasonLocale::English,
            ..ScoringConfig::default()
        });
        let products = vec![product(1, 100.0, 80, 90), product(2, 100.0, 80, 96)];

        assert_eq!(ids(&recommender.reliability_gate(&products)), vec![2]);
        assert_eq!(recommender.alternatives(&products, 1000.0, Profile::Low, &[]).len(), 1);

        let reason = recommender
            .recommend(&products, 1000.0, Profile::Low)
            .personalized
            .and_then(|pick| pick.reason)
            .expect("reason");
        assert!(reason.starts_with("Well under your budget"));
    }
}
