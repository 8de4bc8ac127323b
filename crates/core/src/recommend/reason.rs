//! Natural-language justification for the personalized pick.

use serde::{Deserialize, Serialize};

use super::types::Profile;
use super::MAX_REASON_CLAUSES;
use crate::domain::product::Product;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonLocale {
    #[default]
    French,
    English,
}

struct Phrases {
    well_under_budget: &'static str,
    within_budget: &'static str,
    over_budget_justified: &'static str,
    exceptional_quality: &'static str,
    excellent_quality: &'static str,
    good_quality: &'static str,
    very_reliable_seller: &'static str,
    reliable_seller: &'static str,
    value_for_money: &'static str,
    quality_reliability_balance: &'static str,
    premium_investment: &'static str,
    and: &'static str,
}

const FRENCH: Phrases = Phrases {
    well_under_budget: "bien en dessous de votre budget",
    within_budget: "respecte votre budget",
    over_budget_justified: "légèrement au-dessus du budget mais justifié par la qualité",
    exceptional_quality: "qualité exceptionnelle",
    excellent_quality: "excellente qualité",
    good_quality: "bonne qualité",
    very_reliable_seller: "vendeur très fiable",
    reliable_seller: "vendeur fiable",
    value_for_money: "excellent rapport qualité-prix pour votre budget",
    quality_reliability_balance: "bon équilibre entre qualité et fiabilité",
    premium_investment: "produit premium qui justifie l'investissement",
    and: "et",
};

const ENGLISH: Phrases = Phrases {
    well_under_budget: "well under your budget",
    within_budget: "within your budget",
    over_budget_justified: "slightly over budget but justified by its quality",
    exceptional_quality: "exceptional quality",
    excellent_quality: "excellent quality",
    good_quality: "good quality",
    very_reliable_seller: "very reliable seller",
    reliable_seller: "reliable seller",
    value_for_money: "great value for your budget",
    quality_reliability_balance: "good balance between quality and reliability",
    premium_investment: "premium product worth the investment",
    and: "and",
};

impl ReasonLocale {
    /// Lenient parse of `fr`/`french`/`en`/`english`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fr" | "french" => Some(Self::French),
            "en" | "english" => Some(Self::English),
            _ => None,
        }
    }

    fn phrases(&self) -> &'static Phrases {
        match self {
            Self::French => &FRENCH,
            Self::English => &ENGLISH,
        }
    }

    /// Builds one to three clauses from price-vs-budget, quality tier,
    /// reliability tier and a profile-specific rule, in that order.
    pub fn explain(&self, product: &Product, budget: f64, profile: Profile) -> String {
        let phrases = self.phrases();
        let quality = product.quality_score;
        let reliability = product.site_reliability;
        let mut clauses = Vec::with_capacity(4);

        if product.price <= budget * 0.8 {
            clauses.push(phrases.well_under_budget);
        } else if product.price <= budget {
            clauses.push(phrases.within_budget);
        } else {
            clauses.push(phrases.over_budget_justified);
        }

        if quality >= 90 {
            clauses.push(phrases.exceptional_quality);
        } else if quality >= 80 {
            clauses.push(phrases.excellent_quality);
        } else if quality >= 70 {
            clauses.push(phrases.good_quality);
        }

        if reliability >= 90 {
            clauses.push(phrases.very_reliable_seller);
        } else if reliability >= 80 {
            clauses.push(phrases.reliable_seller);
        }

        let profile_clause = match profile {
            Profile::Low if product.price <= budget * 0.7 => Some(phrases.value_for_money),
            Profile::Medium if quality >= 80 && reliability >= 80 => {
                Some(phrases.quality_reliability_balance)
            }
            Profile::High if quality >= 90 => Some(phrases.premium_investment),
            _ => None,
        };
        clauses.extend(profile_clause);

        clauses.truncate(MAX_REASON_CLAUSES);
        join_clauses(&clauses, phrases.and)
    }
}

fn join_clauses(clauses: &[&str], and: &str) -> String {
    match clauses {
        [] => String::new(),
        [only] => capitalize(only),
        [first, second] => format!("{} {and} {second}", capitalize(first)),
        [first, middle @ .., last] => {
            format!("{}, {} {and} {last}", capitalize(first), middle.join(", "))
        }
    }
}

fn capitalize(clause: &str) -> String {
    let mut chars = clause.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::ReasonLocale;
    use crate::domain::product::Product;
    use crate::recommend::Profile;

    fn product(price: f64, quality: u32, reliability: u32) -> Product {
        Product::new(1, "Test", "Brand", "electronics", price)
            .with_quality_score(quality)
            .with_site("Shop", reliability)
    }

    #[test]
    fn single_clause_is_capitalized() {
        let reason = ReasonLocale::French.explain(&product(900.0, 50, 50), 1000.0, Profile::High);
        assert_eq!(reason, "Respecte votre budget");
    }

    #[test]
    fn two_clauses_use_conjunction() {
        let reason = ReasonLocale::French.explain(&product(1200.0, 85, 40), 1000.0, Profile::High);
        assert_eq!(
            reason,
            "Légèrement au-dessus du budget mais justifié par la qualité et excellente qualité"
        );
    }

    #[test]
    fn extra_clauses_beyond_three_are_dropped() {
        // price, quality, reliability and the low-profile clause all qualify
        let reason = ReasonLocale::French.explain(&product(100.0, 95, 95), 1000.0, Profile::Low);
        assert_eq!(
            reason,
            "Bien en dessous de votre budget, qualité exceptionnelle et vendeur très fiable"
        );
    }

    #[test]
    fn profile_clause_fills_free_slot() {
        let reason = ReasonLocale::English.explain(&product(600.0, 50, 85), 1000.0, Profile::Low);
        assert_eq!(reason, "Well under your budget, reliable seller and great value for your budget");
    }

    #[test]
    fn medium_profile_balance_clause() {
        let reason = ReasonLocale::English.explain(&product(950.0, 60, 60), 1000.0, Profile::Medium);
        assert_eq!(reason, "Within your budget");

        let reason = ReasonLocale::English.explain(&product(950.0, 82, 40), 1000.0, Profile::Medium);
        assert_eq!(reason, "Within your budget and excellent quality");
    }

    #[test]
    fn high_profile_premium_clause_for_top_quality() {
        let reason = ReasonLocale::French.explain(&product(1100.0, 93, 70), 1200.0, Profile::High);
        assert_eq!(
            reason,
            "Respecte votre budget, qualité exceptionnelle et produit premium qui justifie l'investissement"
        );

        let reason = ReasonLocale::English.explain(&product(1100.0, 89, 70), 1200.0, Profile::High);
        assert_eq!(reason, "Within your budget and excellent quality");
    }

    #[test]
    fn locale_parse_accepts_short_and_long_names() {
        assert_eq!(ReasonLocale::parse("FR"), Some(ReasonLocale::French));
        assert_eq!(ReasonLocale::parse("english"), Some(ReasonLocale::English));
        assert_eq!(ReasonLocale::parse("de"), None);
    }
}
