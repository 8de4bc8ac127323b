use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::synonyms::SynonymTable;
use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// Turns a free-text query into the set of terms a product may match.
#[derive(Clone, Debug, Default)]
pub struct QueryExpander {
    table: SynonymTable,
}

impl QueryExpander {
    pub fn new(table: SynonymTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SynonymTable {
        &self.table
    }

    /// The lower-cased query comes first, followed by the related tokens of
    /// every table key found inside it. Duplicates keep their first position.
    /// A blank query expands to nothing.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut terms = vec![normalized.clone()];
        for (term, related) in self.table.iter() {
            if !normalized.contains(term) {
                continue;
            }
            for token in related {
                if !terms.contains(token) {
                    terms.push(token.clone());
                }
            }
        }
        terms
    }
}

/// Structural filters applied on top of the text match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub in_stock_only: bool,
}

impl SearchFilters {
    /// Rejects negative bounds and an inverted price range.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, bound) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if bound.is_some_and(|value| !value.is_finite() || value < 0.0) {
                return Err(DomainError::InvalidInput {
                    field,
                    reason: "must be a non-negative amount".to_string(),
                });
            }
        }
        if let (Some(min_price), Some(max_price)) = (self.min_price, self.max_price) {
            if min_price > max_price {
                return Err(DomainError::InvalidInput {
                    field: "min_price",
                    reason: format!("{min_price} is above max_price {max_price}"),
                });
            }
        }
        Ok(())
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(brand) = &self.brand {
            if &product.brand != brand {
                return false;
            }
        }
        if let Some(min_price) = self.min_price {
            if product.price < min_price {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if product.price > max_price {
                return false;
            }
        }
        !self.in_stock_only || product.in_stock
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    PriceLow,
    PriceHigh,
    Rating,
    Newest,
    Discount,
    #[default]
    Relevance,
}

impl SortOrder {
    /// Unknown values fall back to relevance ordering.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "price_low" => Self::PriceLow,
            "price_high" => Self::PriceHigh,
            "rating" => Self::Rating,
            "newest" => Self::Newest,
            "discount" => Self::Discount,
            _ => Self::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceLow => "price_low",
            Self::PriceHigh => "price_high",
            Self::Rating => "rating",
            Self::Newest => "newest",
            Self::Discount => "discount",
            Self::Relevance => "relevance",
        }
    }

    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::PriceLow => cmp_f64(a.price, b.price),
            Self::PriceHigh => cmp_f64(b.price, a.price),
            Self::Rating => cmp_f64(b.rating, a.rating),
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::Discount => b.discount_percentage.cmp(&a.discount_percentage),
            Self::Relevance => b
                .featured
                .cmp(&a.featured)
                .then_with(|| cmp_f64(b.rating, a.rating))
                .then_with(|| b.review_count.cmp(&a.review_count)),
        }
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Keyword-expanded product search over an in-memory collection.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    expander: QueryExpander,
}

impl Matcher {
    pub fn new(table: SynonymTable) -> Self {
        Self { expander: QueryExpander::new(table) }
    }

    pub fn expander(&self) -> &QueryExpander {
        &self.expander
    }

    /// A product matches when any expanded term is a substring of its name or
    /// brand, and every filter holds. The input is deduplicated by id before
    /// sorting; equal sort keys keep input order.
    pub fn search(
        &self,
        products: &[Product],
        query: Option<&str>,
        filters: &SearchFilters,
        sort: SortOrder,
    ) -> Vec<Product> {
        let terms = query.map(|query| self.expander.expand(query)).unwrap_or_default();

        let mut seen = HashSet::new();
        let mut matched: Vec<Product> = products
            .iter()
            .filter(|product| seen.insert(product.id))
            .filter(|product| terms.is_empty() || matches_any_term(product, &terms))
            .filter(|product| filters.matches(product))
            .cloned()
            .collect();

        matched.sort_by(|a, b| sort.compare(a, b));
        matched
    }
}

fn matches_any_term(product: &Product, terms: &[String]) -> bool {
    let name = product.name.to_lowercase();
    let brand = product.brand.to_lowercase();
    terms.iter().any(|term| name.contains(term.as_str()) || brand.contains(term.as_str()))
}

/// Concatenates result lists, keeping the first occurrence of every product id.
pub fn merge_unique<I>(sources: I) -> Vec<Product>
where
    I: IntoIterator<Item = Vec<Product>>,
{
    let mut seen: HashSet<ProductId> = HashSet::new();
    sources.into_iter().flatten().filter(|product| seen.insert(product.id)).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{merge_unique, Matcher, QueryExpander, SearchFilters, SortOrder};
    use crate::catalog::synonyms::SynonymTable;
    use crate::domain::product::{Product, ProductId};

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(1, "iPhone 15 Pro", "Apple", "electronics", 1199.0).with_rating(4.8, 900),
            Product::new(2, "Galaxy S24 Ultra", "Samsung", "electronics", 1299.0)
                .with_rating(4.7, 1200),
            Product::new(7, "Samsung Odyssey G9", "Samsung", "electronics", 1299.99)
                .with_rating(4.7, 1834)
                .featured(),
            Product::new(8, "Logitech G Pro X Superlight 2", "Logitech", "electronics", 149.99)
                .with_rating(4.6, 5432),
            Product::new(9, "Jean 501 Original", "Levi's", "clothing", 89.0).with_rating(4.4, 300),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|product| product.id.0).collect()
    }

    #[test]
    fn screen_query_expands_to_monitor_brands() {
        let expander = QueryExpander::new(SynonymTable::french_retail());
        let terms = expander.expand("Ecran");

        assert_eq!(terms[0], "ecran");
        for expected in ["samsung", "odyssey", "monitor"] {
            assert!(terms.iter().any(|term| term == expected), "missing `{expected}`");
        }
    }

    #[test]
    fn blank_query_expands_to_nothing() {
        let expander = QueryExpander::new(SynonymTable::french_retail());
        assert!(expander.expand("   ").is_empty());
    }

    #[test]
    fn expansion_does_not_repeat_terms() {
        let expander = QueryExpander::new(SynonymTable::french_retail());
        let terms = expander.expand("samsung ecran");

        let samsung_count = terms.iter().filter(|term| term.as_str() == "samsung").count();
        assert_eq!(samsung_count, 1);
    }

    #[test]
    fn expanded_query_matches_product_name() {
        let matcher = Matcher::new(SynonymTable::french_retail());
        let results =
            matcher.search(&catalog(), Some("ecran"), &SearchFilters::default(), SortOrder::Relevance);

        assert!(results.iter().any(|product| product.name == "Samsung Odyssey G9"));
    }

    #[test]
    fn overlapping_terms_yield_each_product_once() {
        let matcher = Matcher::new(SynonymTable::french_retail());
        // "samsung" and "odyssey" both hit product 7.
        let results = matcher.search(
            &catalog(),
            Some("ecran samsung"),
            &SearchFilters::default(),
            SortOrder::Relevance,
        );

        assert_eq!(results.iter().filter(|product| product.id == ProductId(7)).count(), 1);
    }

    #[test]
    fn absent_query_returns_everything_matching_filters() {
        let matcher = Matcher::new(SynonymTable::french_retail());
        let filters =
            SearchFilters { category: Some("electronics".to_string()), ..SearchFilters::default() };
        let results = matcher.search(&catalog(), None, &filters, SortOrder::PriceLow);

        assert_eq!(ids(&results), vec![8, 1, 2, 7]);
    }

    #[test]
    fn filters_are_conjunctive_with_text_match() {
        let matcher = Matcher::new(SynonymTable::french_retail());
        let filters = SearchFilters {
            brand: Some("Samsung".to_string()),
            max_price: Some(1299.0),
            ..SearchFilters::default()
        };
        let results = matcher.search(&catalog(), Some("samsung"), &filters, SortOrder::Relevance);

        assert_eq!(ids(&results), vec![2]);
    }

    #[test]
    fn no_match_is_an_empty_list() {
        let matcher = Matcher::new(SynonymTable::french_retail());
        let results = matcher.search(
            &catalog(),
            Some("aspirateur"),
            &SearchFilters::default(),
            SortOrder::Relevance,
        );
        assert!(results.is_empty());
    }

    #[test]
    fn relevance_orders_featured_then_rating_then_reviews() {
        let matcher = Matcher::new(SynonymTable::new());
        let results = matcher.search(&catalog(), None, &SearchFilters::default(), SortOrder::Relevance);

        assert_eq!(ids(&results), vec![7, 1, 2, 8, 9]);
    }

    #[test]
    fn newest_and_discount_orderings() {
        let now = Utc::now();
        let products = vec![
            Product::new(1, "Old", "A", "c", 10.0)
                .with_created_at(now - Duration::days(10))
                .with_discount(20.0, 50),
            Product::new(2, "New", "A", "c", 10.0).with_created_at(now).with_discount(12.0, 17),
        ];
        let matcher = Matcher::default();

        let newest = matcher.search(&products, None, &SearchFilters::default(), SortOrder::Newest);
        assert_eq!(ids(&newest), vec![2, 1]);

        let discount =
            matcher.search(&products, None, &SearchFilters::default(), SortOrder::Discount);
        assert_eq!(ids(&discount), vec![1, 2]);
    }

    #[test]
    fn in_stock_filter_drops_unavailable_products() {
        let products = vec![
            Product::new(1, "A", "X", "c", 10.0),
            Product::new(2, "B", "X", "c", 10.0).out_of_stock(),
        ];
        let filters = SearchFilters { in_stock_only: true, ..SearchFilters::default() };
        let results = Matcher::default().search(&products, None, &filters, SortOrder::PriceLow);

        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn unknown_sort_key_falls_back_to_relevance() {
        assert_eq!(SortOrder::parse_lenient("cheapest-first"), SortOrder::Relevance);
        assert_eq!(SortOrder::parse_lenient("PRICE_HIGH"), SortOrder::PriceHigh);
    }

    #[test]
    fn merge_unique_preserves_first_seen_order() {
        let first = vec![Product::new(7, "G9", "Samsung", "c", 1.0), Product::new(2, "S24", "Samsung", "c", 1.0)];
        let second = vec![Product::new(3, "Pixel", "Google", "c", 1.0), Product::new(7, "G9", "Samsung", "c", 1.0)];

        assert_eq!(ids(&merge_unique([first, second])), vec![7, 2, 3]);
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let filters =
            SearchFilters { min_price: Some(500.0), max_price: Some(100.0), ..SearchFilters::default() };
        let error = filters.validate().expect_err("inverted range");
        assert!(error.to_string().contains("min_price"));

        let negative = SearchFilters { max_price: Some(-1.0), ..SearchFilters::default() };
        assert!(negative.validate().is_err());
        assert!(SearchFilters::default().validate().is_ok());
    }
}
