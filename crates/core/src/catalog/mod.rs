//! Featured listing and keyword-expanded search.

mod matcher;
mod synonyms;

pub use matcher::{merge_unique, Matcher, QueryExpander, SearchFilters, SortOrder};
pub use synonyms::SynonymTable;

use crate::domain::product::Product;

/// Number of products returned by featured listings when no limit is given.
pub const DEFAULT_FEATURED_LIMIT: usize = 8;

/// Read-only view over an already materialized product collection.
#[derive(Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Featured, in-stock products ordered by rating then review count.
    pub fn featured(&self, limit: usize) -> Vec<&Product> {
        let mut featured: Vec<&Product> =
            self.products.iter().filter(|product| product.featured && product.in_stock).collect();
        featured.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.review_count.cmp(&a.review_count))
        });
        featured.truncate(limit);
        featured
    }
}
