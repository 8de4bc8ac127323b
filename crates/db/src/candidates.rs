//! Candidate loading for budget-driven recommendation flows.

use smartchoice_core::catalog::{Matcher, SearchFilters, SortOrder};
use smartchoice_core::domain::product::Product;

use crate::repositories::{ProductQuery, ProductRepository, RepositoryError};

/// Products in `category` priced at or below `price_cap` whose name or brand
/// matches the expanded `query`, in relevance order.
///
/// The price cap and category are pushed down to storage; keyword matching
/// runs through `matcher`.
pub async fn budget_candidates<R>(
    repository: &R,
    matcher: &Matcher,
    query: &str,
    category: Option<&str>,
    price_cap: f64,
) -> Result<Vec<Product>, RepositoryError>
where
    R: ProductRepository + ?Sized,
{
    let storage_query = ProductQuery {
        category: category.map(str::to_string),
        max_price: Some(price_cap),
        ..ProductQuery::default()
    };
    let stored = repository.list(&storage_query).await?;
    Ok(matcher.search(&stored, Some(query), &SearchFilters::default(), SortOrder::Relevance))
}
