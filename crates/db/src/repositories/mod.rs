use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use smartchoice_core::catalog::SearchFilters;
use smartchoice_core::domain::product::{Product, ProductId};
use smartchoice_core::recommend::Profile;

pub mod memory;
pub mod product;
pub mod search_history;

pub use memory::{InMemoryProductRepository, InMemorySearchHistoryRepository};
pub use product::SqlProductRepository;
pub use search_history::SqlSearchHistoryRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Structural filters pushed down to storage. Text matching stays with the
/// caller so the keyword expansion policy lives in one place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock_only: bool,
    pub featured_only: bool,
    pub limit: Option<u32>,
}

impl ProductQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_category(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()), ..Self::default() }
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.as_filters().matches(product) && (!self.featured_only || product.featured)
    }

    fn as_filters(&self) -> SearchFilters {
        SearchFilters {
            category: self.category.clone(),
            brand: self.brand.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock_only: self.in_stock_only,
        }
    }
}

impl From<&SearchFilters> for ProductQuery {
    fn from(filters: &SearchFilters) -> Self {
        Self {
            category: filters.category.clone(),
            brand: filters.brand.clone(),
            min_price: filters.min_price,
            max_price: filters.max_price,
            in_stock_only: filters.in_stock_only,
            ..Self::default()
        }
    }
}

/// One recorded `/api/search` style request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: Option<i64>,
    pub query: String,
    pub category: Option<String>,
    pub budget: f64,
    pub profile: Profile,
    pub results_count: u32,
    pub created_at: DateTime<Utc>,
}

impl SearchHistoryEntry {
    pub fn new(
        query: impl Into<String>,
        category: Option<String>,
        budget: f64,
        profile: Profile,
        results_count: u32,
    ) -> Self {
        Self {
            id: None,
            query: query.into(),
            category,
            budget,
            profile,
            results_count,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Inserts or replaces. A non-positive id asks storage to allocate one.
    async fn save(&self, product: Product) -> Result<ProductId, RepositoryError>;

    /// Matching products in ascending id order.
    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError>;

    async fn categories(&self) -> Result<Vec<String>, RepositoryError>;

    async fn brands(&self, category: Option<&str>) -> Result<Vec<String>, RepositoryError>;
}

#[async_trait]
pub trait SearchHistoryRepository: Send + Sync {
    async fn record(&self, entry: SearchHistoryEntry) -> Result<i64, RepositoryError>;

    /// Newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<SearchHistoryEntry>, RepositoryError>;
}
