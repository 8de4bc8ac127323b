//! JSON API over the product catalog and the recommendation scorer.
//!
//! - `GET  /api/products`                      keyword search with filters and sort
//! - `GET  /api/products/featured`             featured, in-stock products
//! - `GET  /api/products/{id}`                 one product
//! - `GET  /api/products/{id}/redirect/{r}`    retailer URL for a product
//! - `GET  /api/categories`                    distinct categories
//! - `GET  /api/brands`                        distinct brands, optionally per category
//! - `POST /api/search`                        budget recommendation, recorded in history
//! - `POST /api/recommendations/alternatives`  next best products outside an exclusion list
//! - `GET  /api/trends`                        price and tier distribution

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use smartchoice_core::catalog::{
    Catalog, Matcher, SearchFilters, SortOrder, DEFAULT_FEATURED_LIMIT,
};
use smartchoice_core::config::MAX_PAGE_LIMIT;
use smartchoice_core::domain::product::{Product, ProductId};
use smartchoice_core::errors::{ApplicationError, DomainError, InterfaceError};
use smartchoice_core::recommend::{
    validate_budget, Profile, RecommendationSet, Recommender, ScoredProduct, TrendSummary,
};
use smartchoice_db::{
    budget_candidates, ProductQuery, ProductRepository, RepositoryError, SearchHistoryEntry,
    SearchHistoryRepository,
};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    products: Arc<dyn ProductRepository>,
    history: Arc<dyn SearchHistoryRepository>,
    matcher: Arc<Matcher>,
    recommender: Arc<Recommender>,
    default_limit: usize,
}

impl ApiState {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        history: Arc<dyn SearchHistoryRepository>,
        matcher: Matcher,
        recommender: Recommender,
        default_limit: usize,
    ) -> Self {
        Self {
            products,
            history,
            matcher: Arc::new(matcher),
            recommender: Arc::new(recommender),
            default_limit: default_limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    fn page_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).clamp(1, MAX_PAGE_LIMIT)
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/products", get(search_products))
        .route("/api/products/featured", get(featured_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/{id}/redirect/{retailer}", get(retailer_redirect))
        .route("/api/categories", get(list_categories))
        .route("/api/brands", get(list_brands))
        .route("/api/search", post(budget_search))
        .route("/api/recommendations/alternatives", post(alternatives))
        .route("/api/trends", get(trends))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// JSON error body: `{error, message, correlation_id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn new(error: ApplicationError, event_name: &'static str) -> Self {
        let correlation_id = new_correlation_id();
        match &error {
            ApplicationError::Persistence(_) | ApplicationError::Integrity(_) => {
                error!(event_name, correlation_id = %correlation_id, error = %error, "api request failed");
            }
            ApplicationError::Domain(_) | ApplicationError::NotFound { .. } => {
                warn!(event_name, correlation_id = %correlation_id, error = %error, "api request rejected");
            }
        }
        Self(error.into_interface(correlation_id))
    }

    fn invalid(error: DomainError, event_name: &'static str) -> Self {
        Self::new(ApplicationError::Domain(error), event_name)
    }

    fn storage(error: RepositoryError, event_name: &'static str) -> Self {
        let application = match error {
            RepositoryError::Decode(detail) => ApplicationError::Integrity(detail),
            RepositoryError::Database(error) => ApplicationError::Persistence(error.to_string()),
        };
        Self::new(application, event_name)
    }

    fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Input problems are echoed back; storage details stay in the logs.
        let message = match &self.0 {
            InterfaceError::BadRequest { message, .. } | InterfaceError::NotFound { message, .. } => {
                message.clone()
            }
            other => other.user_message().to_string(),
        };
        let body = ErrorBody {
            error: self.0.kind().to_string(),
            message,
            correlation_id: self.0.correlation_id().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: usize,
    pub sort: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryParams {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BrandsResponse {
    pub brands: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BudgetSearchRequest {
    pub product: String,
    #[serde(default)]
    pub category: Option<String>,
    pub budget: f64,
    #[serde(default)]
    pub social_class: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BudgetSearchResponse {
    pub query: String,
    pub budget: f64,
    pub social_class: Profile,
    pub results_count: usize,
    pub products: Vec<Product>,
    pub recommendations: RecommendationSet,
}

#[derive(Debug, Deserialize)]
pub struct AlternativesRequest {
    pub product: String,
    #[serde(default)]
    pub category: Option<String>,
    pub budget: f64,
    #[serde(default)]
    pub social_class: Option<String>,
    #[serde(default)]
    pub exclude_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AlternativesResponse {
    pub alternatives: Vec<ScoredProduct>,
}

fn profile_from(tag: Option<&str>) -> Profile {
    tag.map(Profile::parse_lenient).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn search_products(
    State(state): State<ApiState>,
    Query(params): Query<ProductSearchParams>,
) -> Result<Json<ProductPage>, ApiError> {
    let filters = SearchFilters {
        category: params.category.clone(),
        brand: params.brand.clone(),
        min_price: params.min_price,
        max_price: params.max_price,
        in_stock_only: false,
    };
    filters.validate().map_err(|error| ApiError::invalid(error, "api.products.search_rejected"))?;
    let sort = params.sort.as_deref().map(SortOrder::parse_lenient).unwrap_or_default();

    let stored = state
        .products
        .list(&ProductQuery::from(&filters))
        .await
        .map_err(|error| ApiError::storage(error, "api.products.search_failed"))?;

    let mut products = state.matcher.search(&stored, params.q.as_deref(), &filters, sort);
    let total = products.len();
    products.truncate(state.page_limit(params.limit));

    Ok(Json(ProductPage { products, total, sort: sort.as_str() }))
}

pub async fn featured_products(
    State(state): State<ApiState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let query = ProductQuery { featured_only: true, in_stock_only: true, ..ProductQuery::all() };
    let stored = state
        .products
        .list(&query)
        .await
        .map_err(|error| ApiError::storage(error, "api.products.featured_failed"))?;

    let limit = params.limit.unwrap_or(DEFAULT_FEATURED_LIMIT);
    let catalog = Catalog::new(stored);
    let featured = catalog.featured(limit.clamp(1, MAX_PAGE_LIMIT)).into_iter().cloned().collect();
    Ok(Json(featured))
}

pub async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let found = state
        .products
        .find_by_id(&ProductId(id))
        .await
        .map_err(|error| ApiError::storage(error, "api.products.lookup_failed"))?;

    found.map(Json).ok_or_else(|| {
        ApiError::new(
            ApplicationError::NotFound { entity: "product", id: id.to_string() },
            "api.products.not_found",
        )
    })
}

pub async fn retailer_redirect(
    State(state): State<ApiState>,
    Path((id, retailer)): Path<(i64, String)>,
) -> Result<Json<RedirectResponse>, ApiError> {
    let product = state
        .products
        .find_by_id(&ProductId(id))
        .await
        .map_err(|error| ApiError::storage(error, "api.redirect.lookup_failed"))?
        .ok_or_else(|| {
            ApiError::new(
                ApplicationError::NotFound { entity: "product", id: id.to_string() },
                "api.redirect.product_not_found",
            )
        })?;

    let link = product.purchase_link(&retailer).ok_or_else(|| {
        ApiError::new(
            ApplicationError::NotFound { entity: "retailer", id: format!("{retailer} for product {id}") },
            "api.redirect.retailer_not_found",
        )
    })?;

    Ok(Json(RedirectResponse { redirect_url: link.url.clone() }))
}

pub async fn list_categories(
    State(state): State<ApiState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state
        .products
        .categories()
        .await
        .map_err(|error| ApiError::storage(error, "api.categories.failed"))?;
    Ok(Json(CategoriesResponse { categories }))
}

pub async fn list_brands(
    State(state): State<ApiState>,
    Query(params): Query<CategoryParams>,
) -> Result<Json<BrandsResponse>, ApiError> {
    let brands = state
        .products
        .brands(params.category.as_deref())
        .await
        .map_err(|error| ApiError::storage(error, "api.brands.failed"))?;
    Ok(Json(BrandsResponse { brands }))
}

pub async fn budget_search(
    State(state): State<ApiState>,
    Json(request): Json<BudgetSearchRequest>,
) -> Result<Json<BudgetSearchResponse>, ApiError> {
    let budget = validate_budget(request.budget)
        .map_err(|error| ApiError::invalid(error, "api.search.rejected"))?;
    let profile = profile_from(request.social_class.as_deref());

    let candidates = budget_candidates(
        state.products.as_ref(),
        &state.matcher,
        &request.product,
        request.category.as_deref(),
        state.recommender.config().candidate_price_cap(budget),
    )
    .await
    .map_err(|error| ApiError::storage(error, "api.search.failed"))?;

    let recommendations = state.recommender.recommend(&candidates, budget, profile);
    let results_count = candidates.len();

    let entry = SearchHistoryEntry::new(
        request.product.clone(),
        request.category.clone(),
        budget,
        profile,
        u32::try_from(results_count).unwrap_or(u32::MAX),
    );
    let correlation_id = new_correlation_id();
    if let Err(error) = state.history.record(entry).await {
        warn!(
            event_name = "api.search.history_write_failed",
            correlation_id = %correlation_id,
            error = %error,
            "search history write failed"
        );
    }

    let mut products = candidates;
    if let Some(sort) = request.sort_by.as_deref().map(SortOrder::parse_lenient) {
        products.sort_by(|a, b| sort.compare(a, b));
    }

    info!(
        event_name = "api.search.completed",
        correlation_id = %correlation_id,
        results_count,
        profile = profile.as_str(),
        "budget search completed"
    );

    Ok(Json(BudgetSearchResponse {
        query: request.product,
        budget,
        social_class: profile,
        results_count,
        products,
        recommendations,
    }))
}

pub async fn alternatives(
    State(state): State<ApiState>,
    Json(request): Json<AlternativesRequest>,
) -> Result<Json<AlternativesResponse>, ApiError> {
    let budget = validate_budget(request.budget)
        .map_err(|error| ApiError::invalid(error, "api.alternatives.rejected"))?;
    let profile = profile_from(request.social_class.as_deref());

    let candidates = budget_candidates(
        state.products.as_ref(),
        &state.matcher,
        &request.product,
        request.category.as_deref(),
        state.recommender.config().candidate_price_cap(budget),
    )
    .await
    .map_err(|error| ApiError::storage(error, "api.alternatives.failed"))?;

    let excluded: Vec<ProductId> = request.exclude_ids.iter().copied().map(ProductId).collect();
    let alternatives = state.recommender.alternatives(&candidates, budget, profile, &excluded);
    Ok(Json(AlternativesResponse { alternatives }))
}

pub async fn trends(
    State(state): State<ApiState>,
    Query(params): Query<CategoryParams>,
) -> Result<Json<TrendSummary>, ApiError> {
    let query = ProductQuery { category: params.category, ..ProductQuery::all() };
    let products = state
        .products
        .list(&query)
        .await
        .map_err(|error| ApiError::storage(error, "api.trends.failed"))?;
    Ok(Json(state.recommender.analyze_trends(&products)))
}
