pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

pub use catalog::{merge_unique, Catalog, Matcher, QueryExpander, SearchFilters, SortOrder, SynonymTable};
pub use domain::product::{Product, ProductId, PurchaseLink};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::{
    Profile, ReasonLocale, RecommendationSet, Recommender, ScoredProduct, ScoringConfig,
    TrendSummary,
};
