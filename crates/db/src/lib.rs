pub mod candidates;
pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use candidates::budget_candidates;
pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{SeedCatalog, SeedResult, VerificationResult};
pub use repositories::{
    InMemoryProductRepository, InMemorySearchHistoryRepository, ProductQuery, ProductRepository,
    RepositoryError, SearchHistoryEntry, SearchHistoryRepository, SqlProductRepository,
    SqlSearchHistoryRepository,
};
