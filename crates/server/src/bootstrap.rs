use std::sync::Arc;

use smartchoice_core::catalog::Matcher;
use smartchoice_core::config::{AppConfig, ConfigError};
use smartchoice_core::recommend::Recommender;
use smartchoice_db::{
    connect_with_settings, migrations, DbPool, SqlProductRepository, SqlSearchHistoryRepository,
};
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub api_state: ApiState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

#[cfg(test)]
pub async fn bootstrap(
    options: smartchoice_core::config::LoadOptions,
) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let matcher = Matcher::new(config.synonym_table()?);
    let recommender = Recommender::new(config.scoring.clone());

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let api_state = ApiState::new(
        Arc::new(SqlProductRepository::new(db_pool.clone())),
        Arc::new(SqlSearchHistoryRepository::new(db_pool.clone())),
        matcher,
        recommender,
        config.catalog.default_limit,
    );

    Ok(Application { config, db_pool, api_state })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use smartchoice_core::config::{ConfigOverrides, LoadOptions};
    use smartchoice_db::SeedCatalog;
    use tower::ServiceExt;

    use crate::bootstrap::bootstrap;

    fn in_memory_options() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_required_config_file_is_missing() {
        let result = bootstrap(LoadOptions {
            config_path: Some(PathBuf::from("does-not-exist/smartchoice.toml")),
            require_file: true,
            ..in_memory_options()
        })
        .await;

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("does-not-exist"), "unexpected error: {message}");
    }

    #[tokio::test]
    async fn bootstrap_applies_schema_and_serves_the_seeded_catalog() {
        let app = bootstrap(in_memory_options()).await.expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('product', 'search_history')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected catalog tables after bootstrap");
        assert_eq!(table_count, 2);

        SeedCatalog::load(&app.db_pool).await.expect("seed");

        let request = Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"product":"ecran","budget":1500,"social_class":"high"}"#))
            .expect("request");
        let response =
            crate::api::router(app.api_state.clone()).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["recommendations"]["personalized"]["brand"], "Samsung");

        let (history_rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM search_history")
            .fetch_one(&app.db_pool)
            .await
            .expect("history count");
        assert_eq!(history_rows, 1);

        app.db_pool.close().await;
    }
}
