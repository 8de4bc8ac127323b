use clap::Args;
use serde::Serialize;
use smartchoice_core::config::AppConfig;
use smartchoice_core::domain::product::Product;
use smartchoice_core::recommend::{Profile, RecommendationSet, Recommender};
use smartchoice_db::{
    budget_candidates, DbPool, SearchHistoryEntry, SearchHistoryRepository, SqlProductRepository,
    SqlSearchHistoryRepository,
};

use crate::commands::{
    build_matcher, build_runtime, load_config, open_catalog, render_json, repository_failure,
    validate_budget, CommandResult, Failure,
};

#[derive(Debug, Clone, Args)]
pub struct RecommendArgs {
    #[arg(help = "What the shopper is looking for, e.g. \"ecran\" or \"carte graphique\"")]
    pub query: String,
    #[arg(long)]
    pub budget: f64,
    #[arg(long, default_value = "medium", help = "low, medium or high; anything else means medium")]
    pub profile: String,
    #[arg(long)]
    pub category: Option<String>,
}

impl RecommendArgs {
    pub(crate) fn profile(&self) -> Profile {
        Profile::parse_lenient(&self.profile)
    }
}

#[derive(Debug, Serialize)]
struct RecommendOutput {
    query: String,
    budget: f64,
    profile: Profile,
    results_count: usize,
    recommendations: RecommendationSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    history_warning: Option<String>,
}

pub fn run(args: RecommendArgs) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("recommend") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        let budget = validate_budget(args.budget)?;
        let profile = args.profile();
        let recommender = Recommender::new(config.scoring.clone());
        let pool = open_catalog(&config).await?;
        let candidates = load_candidates(&config, &pool, &args, budget).await?;

        let entry = SearchHistoryEntry::new(
            args.query.clone(),
            args.category.clone(),
            budget,
            profile,
            u32::try_from(candidates.len()).unwrap_or(u32::MAX),
        );
        let history_warning =
            record_search(&SqlSearchHistoryRepository::new(pool.clone()), entry).await;
        pool.close().await;

        let recommendations = recommender.recommend(&candidates, budget, profile);
        render_json(&RecommendOutput {
            query: args.query.clone(),
            budget,
            profile,
            results_count: candidates.len(),
            recommendations,
            history_warning,
        })
    });

    CommandResult::from_outcome("recommend", outcome)
}

/// Budget candidates for `args` read from an already opened catalog.
pub(crate) async fn load_candidates(
    config: &AppConfig,
    pool: &DbPool,
    args: &RecommendArgs,
    budget: f64,
) -> Result<Vec<Product>, Failure> {
    let matcher = build_matcher(config)?;
    let products = SqlProductRepository::new(pool.clone());
    budget_candidates(
        &products,
        &matcher,
        &args.query,
        args.category.as_deref(),
        config.scoring.candidate_price_cap(budget),
    )
    .await
    .map_err(repository_failure)
}

/// Records the lookup. A failed write is reported back as a warning and
/// never fails the command.
async fn record_search(
    history: &dyn SearchHistoryRepository,
    entry: SearchHistoryEntry,
) -> Option<String> {
    history
        .record(entry)
        .await
        .err()
        .map(|error| format!("search history not recorded: {error}"))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use smartchoice_core::recommend::Profile;
    use smartchoice_db::{
        InMemorySearchHistoryRepository, RepositoryError, SearchHistoryEntry,
        SearchHistoryRepository,
    };

    use super::record_search;

    struct ReadOnlyHistory;

    #[async_trait]
    impl SearchHistoryRepository for ReadOnlyHistory {
        async fn record(&self, _entry: SearchHistoryEntry) -> Result<i64, RepositoryError> {
            Err(RepositoryError::Decode("attempt to write a readonly database".to_string()))
        }

        async fn recent(&self, _limit: u32) -> Result<Vec<SearchHistoryEntry>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    fn entry() -> SearchHistoryEntry {
        SearchHistoryEntry::new("ecran".to_string(), None, 900.0, Profile::High, 2)
    }

    #[tokio::test]
    async fn failed_history_write_becomes_a_warning() {
        let warning = record_search(&ReadOnlyHistory, entry()).await;

        assert!(warning.is_some_and(|message| message.contains("readonly database")));
    }

    #[tokio::test]
    async fn successful_history_write_has_no_warning() {
        let history = InMemorySearchHistoryRepository::default();

        assert!(record_search(&history, entry()).await.is_none());
        assert_eq!(history.recent(5).await.expect("recent").len(), 1);
    }
}
