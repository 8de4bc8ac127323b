use clap::Args;
use serde::Serialize;
use smartchoice_core::domain::product::ProductId;
use smartchoice_core::recommend::{Recommender, ScoredProduct};

use crate::commands::recommend::{load_candidates, RecommendArgs};
use crate::commands::{
    build_runtime, load_config, open_catalog, render_json, validate_budget, CommandResult,
};

#[derive(Debug, Clone, Args)]
pub struct AlternativesArgs {
    #[command(flatten)]
    pub request: RecommendArgs,
    #[arg(long = "exclude", value_delimiter = ',', help = "Product ids already shown")]
    pub exclude_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct AlternativesOutput {
    excluded: Vec<ProductId>,
    alternatives: Vec<ScoredProduct>,
}

pub fn run(args: AlternativesArgs) -> CommandResult {
    let config = match load_config("alternatives") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("alternatives") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        let budget = validate_budget(args.request.budget)?;
        let excluded: Vec<ProductId> = args.exclude_ids.iter().copied().map(ProductId).collect();
        let pool = open_catalog(&config).await?;
        let candidates = load_candidates(&config, &pool, &args.request, budget).await;
        pool.close().await;
        let candidates = candidates?;

        let alternatives = Recommender::new(config.scoring.clone()).alternatives(
            &candidates,
            budget,
            args.request.profile(),
            &excluded,
        );
        render_json(&AlternativesOutput { excluded, alternatives })
    });

    CommandResult::from_outcome("alternatives", outcome)
}
