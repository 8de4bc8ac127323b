use clap::Args;
use smartchoice_core::recommend::analyze_trends;
use smartchoice_db::{ProductQuery, ProductRepository, SqlProductRepository};

use crate::commands::{
    build_runtime, load_config, open_catalog, render_json, repository_failure, CommandResult,
};

#[derive(Debug, Clone, Args)]
pub struct TrendsArgs {
    #[arg(long)]
    pub category: Option<String>,
}

pub fn run(args: TrendsArgs) -> CommandResult {
    let config = match load_config("trends") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("trends") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        let pool = open_catalog(&config).await?;
        let query = ProductQuery { category: args.category.clone(), ..ProductQuery::default() };
        let products =
            SqlProductRepository::new(pool.clone()).list(&query).await.map_err(repository_failure)?;
        pool.close().await;

        render_json(&analyze_trends(&products))
    });

    CommandResult::from_outcome("trends", outcome)
}
