use clap::Args;
use serde::Serialize;
use smartchoice_core::catalog::{SearchFilters, SortOrder};
use smartchoice_core::config::MAX_PAGE_LIMIT;
use smartchoice_core::domain::product::Product;
use smartchoice_db::{ProductQuery, ProductRepository, SqlProductRepository};

use crate::commands::{
    build_matcher, build_runtime, invalid_input, load_config, open_catalog, render_json,
    repository_failure, CommandResult,
};

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    #[arg(help = "Free-text query; French retail keywords are expanded")]
    pub query: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub min_price: Option<f64>,
    #[arg(long)]
    pub max_price: Option<f64>,
    #[arg(long, default_value = "relevance", help = "relevance, price_low, price_high, rating, newest, discount")]
    pub sort: String,
    #[arg(long)]
    pub limit: Option<usize>,
}

impl SearchArgs {
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            category: self.category.clone(),
            brand: self.brand.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock_only: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchOutput {
    query: Option<String>,
    sort: &'static str,
    total: usize,
    products: Vec<Product>,
}

pub fn run(args: SearchArgs) -> CommandResult {
    let config = match load_config("search") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("search") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        let filters = args.filters();
        filters.validate().map_err(|error| invalid_input(error.to_string()))?;
        let limit = args.limit.unwrap_or(config.catalog.default_limit).clamp(1, MAX_PAGE_LIMIT);
        let sort = SortOrder::parse_lenient(&args.sort);
        let matcher = build_matcher(&config)?;

        let pool = open_catalog(&config).await?;
        let repository = SqlProductRepository::new(pool.clone());
        let candidates =
            repository.list(&ProductQuery::from(&filters)).await.map_err(repository_failure)?;
        pool.close().await;

        let mut products = matcher.search(&candidates, args.query.as_deref(), &filters, sort);
        let total = products.len();
        products.truncate(limit);

        render_json(&SearchOutput { query: args.query.clone(), sort: sort.as_str(), total, products })
    });

    CommandResult::from_outcome("search", outcome)
}
