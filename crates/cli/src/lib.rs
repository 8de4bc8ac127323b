pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::alternatives::AlternativesArgs;
use commands::recommend::RecommendArgs;
use commands::search::SearchArgs;
use commands::trends::TrendsArgs;

#[derive(Debug, Parser)]
#[command(
    name = "smartchoice",
    about = "SmartChoice catalog and recommendation CLI",
    long_about = "Prepare the product catalog database and run keyword search, budget recommendations, alternatives and trend summaries against it.",
    after_help = "Examples:\n  smartchoice seed\n  smartchoice search ecran --sort price_low\n  smartchoice recommend \"carte graphique\" --budget 1000 --profile high"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog (idempotent)")]
    Seed,
    #[command(about = "Search the catalog with keyword expansion and structural filters")]
    Search(SearchArgs),
    #[command(about = "Recommend products for a query, budget and shopper profile")]
    Recommend(RecommendArgs),
    #[command(about = "Suggest the next best products, skipping ids already shown")]
    Alternatives(AlternativesArgs),
    #[command(about = "Summarize price and tier distributions of the catalog")]
    Trends(TrendsArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Search(args) => commands::search::run(args),
        Command::Recommend(args) => commands::recommend::run(args),
        Command::Alternatives(args) => commands::alternatives::run(args),
        Command::Trends(args) => commands::trends::run(args),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
