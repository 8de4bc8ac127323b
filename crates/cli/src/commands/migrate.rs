use crate::commands::{build_runtime, load_config, open_catalog, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("migrate") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        let pool = open_catalog(&config).await?;
        pool.close().await;
        Ok(format!("migrations applied to {}", config.database.url))
    });

    CommandResult::from_outcome("migrate", outcome)
}
