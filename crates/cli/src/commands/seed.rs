use smartchoice_db::SeedCatalog;

use crate::commands::{build_runtime, load_config, open_catalog, CommandResult, Failure};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        let pool = open_catalog(&config).await?;

        let seeded = SeedCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        let verification = SeedCatalog::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 5u8))?;
        pool.close().await;

        if !verification.all_present {
            return Err(verification_failure(&verification.checks));
        }

        Ok(format!(
            "seeded {} products across categories: {}",
            seeded.products_seeded,
            seeded.categories.join(", ")
        ))
    });

    CommandResult::from_outcome("seed", outcome)
}

fn verification_failure(checks: &[(&'static str, bool)]) -> Failure {
    let missing =
        checks.iter().filter_map(|(name, present)| (!present).then_some(*name)).collect::<Vec<_>>();
    let message = if missing.is_empty() {
        "some seed products failed to load".to_string()
    } else {
        format!("seed verification failed for: {}", missing.join(", "))
    };
    ("seed_verification", message, 5)
}
