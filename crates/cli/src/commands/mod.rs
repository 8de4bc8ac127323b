pub mod alternatives;
pub mod config;
pub mod migrate;
pub mod recommend;
pub mod search;
pub mod seed;
pub mod trends;

use serde::Serialize;
use smartchoice_core::catalog::Matcher;
use smartchoice_core::config::{AppConfig, LoadOptions};
use smartchoice_core::recommend::validate_budget as check_budget;
use smartchoice_db::{connect_with_settings, migrations, DbPool};
use tokio::runtime::Runtime;

/// `(error_class, message, exit_code)` raised inside a command's async body.
pub(crate) type Failure = (&'static str, String, u8);

pub(crate) const EXIT_CONFIG: u8 = 2;
pub(crate) const EXIT_RUNTIME: u8 = 3;
pub(crate) const EXIT_DB: u8 = 4;
pub(crate) const EXIT_MIGRATION: u8 = 5;
pub(crate) const EXIT_INVALID_INPUT: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub(crate) fn from_outcome(command: &str, outcome: Result<String, Failure>) -> Self {
        match outcome {
            Ok(message) => Self::success(command, message),
            Err((error_class, message, exit_code)) => {
                Self::failure(command, error_class, message, exit_code)
            }
        }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            EXIT_RUNTIME,
        )
    })
}

/// Connects and brings the schema up to date so read commands work on a
/// fresh database.
pub(crate) async fn open_catalog(config: &AppConfig) -> Result<DbPool, Failure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB))?;

    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

    Ok(pool)
}

pub(crate) fn build_matcher(config: &AppConfig) -> Result<Matcher, Failure> {
    config
        .synonym_table()
        .map(Matcher::new)
        .map_err(|error| ("config_validation", error.to_string(), EXIT_CONFIG))
}

pub(crate) fn invalid_input(message: impl Into<String>) -> Failure {
    ("invalid_input", message.into(), EXIT_INVALID_INPUT)
}

pub(crate) fn repository_failure(error: impl ToString) -> Failure {
    ("repository", error.to_string(), EXIT_DB)
}

pub(crate) fn render_json<T: Serialize>(value: &T) -> Result<String, Failure> {
    serde_json::to_string(value).map_err(|error| ("serialization", error.to_string(), 1))
}

pub(crate) fn validate_budget(budget: f64) -> Result<f64, Failure> {
    check_budget(budget).map_err(|error| invalid_input(error.to_string()))
}
