use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use smartchoice_core::config::{AppConfig, DEFAULT_CONFIG_FILE, FALLBACK_CONFIG_FILE};
use toml::Value;

use crate::commands::{load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    CommandResult::success("config", render(&config))
}

fn render(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let synonyms_path = config
        .catalog
        .synonyms_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unset>".to_string());
    let synonym_terms = config
        .synonym_table()
        .map(|table| table.len().to_string())
        .unwrap_or_else(|error| format!("<unreadable: {error}>"));

    let fields = vec![
        field("database.url", config.database.url.clone(), &["SMARTCHOICE_DATABASE_URL"]),
        field(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["SMARTCHOICE_DATABASE_MAX_CONNECTIONS"],
        ),
        field(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["SMARTCHOICE_DATABASE_TIMEOUT_SECS"],
        ),
        field(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["SMARTCHOICE_SERVER_BIND_ADDRESS"],
        ),
        field("server.port", config.server.port.to_string(), &["SMARTCHOICE_SERVER_PORT"]),
        field(
            "catalog.builtin_synonyms",
            config.catalog.builtin_synonyms.to_string(),
            &["SMARTCHOICE_CATALOG_BUILTIN_SYNONYMS"],
        ),
        field("catalog.synonyms_path", synonyms_path, &["SMARTCHOICE_CATALOG_SYNONYMS_PATH"]),
        field("catalog.synonyms", format!("{synonym_terms} effective terms"), &[]),
        field(
            "catalog.default_limit",
            config.catalog.default_limit.to_string(),
            &["SMARTCHOICE_CATALOG_DEFAULT_LIMIT"],
        ),
        field(
            "scoring.price_ceiling",
            config.scoring.price_ceiling.to_string(),
            &["SMARTCHOICE_SCORING_PRICE_CEILING"],
        ),
        field(
            "scoring.min_reliability",
            config.scoring.min_reliability.to_string(),
            &["SMARTCHOICE_SCORING_MIN_RELIABILITY"],
        ),
        field(
            "scoring.alternatives_limit",
            config.scoring.alternatives_limit.to_string(),
            &["SMARTCHOICE_SCORING_ALTERNATIVES_LIMIT"],
        ),
        field(
            "scoring.budget_headroom",
            config.scoring.budget_headroom.to_string(),
            &["SMARTCHOICE_SCORING_BUDGET_HEADROOM"],
        ),
        field("scoring.locale", format!("{:?}", config.scoring.locale), &["SMARTCHOICE_SCORING_LOCALE"]),
        field(
            "logging.level",
            config.logging.level.clone(),
            &["SMARTCHOICE_LOGGING_LEVEL", "SMARTCHOICE_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            config.logging.format.as_str().to_string(),
            &["SMARTCHOICE_LOGGING_FORMAT", "SMARTCHOICE_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }
    lines.join("\n")
}

type Field = (&'static str, String, &'static [&'static str]);

fn field(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Field {
    (key, value, env_keys)
}

fn detect_config_path() -> Option<PathBuf> {
    [DEFAULT_CONFIG_FILE, FALLBACK_CONFIG_FILE].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
