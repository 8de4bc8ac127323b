use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::SynonymTable;
use crate::recommend::{ReasonLocale, ScoringConfig, ScoringWeights};

pub const DEFAULT_CONFIG_FILE: &str = "smartchoice.toml";
pub const FALLBACK_CONFIG_FILE: &str = "config/smartchoice.toml";
pub const MAX_PAGE_LIMIT: usize = 200;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Start from the shipped French retail table before applying file and inline entries
    pub builtin_synonyms: bool,
    /// External `[synonyms]` TOML document
    pub synonyms_path: Option<PathBuf>,
    /// Inline `[catalog.synonyms]` entries, applied last
    pub synonyms: SynonymTable,
    pub default_limit: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub server_port: Option<u16>,
    pub synonyms_path: Option<PathBuf>,
    pub locale: Option<ReasonLocale>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://smartchoice.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            catalog: CatalogConfig {
                builtin_synonyms: true,
                synonyms_path: None,
                synonyms: SynonymTable::new(),
                default_limit: 50,
            },
            scoring: ScoringConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Effective keyword table: builtin entries, then the synonyms file, then
    /// inline entries. Later sources replace earlier entries for the same term.
    pub fn synonym_table(&self) -> Result<SynonymTable, ConfigError> {
        let mut table =
            if self.catalog.builtin_synonyms { SynonymTable::french_retail() } else { SynonymTable::new() };

        if let Some(path) = &self.catalog.synonyms_path {
            let raw = fs::read_to_string(path)
                .map_err(|source| ConfigError::ReadFile { path: path.clone(), source })?;
            let from_file = SynonymTable::from_toml_str(&raw)
                .map_err(|source| ConfigError::ParseFile { path: path.clone(), source })?;
            table.extend(from_file);
        }

        table.extend(self.catalog.synonyms.clone());
        Ok(table)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(builtin_synonyms) = catalog.builtin_synonyms {
                self.catalog.builtin_synonyms = builtin_synonyms;
            }
            if let Some(synonyms_path) = catalog.synonyms_path {
                self.catalog.synonyms_path = Some(synonyms_path);
            }
            if let Some(synonyms) = catalog.synonyms {
                let mut table = SynonymTable::new();
                for (term, related) in synonyms {
                    table.insert(term, related);
                }
                self.catalog.synonyms = table;
            }
            if let Some(default_limit) = catalog.default_limit {
                self.catalog.default_limit = default_limit;
            }
        }

        if let Some(scoring) = patch.scoring {
            if let Some(price_ceiling) = scoring.price_ceiling {
                self.scoring.price_ceiling = price_ceiling;
            }
            if let Some(min_reliability) = scoring.min_reliability {
                self.scoring.min_reliability = min_reliability;
            }
            if let Some(alternatives_limit) = scoring.alternatives_limit {
                self.scoring.alternatives_limit = alternatives_limit;
            }
            if let Some(budget_headroom) = scoring.budget_headroom {
                self.scoring.budget_headroom = budget_headroom;
            }
            if let Some(locale) = scoring.locale {
                self.scoring.locale = locale;
            }
            if let Some(weights) = scoring.weights {
                if let Some(low) = weights.low {
                    self.scoring.weights.low = low;
                }
                if let Some(medium) = weights.medium {
                    self.scoring.weights.medium = medium;
                }
                if let Some(high) = weights.high {
                    self.scoring.weights.high = high;
                }
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SMARTCHOICE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SMARTCHOICE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("SMARTCHOICE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SMARTCHOICE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("SMARTCHOICE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SMARTCHOICE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SMARTCHOICE_SERVER_PORT") {
            self.server.port = parse_u16("SMARTCHOICE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SMARTCHOICE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SMARTCHOICE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("SMARTCHOICE_CATALOG_BUILTIN_SYNONYMS") {
            self.catalog.builtin_synonyms =
                parse_bool("SMARTCHOICE_CATALOG_BUILTIN_SYNONYMS", &value)?;
        }
        if let Some(value) = read_env("SMARTCHOICE_CATALOG_SYNONYMS_PATH") {
            self.catalog.synonyms_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("SMARTCHOICE_CATALOG_DEFAULT_LIMIT") {
            self.catalog.default_limit = parse_usize("SMARTCHOICE_CATALOG_DEFAULT_LIMIT", &value)?;
        }

        if let Some(value) = read_env("SMARTCHOICE_SCORING_PRICE_CEILING") {
            self.scoring.price_ceiling = parse_f64("SMARTCHOICE_SCORING_PRICE_CEILING", &value)?;
        }
        if let Some(value) = read_env("SMARTCHOICE_SCORING_MIN_RELIABILITY") {
            self.scoring.min_reliability = parse_u32("SMARTCHOICE_SCORING_MIN_RELIABILITY", &value)?;
        }
        if let Some(value) = read_env("SMARTCHOICE_SCORING_ALTERNATIVES_LIMIT") {
            self.scoring.alternatives_limit =
                parse_usize("SMARTCHOICE_SCORING_ALTERNATIVES_LIMIT", &value)?;
        }
        if let Some(value) = read_env("SMARTCHOICE_SCORING_BUDGET_HEADROOM") {
            self.scoring.budget_headroom =
                parse_f64("SMARTCHOICE_SCORING_BUDGET_HEADROOM", &value)?;
        }
        if let Some(value) = read_env("SMARTCHOICE_SCORING_LOCALE") {
            self.scoring.locale = ReasonLocale::parse(&value).ok_or_else(|| {
                ConfigError::InvalidEnvOverride {
                    key: "SMARTCHOICE_SCORING_LOCALE".to_string(),
                    value: value.clone(),
                }
            })?;
        }

        let log_level =
            read_env("SMARTCHOICE_LOGGING_LEVEL").or_else(|| read_env("SMARTCHOICE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SMARTCHOICE_LOGGING_FORMAT").or_else(|| read_env("SMARTCHOICE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(synonyms_path) = overrides.synonyms_path {
            self.catalog.synonyms_path = Some(synonyms_path);
        }
        if let Some(locale) = overrides.locale {
            self.scoring.locale = locale;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_catalog(&self.catalog)?;
        validate_scoring(&self.scoring)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(FALLBACK_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.default_limit == 0 || catalog.default_limit > MAX_PAGE_LIMIT {
        return Err(ConfigError::Validation(format!(
            "catalog.default_limit must be in range 1..={MAX_PAGE_LIMIT}"
        )));
    }

    if let Some(path) = &catalog.synonyms_path {
        if !path.exists() {
            return Err(ConfigError::Validation(format!(
                "catalog.synonyms_path `{}` does not exist",
                path.display()
            )));
        }
    }

    Ok(())
}

fn validate_scoring(scoring: &ScoringConfig) -> Result<(), ConfigError> {
    if !scoring.price_ceiling.is_finite() || scoring.price_ceiling <= 0.0 {
        return Err(ConfigError::Validation(
            "scoring.price_ceiling must be a positive number".to_string(),
        ));
    }

    if scoring.min_reliability > 100 {
        return Err(ConfigError::Validation(
            "scoring.min_reliability must be in range 0..=100".to_string(),
        ));
    }

    if scoring.alternatives_limit == 0 {
        return Err(ConfigError::Validation(
            "scoring.alternatives_limit must be greater than zero".to_string(),
        ));
    }

    if !scoring.budget_headroom.is_finite() || scoring.budget_headroom < 1.0 {
        return Err(ConfigError::Validation(
            "scoring.budget_headroom must be at least 1.0".to_string(),
        ));
    }

    let profiles = [
        ("low", scoring.weights.low),
        ("medium", scoring.weights.medium),
        ("high", scoring.weights.high),
    ];
    for (name, weights) in profiles {
        validate_weights(name, weights)?;
    }

    Ok(())
}

fn validate_weights(profile: &str, weights: ScoringWeights) -> Result<(), ConfigError> {
    let components = [weights.price, weights.quality, weights.reliability];
    if components.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
        return Err(ConfigError::Validation(format!(
            "scoring.weights.{profile} must contain non-negative numbers"
        )));
    }

    if weights.sum() <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "scoring.weights.{profile} must not all be zero"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    catalog: Option<CatalogPatch>,
    scoring: Option<ScoringPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    builtin_synonyms: Option<bool>,
    synonyms_path: Option<PathBuf>,
    synonyms: Option<BTreeMap<String, Vec<String>>>,
    default_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringPatch {
    price_ceiling: Option<f64>,
    min_reliability: Option<u32>,
    alternatives_limit: Option<usize>,
    budget_headroom: Option<f64>,
    locale: Option<ReasonLocale>,
    weights: Option<WeightsPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct WeightsPatch {
    low: Option<ScoringWeights>,
    medium: Option<ScoringWeights>,
    high: Option<ScoringWeights>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::recommend::{ReasonLocale, DEFAULT_MIN_RELIABILITY, DEFAULT_PRICE_CEILING};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_documented_scoring_constants() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.scoring.price_ceiling == DEFAULT_PRICE_CEILING, "ceiling should be 2000")?;
        ensure(
            config.scoring.min_reliability == DEFAULT_MIN_RELIABILITY,
            "reliability threshold should be 60",
        )?;
        ensure(config.scoring.locale == ReasonLocale::French, "default locale should be french")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SMARTCHOICE_DB", "sqlite://interpolated.db");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("smartchoice.toml");
            fs::write(
                &path,
                r#"
[database]
url = "${TEST_SMARTCHOICE_DB}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://interpolated.db",
                "database url should be loaded from environment",
            )
        })();

        clear_vars(&["TEST_SMARTCHOICE_DB"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SMARTCHOICE_LOG_LEVEL", "warn");
        env::set_var("SMARTCHOICE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["SMARTCHOICE_LOG_LEVEL", "SMARTCHOICE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SMARTCHOICE_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("SMARTCHOICE_SCORING_MIN_RELIABILITY", "75");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("smartchoice.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[scoring]
min_reliability = 50
price_ceiling = 3000.0
locale = "english"

[scoring.weights.low]
price = 0.6
quality = 0.2
reliability = 0.2

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.scoring.min_reliability == 75, "env threshold should win over file")?;
            ensure(config.scoring.price_ceiling == 3000.0, "file ceiling should win over default")?;
            ensure(config.scoring.locale == ReasonLocale::English, "file locale should apply")?;
            ensure(config.scoring.weights.low.price == 0.6, "file weights should apply")?;
            ensure(config.scoring.weights.medium.quality == 0.4, "untouched weights keep defaults")
        })();

        clear_vars(&["SMARTCHOICE_DATABASE_URL", "SMARTCHOICE_SCORING_MIN_RELIABILITY"]);
        result
    }

    #[test]
    fn synonym_sources_are_layered() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let synonyms_path = dir.path().join("synonyms.toml");
        fs::write(
            &synonyms_path,
            r#"
[synonyms]
souris = ["razer"]
casque = ["sony", "bose"]
"#,
        )
        .map_err(|err| err.to_string())?;

        let config_path = dir.path().join("smartchoice.toml");
        fs::write(
            &config_path,
            r#"
[catalog.synonyms]
casque = ["sennheiser"]
"#,
        )
        .map_err(|err| err.to_string())?;

        let config = AppConfig::load(LoadOptions {
            config_path: Some(config_path),
            overrides: ConfigOverrides {
                synonyms_path: Some(synonyms_path),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        let table = config.synonym_table().map_err(|err| err.to_string())?;
        ensure(table.get("souris") == Some(&["razer".to_string()][..]), "file entry should win")?;
        ensure(
            table.get("casque") == Some(&["sennheiser".to_string()][..]),
            "inline entry should win over file",
        )?;
        ensure(table.get("ecran").is_some(), "builtin entries should remain")
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SMARTCHOICE_SCORING_PRICE_CEILING", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("scoring.price_ceiling")
            );
            ensure(has_message, "validation failure should mention scoring.price_ceiling")
        })();

        clear_vars(&["SMARTCHOICE_SCORING_PRICE_CEILING"]);
        result
    }

    #[test]
    fn malformed_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SMARTCHOICE_SERVER_PORT", "eighty");

        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) if key == "SMARTCHOICE_SERVER_PORT" => {
                Ok(())
            }
            other => Err(format!("expected invalid override error, got {other:?}")),
        };

        clear_vars(&["SMARTCHOICE_SERVER_PORT"]);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should be reported",
        )
    }
}
