use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_CACHE_CAPACITY: usize = 1000;
const DEFAULT_REFERENCE_CURRENCY: &str = "EUR";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Query cache configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Disable to route every read straight to the database
    #[serde(default = "default_true_bool")]
    pub enabled: bool,

    /// Maximum number of cached query results
    #[serde(default = "default_cache_capacity")]
    #[validate(range(min = 1))]
    pub capacity: usize,

    /// Default TTL (Time To Live) for cache entries in seconds
    #[serde(default)]
    pub default_ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
            default_ttl_secs: Some(300),
        }
    }
}

/// Where document bytes are kept
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Directory tree under `root_dir`
    #[default]
    Local,
    /// S3 or an S3-compatible service such as MinIO
    S3,
}

/// Document object storage configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Local backend only
    #[serde(default = "default_storage_root")]
    pub root_dir: PathBuf,

    #[serde(default = "default_bucket")]
    #[validate(length(min = 1, message = "Bucket name is required"))]
    pub bucket: String,

    #[serde(default = "default_max_upload_bytes")]
    #[validate(range(min = 1))]
    pub max_upload_bytes: usize,

    /// Custom S3 endpoint; path-style addressing is used when set
    #[serde(default)]
    pub s3_endpoint: Option<String>,

    #[serde(default)]
    pub s3_region: Option<String>,

    /// Key prefix inside the S3 bucket
    #[serde(default)]
    pub s3_prefix: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root_dir: default_storage_root(),
            bucket: default_bucket(),
            max_upload_bytes: default_max_upload_bytes(),
            s3_endpoint: None,
            s3_region: None,
            s3_prefix: None,
        }
    }
}

/// Static conversion table used by the dashboard.
///
/// `rates[code]` is the number of reference-currency units per one unit of `code`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurrencyConfig {
    #[serde(default = "default_reference_currency")]
    pub reference: String,

    #[serde(default = "default_currency_rates")]
    pub rates: HashMap<String, Decimal>,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            reference: default_reference_currency(),
            rates: default_currency_rates(),
        }
    }
}

impl CurrencyConfig {
    /// Rate table keyed by upper-case currency code.
    ///
    /// The config crate lower-cases map keys, so codes are normalized here.
    pub fn normalized_rates(&self) -> HashMap<String, Decimal> {
        self.rates
            .iter()
            .map(|(code, rate)| (code.trim().to_ascii_uppercase(), *rate))
            .collect()
    }

    pub fn reference_code(&self) -> String {
        self.reference.trim().to_ascii_uppercase()
    }
}

/// Seller block printed on quotation documents
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyProfile {
    #[serde(default = "default_company_name")]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: default_company_name(),
            address: None,
            tax_id: None,
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "database_url is required"))]
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    #[validate(length(min = 1))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins; permissive when unset
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Query cache configuration
    #[serde(default)]
    #[validate]
    pub cache: CacheConfig,

    /// Document storage
    #[serde(default)]
    #[validate]
    pub storage: StorageConfig,

    /// Currency conversion table for dashboard rollups
    #[serde(default)]
    pub currency: CurrencyConfig,

    /// Seller details for generated documents
    #[serde(default)]
    pub company: CompanyProfile,

    /// Event channel buffer size
    #[serde(default = "default_event_channel_capacity")]
    #[validate(range(min = 1))]
    pub event_channel_capacity: usize,

    /// Default page size for list endpoints
    #[serde(default = "default_api_page_size")]
    #[validate(range(min = 1))]
    pub api_default_page_size: u64,

    /// Upper bound for the `limit` query parameter
    #[serde(default = "default_api_max_page_size")]
    #[validate(range(min = 1))]
    pub api_max_page_size: u64,
}

impl AppConfig {
    /// Creates a configuration with defaults for everything but the essentials
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            cache: CacheConfig::default(),
            storage: StorageConfig::default(),
            currency: CurrencyConfig::default(),
            company: CompanyProfile::default(),
            event_channel_capacity: default_event_channel_capacity(),
            api_default_page_size: default_api_page_size(),
            api_max_page_size: default_api_max_page_size(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Gets cache TTL in Duration
    pub fn cache_ttl(&self) -> Option<std::time::Duration> {
        self.cache
            .default_ttl_secs
            .map(std::time::Duration::from_secs)
    }

    /// Cross-field checks that the derive cannot express.
    pub fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.api_default_page_size > self.api_max_page_size {
            let mut err = ValidationError::new("api_default_page_size");
            err.message = Some("api_default_page_size must not exceed api_max_page_size".into());
            errors.add("api_default_page_size", err);
        }

        if self.db_min_connections > self.db_max_connections {
            let mut err = ValidationError::new("db_min_connections");
            err.message = Some("db_min_connections must not exceed db_max_connections".into());
            errors.add("db_min_connections", err);
        }

        let rates = self.currency.normalized_rates();
        let reference = self.currency.reference_code();
        match rates.get(&reference) {
            Some(rate) if *rate == Decimal::ONE => {}
            Some(_) => {
                let mut err = ValidationError::new("currency_reference_rate");
                err.message = Some(
                    format!("Reference currency {reference} must have a rate of exactly 1").into(),
                );
                errors.add("currency", err);
            }
            None => {
                let mut err = ValidationError::new("currency_reference_missing");
                err.message =
                    Some(format!("Reference currency {reference} is missing from rates").into());
                errors.add("currency", err);
            }
        }

        if let Some((code, _)) = rates.iter().find(|(_, rate)| **rate <= Decimal::ZERO) {
            let mut err = ValidationError::new("currency_rate_positive");
            err.message = Some(format!("Rate for {code} must be positive").into());
            errors.add("currency", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_true_bool() -> bool {
    true
}

fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    2
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data/storage")
}

fn default_bucket() -> String {
    "documents".to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_reference_currency() -> String {
    DEFAULT_REFERENCE_CURRENCY.to_string()
}

/// Placeholder rates; replace per deployment.
fn default_currency_rates() -> HashMap<String, Decimal> {
    [
        ("EUR", Decimal::ONE),
        ("USD", Decimal::new(92, 2)),
        ("GBP", Decimal::new(117, 2)),
        ("PLN", Decimal::new(23, 2)),
        ("CNY", Decimal::new(13, 2)),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect()
}

fn default_company_name() -> String {
    "My Company".to_string()
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_api_page_size() -> u64 {
    20
}

fn default_api_max_page_size() -> u64 {
    100
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("crm_api={},tower_http=debug,sea_orm=warn", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit configuration directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://crm.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration constraint validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn base_config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        )
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let mut cfg = base_config();
        cfg.log_level = "loud".into();
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("log_level"));
    }

    #[test]
    fn reference_currency_must_be_in_rates() {
        let mut cfg = base_config();
        cfg.currency.reference = "CHF".into();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn reference_currency_must_have_unit_rate() {
        let mut cfg = base_config();
        cfg.currency.rates.insert("EUR".into(), Decimal::new(2, 0));
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        let mut cfg = base_config();
        cfg.currency.rates.insert("JPY".into(), Decimal::ZERO);
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn default_page_size_cannot_exceed_max() {
        let mut cfg = base_config();
        cfg.api_default_page_size = 500;
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn rates_are_normalized_to_upper_case() {
        let mut cfg = base_config();
        cfg.currency.rates = HashMap::from([
            ("eur".to_string(), Decimal::ONE),
            ("usd".to_string(), Decimal::new(92, 2)),
        ]);
        cfg.currency.reference = "eur".into();
        let rates = cfg.currency.normalized_rates();
        assert_eq!(rates.get("USD"), Some(&Decimal::new(92, 2)));
        assert_eq!(cfg.currency.reference_code(), "EUR");
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn loads_file_layer_over_defaults() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join("default.toml")).unwrap();
        writeln!(
            file,
            r#"
            database_url = "sqlite::memory:"
            port = 9090

            [company]
            name = "Acme Trading"

            [storage]
            backend = "s3"
            bucket = "crm-docs"
            s3_endpoint = "http://localhost:9000"
            "#
        )
        .unwrap();

        let cfg = load_config_from(dir.path()).unwrap();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.company.name, "Acme Trading");
        assert_eq!(cfg.storage.backend, StorageBackend::S3);
        assert_eq!(cfg.storage.bucket, "crm-docs");
        assert_eq!(cfg.storage.s3_endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(cfg.currency.reference_code(), "EUR");
    }
}
