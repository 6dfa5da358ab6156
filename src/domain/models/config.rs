use serde::{Deserialize, Serialize};

/// Main configuration structure for Precedent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Filing registry client configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Generative text backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Precedence engine thresholds
    #[serde(default)]
    pub precedence: PrecedenceConfig,

    /// Investigation pipeline thresholds
    #[serde(default)]
    pub investigation: InvestigationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            registry: RegistryConfig::default(),
            backend: BackendConfig::default(),
            precedence: PrecedenceConfig::default(),
            investigation: InvestigationConfig::default(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".precedent/precedent.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional directory for rotated file output
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Filing registry client configuration. The registry expects polite,
/// identified, throttled access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistryConfig {
    /// Base URL of the filing registry
    #[serde(default = "default_registry_base_url")]
    pub base_url: String,

    /// User-Agent header (the registry requires a contact address)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Sustained request rate toward the registry
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst allowance on top of the sustained rate
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// Fixed delay between evidence-collection lookups, in milliseconds
    #[serde(default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Retry policy for transient registry failures
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_registry_base_url() -> String {
    "https://www.sec.gov".to_string()
}

fn default_user_agent() -> String {
    "precedent/0.1 (data-quality pipeline; ops@example.com)".to_string()
}

const fn default_requests_per_second() -> f64 {
    5.0
}

const fn default_burst_size() -> u32 {
    5
}

const fn default_politeness_delay_ms() -> u64 {
    350
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_base_url(),
            user_agent: default_user_agent(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
            politeness_delay_ms: default_politeness_delay_ms(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum retry attempts for a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    15_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Generative text backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    /// Whether a live backend should be wired at all. When false the
    /// hypothesis generator runs its deterministic rule-based path.
    #[serde(default)]
    pub enabled: bool,

    /// API base URL
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_backend_model")]
    pub model: String,

    /// API version header
    #[serde(default = "default_backend_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,

    /// Max tokens to generate
    #[serde(default = "default_backend_max_tokens")]
    pub max_tokens: u32,
}

fn default_backend_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_backend_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_backend_api_version() -> String {
    "2023-06-01".to_string()
}

const fn default_backend_timeout_secs() -> u64 {
    120
}

const fn default_backend_max_tokens() -> u32 {
    2048
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_backend_base_url(),
            model: default_backend_model(),
            api_version: default_backend_api_version(),
            timeout_secs: default_backend_timeout_secs(),
            max_tokens: default_backend_max_tokens(),
        }
    }
}

/// Precedence engine thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PrecedenceConfig {
    /// How many precedence ranks better an older filing must be to override
    /// a more recent one of the same category.
    #[serde(default = "default_recency_rank_margin")]
    pub recency_rank_margin: usize,
}

const fn default_recency_rank_margin() -> usize {
    2
}

impl Default for PrecedenceConfig {
    fn default() -> Self {
        Self {
            recency_rank_margin: default_recency_rank_margin(),
        }
    }
}

/// Investigation pipeline thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InvestigationConfig {
    /// Years an announced date must precede the IPO date by before the
    /// temporal-inconsistency anomaly fires (exclusive boundary).
    #[serde(default = "default_temporal_gap_years")]
    pub temporal_gap_years: f64,

    /// How many past learning cases feed hypothesis generation.
    #[serde(default = "default_past_case_limit")]
    pub past_case_limit: usize,
}

const fn default_temporal_gap_years() -> f64 {
    2.0
}

const fn default_past_case_limit() -> usize {
    5
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            temporal_gap_years: default_temporal_gap_years(),
            past_case_limit: default_past_case_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.path, ".precedent/precedent.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.precedence.recency_rank_margin, 2);
        assert!((config.investigation.temporal_gap_years - 2.0).abs() < f64::EPSILON);
        assert!(!config.backend.enabled);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r"
database:
  path: /tmp/test.db
registry:
  requests_per_second: 2.0
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert_eq!(config.database.path, "/tmp/test.db");
        assert_eq!(config.database.max_connections, 5);
        assert!((config.registry.requests_per_second - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.registry.burst_size, 5);
    }
}
