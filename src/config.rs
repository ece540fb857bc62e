//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::charts::MapOptions;
use crate::data::DEFAULT_BASE_URL;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub geo: GeoConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Indicator source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Read the CSVs from this directory instead of `base_url`
    pub local_dir: Option<PathBuf>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            local_dir: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl DataConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Country boundary configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoConfig {
    /// GeoJSON file to use instead of the bundled table
    pub path: Option<PathBuf>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Verbose logging of requests and data loading
    #[serde(default)]
    pub debug: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Dashboard appearance
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_initial_country")]
    pub initial_country: String,

    #[serde(default = "default_map_size")]
    pub map_width: u32,

    #[serde(default = "default_map_size")]
    pub map_height: u32,

    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_initial_country() -> String {
    "Italy".to_string()
}

fn default_map_size() -> u32 {
    1000
}

fn default_scope() -> String {
    "europe".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            initial_country: default_initial_country(),
            map_width: default_map_size(),
            map_height: default_map_size(),
            scope: default_scope(),
        }
    }
}

impl DashboardConfig {
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            width: self.map_width,
            height: self.map_height,
            scope: self.scope.clone(),
            ..Default::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
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
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("covidash").join("config.toml")),
            Some(PathBuf::from("./covidash.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Data overrides
        if let Some(url) = var("COVIDASH_BASE_URL") {
            self.data.base_url = url;
        }
        if let Some(dir) = var("COVIDASH_DATA_DIR") {
            self.data.local_dir = Some(PathBuf::from(dir));
        }

        // Server overrides
        if let Some(host) = var("COVIDASH_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("COVIDASH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = var("COVIDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("COVIDASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Covidash Configuration
#
# Environment variables override these settings:
# - COVIDASH_BASE_URL
# - COVIDASH_DATA_DIR
# - COVIDASH_HOST
# - COVIDASH_PORT
# - COVIDASH_LOG_LEVEL
# - COVIDASH_LOG_FORMAT

[data]
# Directory URL of the CSSE global time series
base_url = "{base_url}"

# Read the CSVs from a local checkout instead
# local_dir = "./COVID-19/csse_covid_19_data/csse_covid_19_time_series"

# HTTP timeout per table (seconds)
request_timeout_secs = 60

[geo]
# GeoJSON FeatureCollection with `name` and `iso_a3` properties.
# Defaults to the bundled Natural Earth 1:110m table.
# path = "./ne_110m_admin_0_countries.geojson"

[server]
host = "127.0.0.1"
port = 8050

# Log every request and the data pipeline at debug level
debug = false

[dashboard]
# Country shown before the first hover
initial_country = "Italy"

# Choropleth size in pixels
map_width = 1000
map_height = 1000

# Plotly geo scope
scope = "europe"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#,
        base_url = DEFAULT_BASE_URL
    )
}
