//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `WAYPOINT_*` environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Startup dataset configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Zip archive with users, locations and visits
    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,

    /// File whose first line is the reference time
    #[serde(default = "default_options_path")]
    pub options_path: PathBuf,

    /// Fixed reference time (Unix seconds); wins over the options file
    #[serde(default)]
    pub reference_time: Option<i64>,
}

fn default_archive_path() -> PathBuf {
    PathBuf::from("/tmp/data/data.zip")
}

fn default_options_path() -> PathBuf {
    PathBuf::from("/tmp/data/options.txt")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            archive_path: default_archive_path(),
            options_path: default_options_path(),
            reference_time: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
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
            dirs::config_dir().map(|p| p.join("waypoint").join("config.toml")),
            Some(PathBuf::from("/etc/waypoint/config.toml")),
            Some(PathBuf::from("./config.toml")),
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

    /// Apply `WAYPOINT_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(host) = lookup("WAYPOINT_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("WAYPOINT_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring invalid WAYPOINT_API_PORT: {}", port),
            }
        }

        // Data overrides
        if let Some(path) = lookup("WAYPOINT_ARCHIVE_PATH") {
            self.data.archive_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("WAYPOINT_OPTIONS_PATH") {
            self.data.options_path = PathBuf::from(path);
        }
        if let Some(time) = lookup("WAYPOINT_REFERENCE_TIME") {
            match time.parse() {
                Ok(t) => self.data.reference_time = Some(t),
                Err(_) => tracing::warn!("Ignoring invalid WAYPOINT_REFERENCE_TIME: {}", time),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("WAYPOINT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("WAYPOINT_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(f) => self.logging.format = f,
                None => tracing::warn!("Ignoring invalid WAYPOINT_LOG_FORMAT: {}", format),
            }
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            key: "config",
            value: e.to_string(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Waypoint Configuration
#
# Environment variables override these settings:
# - WAYPOINT_API_HOST
# - WAYPOINT_API_PORT
# - WAYPOINT_ARCHIVE_PATH
# - WAYPOINT_OPTIONS_PATH
# - WAYPOINT_REFERENCE_TIME
# - WAYPOINT_LOG_LEVEL
# - WAYPOINT_LOG_FORMAT

[api]
host = "0.0.0.0"
port = 80

[data]
# Zip archive loaded at startup
archive_path = "/tmp/data/data.zip"

# First line holds the reference time used for age filters
options_path = "/tmp/data/options.txt"

# Uncomment to pin the reference time (Unix seconds)
# reference_time = 1503695452

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty or json
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.port, 80);
        assert_eq!(config.data.archive_path, PathBuf::from("/tmp/data/data.zip"));
        assert_eq!(config.data.reference_time, None);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.port, 80);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [api]
            port = 9000

            [data]
            reference_time = 1500000000

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.data.reference_time, Some(1_500_000_000));
        assert_eq!(config.data.options_path, PathBuf::from("/tmp/data/options.txt"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::parse("[api]\nport = \"eighty\""),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = 8088\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.port, 8088);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("WAYPOINT_API_PORT", "8181"),
            ("WAYPOINT_ARCHIVE_PATH", "/srv/data.zip"),
            ("WAYPOINT_REFERENCE_TIME", "1503695452"),
            ("WAYPOINT_LOG_FORMAT", "JSON"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 8181);
        assert_eq!(config.data.archive_path, PathBuf::from("/srv/data.zip"));
        assert_eq!(config.data.reference_time, Some(1_503_695_452));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "WAYPOINT_API_PORT" => Some("not-a-port".to_string()),
            "WAYPOINT_LOG_FORMAT" => Some("xml".to_string()),
            _ => None,
        });

        assert_eq!(config.api.port, 80);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_api_addr() {
        let api = ApiConfig {
            host: "localhost".to_string(),
            port: 8080,
        };
        assert_eq!(api.addr(), "localhost:8080");
    }

    #[test]
    fn test_round_trip_toml() {
        let text = Config::default().to_toml().unwrap();
        let config = Config::parse(&text).unwrap();
        assert_eq!(config.api.port, 80);
    }
}
