//! Harness Configuration
//!
//! Resolves the session configuration from three layers, in precedence
//! order: built-in defaults, an optional `harness.toml` file, CLI flags.
//! The resolved `ServerTarget` is created once at session start and is
//! read-only thereafter.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default relative path to the server binary
pub const DEFAULT_SERVER_PATH: &str = "./sqlite-mcp-server";

/// Default registry file handed to the server via `--registry`
pub const DEFAULT_REGISTRY_PATH: &str = "registry.db";

/// Default database file handed to the server via `--db`
pub const DEFAULT_DB_PATH: &str = "test_manual.db";

/// Default per-exchange timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Immutable per-session server addressing
#[derive(Debug, Clone)]
pub struct ServerTarget {
    /// Path to the server executable
    pub server_path: PathBuf,

    /// Registry file passed as `--registry`
    pub registry_path: PathBuf,

    /// Default database file passed as `--db`
    pub db_path: PathBuf,
}

/// Errors that can occur when loading or resolving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("timeout_seconds must be greater than zero")]
    ZeroTimeout,
}

/// Contents of an optional `harness.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Server addressing overrides
    #[serde(default)]
    pub server: ServerSection,

    /// Per-exchange timeout override
    pub timeout_seconds: Option<u64>,
}

/// `[server]` section of `harness.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    /// Path to the server executable
    pub path: Option<String>,

    /// Registry file path
    pub registry: Option<String>,

    /// Default database file path
    pub db: Option<String>,
}

impl FileConfig {
    /// Load a config file from a specific path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config file contents
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// CLI-level overrides (highest precedence layer)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<PathBuf>,
    pub registry: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
}

/// Effective harness configuration after layering
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Resolved server addressing
    pub target: ServerTarget,

    /// Per-exchange timeout
    pub timeout: Duration,
}

impl HarnessConfig {
    /// Resolve the effective configuration: defaults ← file ← overrides
    pub fn resolve(file: Option<FileConfig>, overrides: Overrides) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let server_path = overrides
            .server
            .or_else(|| file.server.path.as_deref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SERVER_PATH));

        let registry_path = overrides
            .registry
            .or_else(|| file.server.registry.as_deref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRY_PATH));

        let db_path = overrides
            .db
            .or_else(|| file.server.db.as_deref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let timeout_seconds = overrides
            .timeout_seconds
            .or(file.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        if timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            target: ServerTarget {
                server_path,
                registry_path,
                db_path,
            },
            timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_given() {
        let config = HarnessConfig::resolve(None, Overrides::default()).unwrap();

        assert_eq!(config.target.server_path, PathBuf::from(DEFAULT_SERVER_PATH));
        assert_eq!(
            config.target.registry_path,
            PathBuf::from(DEFAULT_REGISTRY_PATH)
        );
        assert_eq!(config.target.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
    }

    #[test]
    fn test_file_values_override_defaults() {
        let content = r#"
            timeout_seconds = 3

            [server]
            path = "build/mcp-server"
            registry = "state/registry.db"
        "#;

        let file = FileConfig::parse(content).unwrap();
        let config = HarnessConfig::resolve(Some(file), Overrides::default()).unwrap();

        assert_eq!(
            config.target.server_path,
            PathBuf::from("build/mcp-server")
        );
        assert_eq!(
            config.target.registry_path,
            PathBuf::from("state/registry.db")
        );
        // db was not set in the file, so the default survives
        assert_eq!(config.target.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_cli_overrides_beat_file_values() {
        let file = FileConfig::parse("timeout_seconds = 3").unwrap();
        let overrides = Overrides {
            timeout_seconds: Some(30),
            db: Some(PathBuf::from("other.db")),
            ..Overrides::default()
        };

        let config = HarnessConfig::resolve(Some(file), overrides).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.target.db_path, PathBuf::from("other.db"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let overrides = Overrides {
            timeout_seconds: Some(0),
            ..Overrides::default()
        };

        let result = HarnessConfig::resolve(None, overrides);
        assert!(matches!(result, Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_empty_file_parses_ok() {
        let file = FileConfig::parse("").unwrap();
        assert!(file.server.path.is_none());
        assert!(file.timeout_seconds.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let result = FileConfig::parse("timeout_seconds = \"soon\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
