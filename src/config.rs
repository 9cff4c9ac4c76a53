//! Configuration handling for the database MCP server.
//!
//! CLI arguments and environment variables select the transport and point at
//! a JSON config document describing the databases. The document has a
//! top-level `databases` object mapping names to connection entries;
//! registration order follows document order.

use crate::error::{DbError, DbResult};
use crate::models::{DatabaseConfig, DatabaseEntry};
use crate::registry::DatabaseRegistry;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/mcp";

/// Environment variable holding inline JSON configuration. Takes priority
/// over any config file path.
pub const INLINE_CONFIG_ENV: &str = "DATABASE_CONFIG_JSON";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the database MCP server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "database-mcp",
    about = "MCP server for SQL databases - enables AI assistants to query MySQL and PostgreSQL",
    version,
    author
)]
pub struct Config {
    /// Path to the JSON configuration file describing databases
    #[arg(short, long, value_name = "PATH", env = "DATABASE_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            config: None,
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Build the database registry from inline env JSON or the config file.
    ///
    /// Inline JSON in `DATABASE_CONFIG_JSON` wins over the `--config` path.
    /// When neither is present, an empty registry is returned; the server
    /// still runs and `list_databases` reports nothing.
    pub fn load_registry(&self) -> DbResult<DatabaseRegistry> {
        if let Ok(inline) = std::env::var(INLINE_CONFIG_ENV) {
            if !inline.trim().is_empty() {
                info!("Loading database configuration from {}", INLINE_CONFIG_ENV);
                return build_registry(&inline, INLINE_CONFIG_ENV);
            }
        }

        if let Some(ref path) = self.config {
            info!(path = %path.display(), "Loading database configuration file");
            let contents = std::fs::read_to_string(path).map_err(|e| {
                DbError::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            return build_registry(&contents, &path.display().to_string());
        }

        Ok(DatabaseRegistry::new())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Raw shape of the JSON configuration document. `databases` keeps document
/// order (serde_json preserve_order) so registration order is deterministic.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub databases: serde_json::Map<String, serde_json::Value>,
}

/// Parse a JSON config document into a registry. Any invalid entry fails the
/// whole load; configuration problems should surface at startup, not on
/// first use.
pub fn build_registry(contents: &str, source: &str) -> DbResult<DatabaseRegistry> {
    let file: ConfigFile = serde_json::from_str(contents)
        .map_err(|e| DbError::config(format!("Invalid JSON in '{}': {}", source, e)))?;

    let mut registry = DatabaseRegistry::new();
    for (name, value) in file.databases {
        let entry: DatabaseEntry = serde_json::from_value(value).map_err(|e| {
            DbError::config(format!("Invalid config entry for database '{}': {}", name, e))
        })?;
        let config = DatabaseConfig::from_entry(&name, entry)?;
        debug!(database = %name, dialect = %config.dialect, "Registered database");
        registry.register(config);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dialect;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.http_host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert!(config.config.is_none());
    }

    #[test]
    fn test_build_registry_preserves_order() {
        let json = r#"{
            "databases": {
                "zeta": {"type": "mysql", "user": "u", "database": "z"},
                "alpha": {"type": "postgresql", "user": "u", "database": "a"}
            }
        }"#;
        let registry = build_registry(json, "test").unwrap();
        let names: Vec<&str> = registry.list().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_build_registry_applies_defaults() {
        let json = r#"{
            "databases": {
                "main": {"type": "postgres", "user": "svc", "database": "app"}
            }
        }"#;
        let registry = build_registry(json, "test").unwrap();
        let config = registry.resolve("main").unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.password, "");
    }

    #[test]
    fn test_build_registry_rejects_unknown_dialect() {
        let json = r#"{
            "databases": {
                "bad": {"type": "oracle", "user": "u", "database": "d"}
            }
        }"#;
        let err = build_registry(json, "test").unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_build_registry_rejects_malformed_json() {
        let err = build_registry("not json", "test").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_build_registry_empty_document() {
        let registry = build_registry("{}", "test").unwrap();
        assert!(registry.is_empty());
    }
}
