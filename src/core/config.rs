/// Server Configuration
///
/// All settings come from environment variables with defaults, read once at
/// startup. Parsing goes through a lookup function so tests can supply their
/// own variables without touching the process environment.
///
/// Environment Variables:
/// - SERVER_NAME: Name of the server (default: "mcp-example-tools")
/// - SERVER_VERSION: Version string (default: crate version)
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "both")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, max 16)
/// - MCP_COERCE_ARGUMENTS: coerce numeric/boolean strings (default: true)
/// - MCP_AUDIT_LOG: log every tool invocation (default: true)
/// - LOG_FORMAT: "text" or "json" (default: "text")

use std::collections::HashMap;
use std::str::FromStr;

use crate::core::context::ToolContext;
use crate::core::descriptor::ValidationOptions;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid transport mode '{0}': must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),
    #[error("invalid log format '{0}': must be 'text' or 'json'")]
    InvalidLogFormat(String),
    #[error("invalid boolean '{value}' for {key}")]
    InvalidFlag { key: &'static str, value: String },
}

/// Transport(s) the server listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Http,
    Both,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "both" => Ok(TransportMode::Both),
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

/// Startup configuration for the server and its tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server name as reported in MCP initialize responses
    pub name: String,
    /// Server version string as reported in MCP initialize responses
    pub version: String,
    /// Which transports to serve
    pub transport: TransportMode,
    /// Bind address for HTTP mode (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// Port number for HTTP mode
    pub port: u16,
    /// HTTP worker thread count
    pub workers: usize,
    /// Coerce numeric and boolean strings during argument validation
    pub coerce_arguments: bool,
    /// Emit an audit event for every tool invocation
    pub audit_log: bool,
    /// Log output format on stderr
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Returns
    /// The parsed configuration, or a `ConfigError` naming the first
    /// variable with an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let transport = get("MCP_TRANSPORT_MODE")
            .unwrap_or_else(|| "both".to_string())
            .parse::<TransportMode>()?;
        let log_format = get("LOG_FORMAT")
            .unwrap_or_else(|| "text".to_string())
            .parse::<LogFormat>()?;

        // Unparsable ports and worker counts fall back to their defaults
        let port = get("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);
        let workers = get("WORKER_THREADS")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(|| num_cpus::get().clamp(1, 16));

        Ok(Self {
            name: get("SERVER_NAME").unwrap_or_else(|| "mcp-example-tools".to_string()),
            version: get("SERVER_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            transport,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            workers,
            coerce_arguments: flag(&get, "MCP_COERCE_ARGUMENTS", true)?,
            audit_log: flag(&get, "MCP_AUDIT_LOG", true)?,
            log_format,
        })
    }

    /// `host:port` string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Shared context handed to every tool handler.
    pub fn tool_context(&self) -> ToolContext {
        ToolContext::new(
            ValidationOptions {
                coerce_scalars: self.coerce_arguments,
            },
            self.audit_log,
        )
    }
}

fn flag(get: &impl Fn(&str) -> Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { key, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.name, "mcp-example-tools");
        assert_eq!(config.transport, TransportMode::Both);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!(config.workers >= 1 && config.workers <= 16);
        assert!(config.coerce_arguments);
        assert!(config.audit_log);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_vars(&vars(&[
            ("SERVER_NAME", "tools"),
            ("MCP_TRANSPORT_MODE", "stdio"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("WORKER_THREADS", "3"),
            ("MCP_COERCE_ARGUMENTS", "off"),
            ("MCP_AUDIT_LOG", "FALSE"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.name, "tools");
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.workers, 3);
        assert!(!config.coerce_arguments);
        assert!(!config.audit_log);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.tool_context().options.coerce_scalars);
    }

    #[test]
    fn bad_port_falls_back() {
        let config = ServerConfig::from_vars(&vars(&[("PORT", "eighty")])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn rejects_unknown_modes() {
        assert_eq!(
            ServerConfig::from_vars(&vars(&[("MCP_TRANSPORT_MODE", "grpc")])).unwrap_err(),
            ConfigError::InvalidTransport("grpc".to_string())
        );
        assert!(matches!(
            ServerConfig::from_vars(&vars(&[("MCP_AUDIT_LOG", "maybe")])),
            Err(ConfigError::InvalidFlag { key: "MCP_AUDIT_LOG", .. })
        ));
        assert!(ServerConfig::from_vars(&vars(&[("LOG_FORMAT", "xml")])).is_err());
    }
}
