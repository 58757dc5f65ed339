//! Configuration types for Minnow server

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MinnowConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Static file serving configuration
    #[serde(default)]
    pub static_files: StaticFileConfig,
}

/// Server listening configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable access logging
    #[serde(default = "default_true")]
    pub access_log: bool,

    /// Cap on concurrently handled connections (unset = one task per connection, unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            access_log: true,
            max_connections: None,
        }
    }
}

/// Static file serving configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaticFileConfig {
    /// Root directory for static files
    #[serde(default = "default_static_root")]
    pub root: String,

    /// Reject request paths containing `..` components.
    ///
    /// Off by default: asset paths are joined under the root as-is.
    #[serde(default)]
    pub contain_paths: bool,
}

impl Default for StaticFileConfig {
    fn default() -> Self {
        Self {
            root: default_static_root(),
            contain_paths: false,
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

fn default_true() -> bool {
    true
}

fn default_static_root() -> String {
    "static".to_string()
}

impl MinnowConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Check the settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be a positive integer".to_string(),
            ));
        }

        if self.server.max_connections == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_connections must be greater than 0 when set".to_string(),
            ));
        }

        if self.static_files.root.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Static root cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Listening address in `host:port` form
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MinnowConfig::default();
        assert_eq!(config.server.port, 80);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert!(config.server.access_log);
        assert_eq!(config.server.max_connections, None);
        assert_eq!(config.static_files.root, "static");
        assert!(!config.static_files.contain_paths);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
bind_address = "127.0.0.1"
port = 3000
access_log = false
max_connections = 64

[static_files]
root = "/var/www/assets"
contain_paths = true
"#;

        let config = MinnowConfig::from_toml(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert!(!config.server.access_log);
        assert_eq!(config.server.max_connections, Some(64));
        assert_eq!(config.static_files.root, "/var/www/assets");
        assert!(config.static_files.contain_paths);
        assert_eq!(config.listen_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = MinnowConfig::from_toml("[server]\nport = 8081\n").unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.static_files, StaticFileConfig::default());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = MinnowConfig::default();
        config.server.max_connections = Some(8);
        let text = config.to_toml().unwrap();
        assert_eq!(MinnowConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = MinnowConfig::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = MinnowConfig::default();
        config.server.max_connections = Some(0);
        assert!(config.validate().is_err());

        let mut config = MinnowConfig::default();
        config.static_files.root = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = MinnowConfig::from_toml("[server\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
