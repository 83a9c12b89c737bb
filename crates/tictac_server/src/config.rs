//! Server configuration: defaults, TOML file, environment.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Listener and static-content settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    host: String,
    /// TCP port; `0` picks a free one.
    port: u16,
    /// Directory served for every path that is not `/health` or `/ws`.
    static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys keep their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(host = %config.host, port = config.port, "Config loaded");
        Ok(config)
    }

    /// Applies `HOST` and `PORT` from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Applies `HOST` and `PORT` from `lookup`.
    #[instrument(skip_all)]
    pub fn apply_vars(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("HOST") {
            debug!(%host, "HOST from environment");
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PORT {:?}: {}", port, e)))?;
            debug!(port = self.port, "PORT from environment");
        }
        Ok(self)
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.static_dir(), &PathBuf::from("public"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080").unwrap();
        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.host(), "0.0.0.0");
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"many\"").unwrap();
        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::default()
            .apply_vars(|key| match key {
                "PORT" => Some("4100".to_string()),
                "HOST" => Some("127.0.0.1".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:4100");
    }

    #[test]
    fn test_invalid_port_env() {
        let result =
            ServerConfig::default().apply_vars(|key| (key == "PORT").then(|| "http".into()));
        assert!(result.is_err());
    }

    #[test]
    fn test_setters_chain() {
        let config = ServerConfig::default().with_port(0).with_host("localhost".into());
        assert_eq!(config.bind_addr(), "localhost:0");
    }
}
