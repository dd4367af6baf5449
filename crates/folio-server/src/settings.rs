//! Server settings.
//!
//! Loaded from an optional YAML file (`FOLIO_CONFIG`, default `folio.yml`)
//! with `FOLIO__*` environment variables layered on top, e.g.
//! `FOLIO__SERVER__PORT=9000` or `FOLIO__AGGREGATOR__FETCH=true`.

use std::net::SocketAddr;
use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use folio_git::AggregatorConfig;
use serde::Deserialize;

/// Environment variable naming the settings file.
pub const CONFIG_PATH_VAR: &str = "FOLIO_CONFIG";

/// Settings file used when `FOLIO_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "folio.yml";

/// Listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8888
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Socket address to bind.
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Everything the server binary needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

impl Settings {
    /// Loads settings from the file named by `FOLIO_CONFIG` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(Path::new(&path))
    }

    /// Loads settings from `path` (which may be missing) and the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix("FOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::from_file(Path::new("/nonexistent/folio.yml")).unwrap();
        assert_eq!(settings.server.port, 8888);
        assert!(settings.aggregator.sources().is_empty());
        assert_eq!(settings.aggregator.branches(), &["v*", "main", "master"]);
    }

    #[test]
    fn test_file_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("folio.yml");
        std::fs::write(
            &path,
            r#"
server:
  port: 9100
aggregator:
  fetch: true
  sources:
    - url: https://github.com/acme/server-docs.git
      branches: [main]
      start_paths: [docs]
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert!(settings.aggregator.fetch());
        assert_eq!(settings.aggregator.sources().len(), 1);
        assert!(settings.aggregator.validate().is_ok());
    }

    #[test]
    fn test_addr() {
        let server = ServerSettings {
            host: "127.0.0.1".into(),
            port: 8080,
        };
        assert_eq!(server.addr().unwrap().port(), 8080);
    }
}
