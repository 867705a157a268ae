//! Configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never stops startup; the caller gets a
//! warning to log and the remaining tiers still apply.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_SOURCE: &str = "./public";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_BASE_PATH: &str = "VASI_BASE_PATH";
/// Honoured when `VASI_BASE_PATH` is unset, for deployments that already export it
pub const ENV_PUBLIC_URL: &str = "PUBLIC_URL";
pub const ENV_SOURCE: &str = "VASI_SOURCE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "VASI_REQUEST_TIMEOUT_SECS";
pub const ENV_PORT: &str = "VASI_PORT";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub base_path: Option<String>,
    pub source: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Result of looking for a TOML file
#[derive(Debug, Clone, Default)]
pub struct LoadedToml {
    pub config: TomlConfig,
    /// File the config came from, if one was read
    pub path: Option<PathBuf>,
    /// Why the file was ignored, if it was
    pub warning: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_path: Option<String>,
    pub source: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub port: Option<u16>,
    pub config_file: Option<PathBuf>,
}

/// Where resources are fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    /// HTTP(S) origin, e.g. `https://sizing.example.com`
    Http(String),
    /// Local folder laid out like the web root
    Directory(PathBuf),
}

impl ResourceSource {
    /// `http://` / `https://` means an origin, anything else a folder
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidInput("resource source is empty".to_string()));
        }
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(ResourceSource::Http(raw.to_string()))
        } else {
            Ok(ResourceSource::Directory(PathBuf::from(raw)))
        }
    }
}

/// Fully resolved viewer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub base_path: String,
    pub source: ResourceSource,
    pub request_timeout: Duration,
    pub port: u16,
    pub log_level: String,
}

impl ViewerConfig {
    /// Resolve against the process environment
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Result<Self> {
        Self::resolve_with(cli, toml, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve_with(
        cli: &CliOverrides,
        toml: &TomlConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let base_path = cli
            .base_path
            .clone()
            .or_else(|| env(ENV_BASE_PATH))
            .or_else(|| env(ENV_PUBLIC_URL))
            .or_else(|| toml.base_path.clone())
            .unwrap_or_default();

        let source = cli
            .source
            .clone()
            .or_else(|| env(ENV_SOURCE))
            .or_else(|| toml.source.clone())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

        let timeout_secs = match cli.request_timeout_secs {
            Some(secs) => secs,
            None => match env(ENV_REQUEST_TIMEOUT_SECS) {
                Some(raw) => parse_env(ENV_REQUEST_TIMEOUT_SECS, &raw)?,
                None => toml
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            },
        };
        if timeout_secs == 0 {
            return Err(Error::Config("request timeout must be at least 1 second".to_string()));
        }

        let port = match cli.port {
            Some(port) => port,
            None => match env(ENV_PORT) {
                Some(raw) => parse_env(ENV_PORT, &raw)?,
                None => toml.port.unwrap_or(DEFAULT_PORT),
            },
        };

        Ok(Self {
            base_path: normalize_base_path(&base_path),
            source: ResourceSource::parse(&source)?,
            request_timeout: Duration::from_secs(timeout_secs),
            port,
            log_level: toml.logging.level.clone(),
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has invalid value '{}'", key, raw)))
}

/// Canonical base path: no trailing slash, leading slash when non-empty
///
/// Absolute URLs (`https://cdn.example.com/sizing/`) only lose the trailing
/// slash.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.contains("://") || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Default config file location: `<config_dir>/vasi/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vasi").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Write a TOML config file (creates parent directories)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load the TOML tier without ever failing
///
/// An explicit path that cannot be read yields a warning. The default
/// location is optional, so its absence is silent.
pub fn load_toml_config(explicit: Option<&Path>) -> LoadedToml {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return LoadedToml::default(),
        },
    };

    if !required && !path.exists() {
        return LoadedToml::default();
    }

    match read_toml_config(&path) {
        Ok(config) => LoadedToml {
            config,
            path: Some(path),
            warning: None,
        },
        Err(e) => LoadedToml {
            config: TomlConfig::default(),
            path: None,
            warning: Some(format!(
                "Ignoring config file {} ({}); using defaults",
                path.display(),
                e
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("sizing"), "/sizing");
        assert_eq!(normalize_base_path("/sizing/"), "/sizing");
        assert_eq!(normalize_base_path(" /a/b// "), "/a/b");
        assert_eq!(
            normalize_base_path("https://cdn.example.com/sizing/"),
            "https://cdn.example.com/sizing"
        );
    }

    #[test]
    fn test_resource_source_parse() {
        assert_eq!(
            ResourceSource::parse("https://example.com").unwrap(),
            ResourceSource::Http("https://example.com".to_string())
        );
        assert_eq!(
            ResourceSource::parse("./public").unwrap(),
            ResourceSource::Directory(PathBuf::from("./public"))
        );
        assert!(matches!(ResourceSource::parse("  "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config =
            ViewerConfig::resolve_with(&CliOverrides::default(), &TomlConfig::default(), env_of(&[]))
                .unwrap();

        assert_eq!(config.base_path, "");
        assert_eq!(config.source, ResourceSource::Directory(PathBuf::from(DEFAULT_SOURCE)));
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_priority_cli_over_env_over_toml() {
        let toml = TomlConfig {
            base_path: Some("/from-toml".to_string()),
            port: Some(7000),
            ..Default::default()
        };
        let env = env_of(&[(ENV_BASE_PATH, "/from-env"), (ENV_PORT, "7100")]);

        let from_env = ViewerConfig::resolve_with(&CliOverrides::default(), &toml, &env).unwrap();
        assert_eq!(from_env.base_path, "/from-env");
        assert_eq!(from_env.port, 7100);

        let cli = CliOverrides {
            base_path: Some("from-cli".to_string()),
            port: Some(7200),
            ..Default::default()
        };
        let from_cli = ViewerConfig::resolve_with(&cli, &toml, &env).unwrap();
        assert_eq!(from_cli.base_path, "/from-cli");
        assert_eq!(from_cli.port, 7200);

        let from_toml = ViewerConfig::resolve_with(&CliOverrides::default(), &toml, env_of(&[])).unwrap();
        assert_eq!(from_toml.base_path, "/from-toml");
        assert_eq!(from_toml.port, 7000);
    }

    #[test]
    fn test_public_url_is_fallback_for_base_path() {
        let env = env_of(&[(ENV_PUBLIC_URL, "/legacy/")]);
        let config = ViewerConfig::resolve_with(&CliOverrides::default(), &TomlConfig::default(), &env).unwrap();
        assert_eq!(config.base_path, "/legacy");

        let both = env_of(&[(ENV_PUBLIC_URL, "/legacy"), (ENV_BASE_PATH, "/preferred")]);
        let config = ViewerConfig::resolve_with(&CliOverrides::default(), &TomlConfig::default(), &both).unwrap();
        assert_eq!(config.base_path, "/preferred");
    }

    #[test]
    fn test_invalid_env_numbers_are_rejected() {
        let env = env_of(&[(ENV_PORT, "not-a-port")]);
        let result = ViewerConfig::resolve_with(&CliOverrides::default(), &TomlConfig::default(), &env);
        assert!(matches!(result, Err(Error::Config(_))));

        let zero = env_of(&[(ENV_REQUEST_TIMEOUT_SECS, "0")]);
        let result = ViewerConfig::resolve_with(&CliOverrides::default(), &TomlConfig::default(), &zero);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
