use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Pre-compiled regex for hostname validation (compiled once at first use)
static HOSTNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][-a-zA-Z0-9\.]*[a-zA-Z0-9]$").unwrap());

#[derive(Debug, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub logging: Option<LoggingSection>,
    #[serde(default)]
    pub store: Option<StoreSection>,
    #[serde(default)]
    pub static_files: Option<StaticFilesSection>,
    #[serde(default)]
    pub shutdown: Option<ShutdownSection>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub json: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StaticFilesSection {
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShutdownSection {
    #[serde(default)]
    pub grace_period_ms: Option<u64>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a RawConfigFile from a path. The format is inferred from the extension: .toml, .yaml/.yml, .json
pub fn load_raw_from_file<P: AsRef<Path>>(path: P) -> Result<RawConfigFile, ConfigError> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    parse_config_str(&s, ext.as_deref())
}

#[inline]
fn parse_config_str(s: &str, ext: Option<&str>) -> Result<RawConfigFile, ConfigError> {
    match ext {
        #[cfg(feature = "toml")]
        Some("toml") => toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => {
            serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        #[cfg(feature = "json")]
        Some("json") => serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => parse_config_auto(s),
    }
}

/// Try each enabled format in turn
#[inline]
fn parse_config_auto(s: &str) -> Result<RawConfigFile, ConfigError> {
    #[cfg(feature = "json")]
    if let Ok(cfg) = serde_json::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "toml")]
    if let Ok(cfg) = toml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "yaml")]
    if let Ok(cfg) = serde_yaml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(any(feature = "yaml", feature = "toml", feature = "json"))]
    {
        Err(ConfigError::Parse(
            "failed to parse config as any supported format".into(),
        ))
    }

    #[cfg(not(any(feature = "yaml", feature = "toml", feature = "json")))]
    {
        let _ = s;
        Err(ConfigError::Parse("no config format enabled".into()))
    }
}

/// Concrete application configuration with defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub static_files: StaticFilesConfig,
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

/// Location of the leaderboard document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticFilesConfig {
    pub directory: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShutdownConfig {
    /// How long the task queue may take to drain before the process gives up.
    pub grace_period_ms: u64,
}

impl ShutdownConfig {
    #[inline]
    pub fn grace_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.grace_period_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            store: StoreConfig {
                path: "leaderboard.json".to_string(),
            },
            static_files: StaticFilesConfig {
                directory: "public".to_string(),
            },
            shutdown: ShutdownConfig {
                grace_period_ms: 3000,
            },
        }
    }
}

#[inline]
fn parse_bool(s: &str) -> Result<bool, ()> {
    let bytes = s.as_bytes();
    match bytes {
        b"1" | b"true" | b"TRUE" | b"True" | b"yes" | b"YES" | b"Yes" | b"y" | b"Y" => Ok(true),
        b"0" | b"false" | b"FALSE" | b"False" | b"no" | b"NO" | b"No" | b"n" | b"N" => Ok(false),
        _ => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Ok(true),
            "false" | "no" | "n" => Ok(false),
            _ => Err(()),
        },
    }
}

/// Helper macro to apply optional value if present
macro_rules! apply_opt {
    ($target:expr, $source:expr) => {
        if let Some(v) = $source {
            $target = v;
        }
    };
}

/// Load concrete `Config` from optional file and environment variables.
/// Environment variables take precedence over file values and defaults.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = path {
        let raw = load_raw_from_file(p)?;
        merge_raw(&mut cfg, raw);
    }

    apply_env_overrides(&mut cfg)?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn merge_raw(cfg: &mut Config, raw: RawConfigFile) {
    if let Some(server) = raw.server {
        apply_opt!(cfg.server.host, server.host);
        apply_opt!(cfg.server.port, server.port);
    }
    if let Some(logging) = raw.logging {
        apply_opt!(cfg.logging.level, logging.level);
        apply_opt!(cfg.logging.json, logging.json);
    }
    if let Some(store) = raw.store {
        apply_opt!(cfg.store.path, store.path);
    }
    if let Some(static_files) = raw.static_files {
        apply_opt!(cfg.static_files.directory, static_files.directory);
    }
    if let Some(shutdown) = raw.shutdown {
        apply_opt!(cfg.shutdown.grace_period_ms, shutdown.grace_period_ms);
    }
}

#[inline]
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("invalid {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

#[inline]
fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(v) => parse_bool(&v)
            .map(Some)
            .map_err(|_| ConfigError::Parse(format!("invalid {}", key))),
        Err(_) => Ok(None),
    }
}

#[inline]
fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Apply all environment variable overrides to config
fn apply_env_overrides(cfg: &mut Config) -> Result<(), ConfigError> {
    // Server
    if let Some(v) = env_str("SCOREBOARD_SERVER_HOST") {
        cfg.server.host = v;
    }
    // Plain PORT is what most hosting platforms inject; the prefixed key wins.
    if let Some(v) = env_parse::<u16>("PORT")? {
        cfg.server.port = v;
    }
    if let Some(v) = env_parse::<u16>("SCOREBOARD_SERVER_PORT")? {
        cfg.server.port = v;
    }

    // Logging
    if let Some(v) = env_str("SCOREBOARD_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = env_bool("SCOREBOARD_LOG_JSON")? {
        cfg.logging.json = v;
    }

    // Store
    if let Some(v) = env_str("SCOREBOARD_STORE_PATH") {
        cfg.store.path = v;
    }

    // Static files
    if let Some(v) = env_str("SCOREBOARD_STATIC_DIR") {
        cfg.static_files.directory = v;
    }

    // Shutdown
    if let Some(v) = env_parse::<u64>("SCOREBOARD_SHUTDOWN_GRACE_MS")? {
        cfg.shutdown.grace_period_ms = v;
    }

    Ok(())
}

/// Validate higher-level constraints on the resolved configuration.
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.port == 0 {
        return Err(ConfigError::Validation("server.port must be > 0".into()));
    }
    let host_ok = cfg.server.host.parse::<std::net::IpAddr>().is_ok()
        || HOSTNAME_REGEX.is_match(&cfg.server.host);
    if !host_ok {
        return Err(ConfigError::Validation(format!(
            "invalid server.host: {}",
            cfg.server.host
        )));
    }
    if cfg.store.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store.path must not be empty".into(),
        ));
    }
    if cfg.shutdown.grace_period_ms == 0 {
        return Err(ConfigError::Validation(
            "shutdown.grace_period_ms must be > 0".into(),
        ));
    }
    Ok(())
}
