//! Configuration system for the seed server.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. explicit path passed to `seedd`
//!   2. $SEED_CONFIG
//!   3. $XDG_CONFIG_HOME/seed/config.toml
//!   4. ~/.config/seed/config.toml
//!
//! The loaded value is read once at startup and never mutated afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub network: NetworkConfig,
    pub probe: ProbeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the RPC listener binds to.
    pub bind_addr: String,
    /// TCP port for peer RPCs. 0 = OS-assigned.
    pub port: u16,
    /// Port of the local status API. 0 = disabled.
    pub api_port: u16,
    /// Requests larger than this are dropped without a response.
    pub max_request_size: usize,
    /// Upper bound on one request/response exchange.
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Interval between liveness probes. One peer is probed per interval.
    pub polling_interval_ms: u64,
    pub connect_timeout_ms: u64,
    /// How long a probed peer has to answer `poll`.
    pub response_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when RUST_LOG is unset.
    pub level: String,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 5000,
            api_port: 9101,
            max_request_size: 4096,
            request_timeout_ms: 5_000,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 5_000,
            connect_timeout_ms: 2_000,
            response_timeout_ms: 2_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ── Duration accessors ────────────────────────────────────────────────────────

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl ProbeConfig {
    pub fn polling_interval(&self) -> Duration {
        // tokio::time::interval panics on a zero period.
        Duration::from_millis(self.polling_interval_ms.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("seed")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SeedConfig {
    /// Load config from the default location: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            Self::read_file(&path)?
        } else {
            SeedConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("SEED_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&SeedConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply SEED_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
            value.and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = lookup("SEED_NETWORK__BIND_ADDR") {
            self.network.bind_addr = v;
        }
        if let Some(p) = parsed(lookup("SEED_NETWORK__PORT")) {
            self.network.port = p;
        }
        if let Some(p) = parsed(lookup("SEED_NETWORK__API_PORT")) {
            self.network.api_port = p;
        }
        if let Some(n) = parsed(lookup("SEED_NETWORK__MAX_REQUEST_SIZE")) {
            self.network.max_request_size = n;
        }
        if let Some(ms) = parsed(lookup("SEED_NETWORK__REQUEST_TIMEOUT_MS")) {
            self.network.request_timeout_ms = ms;
        }
        if let Some(ms) = parsed(lookup("SEED_PROBE__POLLING_INTERVAL_MS")) {
            self.probe.polling_interval_ms = ms;
        }
        if let Some(ms) = parsed(lookup("SEED_PROBE__CONNECT_TIMEOUT_MS")) {
            self.probe.connect_timeout_ms = ms;
        }
        if let Some(ms) = parsed(lookup("SEED_PROBE__RESPONSE_TIMEOUT_MS")) {
            self.probe.response_timeout_ms = ms;
        }
        // LOGLEVEL is the older spelling; SEED_LOGGING__LEVEL wins when both are set.
        if let Some(v) = lookup("LOGLEVEL") {
            self.logging.level = v.to_lowercase();
        }
        if let Some(v) = lookup("SEED_LOGGING__LEVEL") {
            self.logging.level = v;
        }
    }
}
