//! Configuration module for pbp-server.
//!
//! Handles loading configuration from the TOML file and applying
//! command-line overrides on top of it.

pub mod file;

use crate::config::file::FileConfig;
use pbp_core::config::{PollerConfig, RelayConfig, ServerConfig, UpstreamConfig};
use pbp_sdk::client::UpstreamEndpoints;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Config file used when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "./pbp-relay.toml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub listen: Option<SocketAddr>,
    pub poll_interval_secs: Option<u64>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    /// Whether the path was given explicitly. Only the implicit default
    /// path may be missing.
    explicit_path: bool,
    overrides: Overrides,
}

impl ConfigLoader {
    pub fn new(config_path: Option<&Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            explicit_path: config_path.is_some(),
            overrides,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (or fall back to defaults)
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the runtime configuration
    pub fn load(&self) -> Result<RelayConfig, ConfigError> {
        let mut file_config = self.read_file()?;

        if let Some(listen) = self.overrides.listen {
            file_config.server.listen = listen;
        }
        if let Some(interval) = self.overrides.poll_interval_secs {
            file_config.poller.interval_secs = interval;
        }

        validate(&file_config)?;
        Ok(build_relay_config(file_config))
    }

    fn read_file(&self) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(&self.config_path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !self.explicit_path => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    "Config file not found, using built-in defaults"
                );
                Ok(FileConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let upstream = &config.upstream;
    for (name, url) in [
        ("fetch_base_url", &upstream.fetch_base_url),
        ("filter_base_url", &upstream.filter_base_url),
        ("publish_base_url", &upstream.publish_base_url),
    ] {
        validate_base_url(name, url)?;
    }
    if upstream.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "upstream.request_timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.poller.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "poller.interval_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_base_url(name: &str, url: &Url) -> Result<(), ConfigError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "upstream.{name} must be an http or https url, got {url}"
        )));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::ValidationError(format!(
            "upstream.{name} cannot carry a path: {url}"
        )));
    }
    Ok(())
}

fn build_relay_config(file_config: FileConfig) -> RelayConfig {
    let FileConfig {
        server,
        upstream,
        poller,
    } = file_config;

    RelayConfig {
        server: ServerConfig {
            listen: server.listen,
        },
        upstream: UpstreamConfig {
            endpoints: UpstreamEndpoints {
                fetch_base_url: upstream.fetch_base_url,
                filter_base_url: upstream.filter_base_url,
                publish_base_url: upstream.publish_base_url,
            },
            request_timeout: Duration::from_secs(upstream.request_timeout_secs),
        },
        poller: PollerConfig {
            interval: Duration::from_secs(poller.interval_secs),
        },
    }
}
