//! TOML file configuration structures.
//!
//! These structs directly map to the `pbp-relay.toml` file format. Every
//! field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub poller: PollerConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8084").
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8084)),
        }
    }
}

/// Base URLs of the fetch, filter and publish services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub fetch_base_url: Url,
    pub filter_base_url: Url,
    pub publish_base_url: Url,
    /// Upper bound for a single request to any upstream service.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            fetch_base_url: local_url(8081),
            filter_base_url: local_url(8082),
            publish_base_url: local_url(8083),
            request_timeout_secs: 30,
        }
    }
}

fn local_url(port: u16) -> Url {
    Url::parse(&format!("http://localhost:{port}")).expect("valid default url")
}

/// Poller cadence section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds between the end of one cycle and the start of the next.
    pub interval_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}
