//! Runtime configuration types for the play-by-play relay.
//!
//! These are the validated values the server and the foreground watcher
//! run with. Reading and validating the TOML file is handled by the server
//! crate.

mod poller;
mod server;
mod upstream;

pub use poller::PollerConfig;
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub poller: PollerConfig,
}
