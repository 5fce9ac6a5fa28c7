//! Upstream service configuration.

use pbp_sdk::client::{UpstreamClient, UpstreamEndpoints};
use std::time::Duration;

/// Where the fetch, filter and publish services live and how long a single
/// request to any of them may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub endpoints: UpstreamEndpoints,
    pub request_timeout: Duration,
}

impl UpstreamConfig {
    /// Build the HTTP client shared by every poller.
    pub fn build_client(&self) -> Result<UpstreamClient, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(concat!("pbp-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(UpstreamClient::new(self.endpoints.clone()).with_http_client(http))
    }
}
