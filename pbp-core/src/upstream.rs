//! The seam between pollers and the collaborating services.

use async_trait::async_trait;
use pbp_sdk::client::{FetchError, FilterError, PublishError, UpstreamClient};
use pbp_sdk::{GameCode, PlayByPlayBundle};

/// Fetch, filter and publish operations a poller drives.
///
/// [`UpstreamClient`] is the network implementation; tests and the
/// foreground watcher wrap or replace it.
#[async_trait]
pub trait PlayByPlayUpstream: Send + Sync {
    async fn fetch(&self, game_code: &GameCode) -> Result<PlayByPlayBundle, FetchError>;

    async fn filter(&self, bundle: &PlayByPlayBundle) -> Result<PlayByPlayBundle, FilterError>;

    async fn publish(&self, bundle: &PlayByPlayBundle) -> Result<(), PublishError>;
}

#[async_trait]
impl PlayByPlayUpstream for UpstreamClient {
    async fn fetch(&self, game_code: &GameCode) -> Result<PlayByPlayBundle, FetchError> {
        self.fetch_play_by_play(game_code).await
    }

    async fn filter(&self, bundle: &PlayByPlayBundle) -> Result<PlayByPlayBundle, FilterError> {
        self.filter_play_by_play(bundle).await
    }

    async fn publish(&self, bundle: &PlayByPlayBundle) -> Result<(), PublishError> {
        UpstreamClient::publish(self, bundle).await
    }
}
