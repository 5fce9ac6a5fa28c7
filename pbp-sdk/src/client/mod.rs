//! HTTP client for the fetch, filter and publish services.
//!
//! Gated behind the `client` cargo feature so crates that only need the
//! wire types do not pull in `reqwest`.

mod upstream;

pub use upstream::{UpstreamClient, UpstreamEndpoints};

use reqwest::StatusCode;

use crate::decode::DecodeError;
use crate::objects::{GameCode, GameSnapshot};

/// Failure of a single upstream request.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Transport-level failure (DNS, connection refused, timeout, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status code.
    #[error("status {status}, body: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body could not be decoded into a bundle.
    #[error("undecodable response: {0}")]
    Decode(#[from] DecodeError),

    /// The configured base URL cannot carry a path.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(url::Url),
}

impl UpstreamError {
    /// Whether the request never produced a readable answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, UpstreamError::Http(_) | UpstreamError::Status { .. })
    }
}

/// Retrieving the play-by-play bundle for a game failed.
#[derive(Debug, thiserror::Error)]
#[error("fetch failed for game {game_code}: {cause}")]
pub struct FetchError {
    pub game_code: GameCode,
    #[source]
    pub cause: UpstreamError,
}

/// Filtering a bundle failed.
///
/// On transport failure `snapshot` holds the snapshot that was submitted, so
/// the caller can still tell whether the game had ended.
#[derive(Debug, thiserror::Error)]
#[error("filter failed for matchup {matchup}: {cause}")]
pub struct FilterError {
    pub matchup: String,
    pub snapshot: Option<GameSnapshot>,
    #[source]
    pub cause: UpstreamError,
}

/// Publishing a bundle failed.
///
/// Only raised when the request could not be delivered; a publisher that
/// answers with an error status is logged, not reported.
#[derive(Debug, thiserror::Error)]
#[error("publish failed: {cause}")]
pub struct PublishError {
    #[source]
    pub cause: UpstreamError,
}
