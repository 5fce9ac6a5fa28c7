//! Fetch / filter / publish client.
//!
//! None of the calls retry; the caller decides what a failure means.
//!
//! Response handling per stage:
//! - fetch: non-2xx fails, an empty body fails
//! - filter: non-2xx fails, an empty body means nothing was kept
//! - publish: only transport errors fail; the status is logged

use reqwest::Client;
use url::Url;

use super::{FetchError, FilterError, PublishError, UpstreamError};
use crate::decode::{decode_last, decode_last_or_default};
use crate::objects::{GameCode, PlayByPlayBundle};

/// Base URLs of the three collaborating services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEndpoints {
    pub fetch_base_url: Url,
    pub filter_base_url: Url,
    pub publish_base_url: Url,
}

/// Typed HTTP client for the play-by-play services.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    endpoints: UpstreamEndpoints,
}

impl UpstreamClient {
    pub fn new(endpoints: UpstreamEndpoints) -> Self {
        Self {
            http: Client::new(),
            endpoints,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn endpoints(&self) -> &UpstreamEndpoints {
        &self.endpoints
    }

    /// `GET {fetch}/pbp/{code}` – the current bundle for a game.
    pub async fn fetch_play_by_play(
        &self,
        game_code: &GameCode,
    ) -> Result<PlayByPlayBundle, FetchError> {
        self.try_fetch(game_code).await.map_err(|cause| FetchError {
            game_code: game_code.clone(),
            cause,
        })
    }

    /// `POST {filter}/filter/{matchup}` – reduce a bundle to noteworthy plays.
    pub async fn filter_play_by_play(
        &self,
        bundle: &PlayByPlayBundle,
    ) -> Result<PlayByPlayBundle, FilterError> {
        let matchup = bundle.game.matchup_code();
        self.try_filter(&matchup, bundle)
            .await
            .map_err(|cause| FilterError {
                snapshot: cause.is_transport().then(|| bundle.game.clone()),
                matchup,
                cause,
            })
    }

    /// `POST {publish}/tweet` – hand a filtered bundle to the publisher.
    pub async fn publish(&self, bundle: &PlayByPlayBundle) -> Result<(), PublishError> {
        self.try_publish(bundle)
            .await
            .map_err(|cause| PublishError { cause })
    }

    async fn try_fetch(&self, game_code: &GameCode) -> Result<PlayByPlayBundle, UpstreamError> {
        let url = endpoint(&self.endpoints.fetch_base_url, &["pbp", game_code.as_str()])?;
        let resp = self.http.get(url).send().await?;
        let bytes = check_status(resp).await?.bytes().await?;
        // An empty bundle would read as a finished game.
        Ok(decode_last(&bytes)?)
    }

    async fn try_filter(
        &self,
        matchup: &str,
        bundle: &PlayByPlayBundle,
    ) -> Result<PlayByPlayBundle, UpstreamError> {
        let url = endpoint(&self.endpoints.filter_base_url, &["filter", matchup])?;
        let resp = self.http.post(url).json(bundle).send().await?;
        let bytes = check_status(resp).await?.bytes().await?;
        Ok(decode_last_or_default(&bytes)?)
    }

    async fn try_publish(&self, bundle: &PlayByPlayBundle) -> Result<(), UpstreamError> {
        let url = endpoint(&self.endpoints.publish_base_url, &["tweet"])?;
        let resp = self.http.post(url).json(bundle).send().await?;
        let status = resp.status();
        if status.is_success() {
            tracing::debug!(%status, plays = bundle.plays.len(), "Bundle published");
        } else {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                game_id = %bundle.game.id,
                %status,
                body = %body,
                "Publisher rejected bundle"
            );
        }
        Ok(())
    }
}

/// Append `segments` to the path of `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| UpstreamError::InvalidBaseUrl(base.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { status, body });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    async fn closed_port() -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn client_for(base: &Url) -> UpstreamClient {
        UpstreamClient::new(UpstreamEndpoints {
            fetch_base_url: base.clone(),
            filter_base_url: base.clone(),
            publish_base_url: base.clone(),
        })
    }

    fn sample_bundle() -> PlayByPlayBundle {
        serde_json::from_str(
            r#"{"gameId": "0012300001", "isGameActivated": true,
                "vTeam": {"teamId": "1", "triCode": "BOS"},
                "hTeam": {"teamId": "2", "triCode": "LAL"},
                "Plays": [{"clock": "1:00"}, {"clock": "0:30", "isScoreChange": true}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://localhost:8081/relay/").unwrap();
        let url = endpoint(&base, &["pbp", "0012300001"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/relay/pbp/0012300001");

        let bare = Url::parse("http://localhost:8081").unwrap();
        let url = endpoint(&bare, &["filter", "BOS/LAL"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/filter/BOS%2FLAL");
    }

    #[test]
    fn test_endpoint_rejects_cannot_be_a_base() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        assert!(matches!(
            endpoint(&base, &["tweet"]),
            Err(UpstreamError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_keeps_last_streamed_value() {
        let router = Router::new().route(
            "/pbp/{code}",
            get(|Path(code): Path<String>| async move {
                format!(
                    "{{\"gameId\": \"{code}\", \"isGameActivated\": true}}\n\
                     {{\"gameId\": \"{code}\", \"isGameActivated\": false, \"Plays\": [{{\"clock\": \"0:00\"}}]}}\n"
                )
            }),
        );
        let base = serve(router).await;

        let bundle = client_for(&base)
            .fetch_play_by_play(&GameCode::new("0012300001"))
            .await
            .unwrap();
        assert_eq!(bundle.game.id, "0012300001");
        assert!(!bundle.is_active());
        assert_eq!(bundle.plays.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_body() {
        let router = Router::new().route("/pbp/{code}", get(|| async { "{\"gameId\": " }));
        let base = serve(router).await;

        let err = client_for(&base)
            .fetch_play_by_play(&GameCode::new("X"))
            .await
            .unwrap_err();
        assert_eq!(err.game_code.as_str(), "X");
        assert!(matches!(err.cause, UpstreamError::Decode(DecodeError::Json(_))));
    }

    #[tokio::test]
    async fn test_fetch_reports_error_status() {
        let router = Router::new().route(
            "/pbp/{code}",
            get(|| async { (StatusCode::NOT_FOUND, "no such game") }),
        );
        let base = serve(router).await;

        let err = client_for(&base)
            .fetch_play_by_play(&GameCode::new("X"))
            .await
            .unwrap_err();
        match err.cause {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "no such game");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_filter_posts_to_matchup_path() {
        let seen: Arc<Mutex<Vec<(String, usize)>>> = Arc::default();
        let recorder = seen.clone();
        let router = Router::new().route(
            "/filter/{matchup}",
            post(
                move |Path(matchup): Path<String>, Json(bundle): Json<PlayByPlayBundle>| {
                    let recorder = recorder.clone();
                    async move {
                        recorder.lock().unwrap().push((matchup, bundle.plays.len()));
                        let filtered = PlayByPlayBundle {
                            plays: bundle
                                .plays
                                .into_iter()
                                .filter(|p| p.is_score_change)
                                .collect(),
                            game: bundle.game,
                        };
                        Json(filtered)
                    }
                },
            ),
        );
        let base = serve(router).await;

        let filtered = client_for(&base)
            .filter_play_by_play(&sample_bundle())
            .await
            .unwrap();
        assert_eq!(filtered.plays.len(), 1);
        assert_eq!(filtered.plays[0].clock, "0:30");
        assert_eq!(seen.lock().unwrap().as_slice(), &[("BOSLAL".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_filter_transport_failure_returns_snapshot() {
        let base = closed_port().await;
        let bundle = sample_bundle();

        let err = client_for(&base)
            .filter_play_by_play(&bundle)
            .await
            .unwrap_err();
        assert_eq!(err.matchup, "BOSLAL");
        assert!(err.cause.is_transport());
        assert_eq!(err.snapshot, Some(bundle.game));
    }

    #[tokio::test]
    async fn test_filter_decode_failure_has_no_snapshot() {
        let router = Router::new().route("/filter/{matchup}", post(|| async { "[1, 2" }));
        let base = serve(router).await;

        let err = client_for(&base)
            .filter_play_by_play(&sample_bundle())
            .await
            .unwrap_err();
        assert!(matches!(err.cause, UpstreamError::Decode(DecodeError::Json(_))));
        assert!(err.snapshot.is_none());
    }

    #[tokio::test]
    async fn test_filter_empty_body_keeps_nothing() {
        let router = Router::new().route("/filter/{matchup}", post(|| async { "" }));
        let base = serve(router).await;

        let filtered = client_for(&base)
            .filter_play_by_play(&sample_bundle())
            .await
            .unwrap();
        assert_eq!(filtered, PlayByPlayBundle::default());
    }

    #[tokio::test]
    async fn test_fetch_empty_body_is_an_error() {
        let router = Router::new().route("/pbp/{code}", get(|| async { "" }));
        let base = serve(router).await;

        let err = client_for(&base)
            .fetch_play_by_play(&GameCode::new("X"))
            .await
            .unwrap_err();
        assert!(matches!(err.cause, UpstreamError::Decode(DecodeError::Empty)));
    }

    #[tokio::test]
    async fn test_publish_ignores_rejection_status() {
        let received = Arc::new(Mutex::new(0usize));
        let counter = received.clone();
        let router = Router::new().route(
            "/tweet",
            post(move |Json(bundle): Json<PlayByPlayBundle>| {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    if bundle.plays.is_empty() {
                        (StatusCode::FORBIDDEN, "duplicate status")
                    } else {
                        (StatusCode::NO_CONTENT, "")
                    }
                }
            }),
        );
        let base = serve(router).await;
        let client = client_for(&base);

        client.publish(&sample_bundle()).await.unwrap();
        client.publish(&PlayByPlayBundle::default()).await.unwrap();
        assert_eq!(*received.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_publish_transport_failure() {
        let base = closed_port().await;

        let err = client_for(&base)
            .publish(&sample_bundle())
            .await
            .unwrap_err();
        assert!(matches!(err.cause, UpstreamError::Http(_)));
    }
}
