//! Foreground mode: poll one game in the terminal.
//!
//! Runs a single poller against the configured upstreams and echoes every
//! published bundle to stdout. Ctrl+C stops it between stages.

use anyhow::Context;
use async_trait::async_trait;
use pbp_core::config::RelayConfig;
use pbp_core::processors::{PollOutcome, Poller};
use pbp_core::registry::GameRegistry;
use pbp_core::upstream::PlayByPlayUpstream;
use pbp_sdk::client::{FetchError, FilterError, PublishError};
use pbp_sdk::{GameCode, PlayByPlayBundle};
use std::fmt::Write;
use std::sync::Arc;

/// Upstream wrapper that prints what it successfully published.
struct ConsoleEcho<U> {
    inner: U,
}

#[async_trait]
impl<U: PlayByPlayUpstream> PlayByPlayUpstream for ConsoleEcho<U> {
    async fn fetch(&self, game_code: &GameCode) -> Result<PlayByPlayBundle, FetchError> {
        self.inner.fetch(game_code).await
    }

    async fn filter(&self, bundle: &PlayByPlayBundle) -> Result<PlayByPlayBundle, FilterError> {
        self.inner.filter(bundle).await
    }

    async fn publish(&self, bundle: &PlayByPlayBundle) -> Result<(), PublishError> {
        self.inner.publish(bundle).await?;
        print!("{}", render_bundle(bundle));
        Ok(())
    }
}

/// One line per play: clock, score, and the display description (falling
/// back to the raw description when the filter left it empty).
fn render_bundle(bundle: &PlayByPlayBundle) -> String {
    let game = &bundle.game;
    let mut out = String::new();
    for play in &bundle.plays {
        let text = if play.formatted.description.is_empty() {
            &play.description
        } else {
            &play.formatted.description
        };
        let _ = writeln!(
            out,
            "[Q{} {:>5}] {} {} - {} {} | {}",
            game.period.current,
            play.clock,
            game.visiting_team.tri_code,
            play.visiting_team_score,
            play.home_team_score,
            game.home_team.tri_code,
            text
        );
    }
    out
}

/// Poll `game_code` until the game ends, a stage fails, or Ctrl+C.
pub async fn run_watch(config: &RelayConfig, game_code: GameCode) -> anyhow::Result<()> {
    let client = config
        .upstream
        .build_client()
        .context("failed to build upstream http client")?;
    let registry = GameRegistry::new();
    let lease = registry
        .try_activate(game_code.clone())
        .context("game code already claimed")?;

    let ctrl_c_registry = registry.clone();
    let ctrl_c_code = game_code.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(game_code = %ctrl_c_code, "Received Ctrl+C, stopping");
            ctrl_c_registry.request_stop(ctrl_c_code.as_str());
        }
    });

    let upstream = Arc::new(ConsoleEcho { inner: client });
    let poller = Poller::new(upstream, config.poller.interval, lease);

    match poller.run().await {
        PollOutcome::GameEnded { cycles } => {
            println!("{game_code}: game over after {cycles} update(s)");
            Ok(())
        }
        PollOutcome::Stopped { cycles } => {
            println!("{game_code}: stopped after {cycles} update(s)");
            Ok(())
        }
        PollOutcome::Failed { error, .. } => {
            Err(error).with_context(|| format!("polling {game_code} failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bundle() {
        let bundle: PlayByPlayBundle = serde_json::from_str(
            r#"{
                "vTeam": {"triCode": "BOS"},
                "hTeam": {"triCode": "LAL"},
                "period": {"Current": 4},
                "Plays": [
                    {"clock": "0:04", "vTeamScore": "110", "hTeamScore": "108",
                     "description": "Tatum Jump Shot: Made",
                     "formatted": {"description": "Tatum for the lead!"}},
                    {"clock": "0:00", "vTeamScore": "110", "hTeamScore": "108",
                     "description": "End of 4th Period"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            render_bundle(&bundle),
            "[Q4  0:04] BOS 110 - 108 LAL | Tatum for the lead!\n\
             [Q4  0:00] BOS 110 - 108 LAL | End of 4th Period\n"
        );
    }

    #[test]
    fn test_render_empty_bundle() {
        assert_eq!(render_bundle(&PlayByPlayBundle::default()), "");
    }
}
