//! Poller: the per-game fetch → filter → publish loop.
//!
//! A poller owns one [`ActiveGame`] lease for its whole life and:
//! - fetches a fresh bundle at the top of every cycle
//! - filters exactly the bundle it just fetched
//! - publishes exactly the bundle the filter returned
//! - stops once the fetched snapshot reports the game inactive
//! - aborts the run on the first failed stage, without retrying
//! - sleeps a fixed interval between cycles
//!
//! The lease is dropped when `run` returns (or unwinds), which removes the
//! code from the registry.

use crate::registry::ActiveGame;
use crate::upstream::PlayByPlayUpstream;
use pbp_sdk::GameCode;
use pbp_sdk::client::{FetchError, FilterError, PublishError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Stage of a poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Filter,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Filter => "filter",
            Stage::Publish => "publish",
        })
    }
}

/// A failed stage. Ends the poller.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl PollError {
    pub fn stage(&self) -> Stage {
        match self {
            PollError::Fetch(_) => Stage::Fetch,
            PollError::Filter(_) => Stage::Filter,
            PollError::Publish(_) => Stage::Publish,
        }
    }
}

/// How a poller's run ended. `cycles` counts fully published cycles.
#[derive(Debug)]
pub enum PollOutcome {
    /// The last fetched snapshot reported the game inactive.
    GameEnded { cycles: u32 },
    /// A stop was requested through the registry.
    Stopped { cycles: u32 },
    /// A stage failed.
    Failed { cycles: u32, error: PollError },
}

impl PollOutcome {
    pub fn cycles(&self) -> u32 {
        match self {
            PollOutcome::GameEnded { cycles }
            | PollOutcome::Stopped { cycles }
            | PollOutcome::Failed { cycles, .. } => *cycles,
        }
    }
}

/// Counts from one completed cycle.
struct CycleReport {
    game_active: bool,
    plays_fetched: usize,
    plays_published: usize,
}

pub struct Poller<U: ?Sized> {
    upstream: Arc<U>,
    interval: Duration,
    lease: ActiveGame,
}

impl<U: PlayByPlayUpstream + ?Sized> Poller<U> {
    pub fn new(upstream: Arc<U>, interval: Duration, lease: ActiveGame) -> Self {
        Self {
            upstream,
            interval,
            lease,
        }
    }

    pub fn game_code(&self) -> &GameCode {
        self.lease.game_code()
    }

    /// Run cycles until the game ends, a stage fails, or a stop is
    /// requested.
    pub async fn run(self) -> PollOutcome {
        let Poller {
            upstream,
            interval,
            mut lease,
        } = self;
        let game_code = lease.game_code().clone();
        let mut cycles = 0u32;

        info!(%game_code, interval_secs = interval.as_secs_f64(), "Poller started");

        let outcome = loop {
            if lease.stop_requested() {
                break PollOutcome::Stopped { cycles };
            }

            let result = tokio::select! {
                biased;

                _ = lease.stopped() => break PollOutcome::Stopped { cycles },

                result = cycle(upstream.as_ref(), &game_code) => result,
            };

            let report = match result {
                Ok(report) => report,
                Err(error) => break PollOutcome::Failed { cycles, error },
            };
            cycles += 1;

            debug!(
                %game_code,
                cycle = cycles,
                plays_fetched = report.plays_fetched,
                plays_published = report.plays_published,
                game_active = report.game_active,
                "Poll cycle completed"
            );

            if !report.game_active {
                break PollOutcome::GameEnded { cycles };
            }

            tokio::select! {
                biased;

                _ = lease.stopped() => break PollOutcome::Stopped { cycles },

                _ = tokio::time::sleep(interval) => {}
            }
        };

        log_outcome(&game_code, &outcome);
        outcome
    }
}

/// One fetch → filter → publish pass.
async fn cycle<U: PlayByPlayUpstream + ?Sized>(
    upstream: &U,
    game_code: &GameCode,
) -> Result<CycleReport, PollError> {
    let fetched = upstream.fetch(game_code).await?;
    let filtered = upstream.filter(&fetched).await?;
    upstream.publish(&filtered).await?;

    Ok(CycleReport {
        game_active: fetched.is_active(),
        plays_fetched: fetched.plays.len(),
        plays_published: filtered.plays.len(),
    })
}

fn log_outcome(game_code: &GameCode, outcome: &PollOutcome) {
    match outcome {
        PollOutcome::GameEnded { cycles } => {
            info!(%game_code, cycles, "Game ended, poller finished");
        }
        PollOutcome::Stopped { cycles } => {
            info!(%game_code, cycles, "Poller stopped on request");
        }
        PollOutcome::Failed { cycles, error } => {
            let game_active = match error {
                PollError::Filter(FilterError {
                    snapshot: Some(snapshot),
                    ..
                }) => Some(snapshot.active),
                _ => None,
            };
            error!(
                %game_code,
                stage = %error.stage(),
                cycles,
                ?game_active,
                error = %error,
                "Poll cycle failed, poller abandoned"
            );
        }
    }
}
