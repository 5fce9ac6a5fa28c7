//! ActivationService processor.
//!
//! Boundary-facing entry point for starting, stopping and listing pollers.
//! Activation is fire-and-forget: the registry claim is atomic, the poller
//! is launched on its own task, and the caller gets an answer without
//! waiting on any network I/O.

use crate::config::PollerConfig;
use crate::processors::poller::Poller;
use crate::registry::{ActiveGame, GameRegistry};
use crate::upstream::PlayByPlayUpstream;
use kanau::processor::Processor;
use pbp_sdk::GameCode;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Request to start polling a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateGame {
    pub game_code: GameCode,
}

/// Request to stop a running poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivateGame {
    pub game_code: GameCode,
}

/// Request for the codes that currently have a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListActiveGames;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A new poller was launched.
    Started,
    /// A poller already owns the code; nothing was done.
    AlreadyActive,
}

/// Launches pollers and supervises their tasks.
///
/// The supervisor awaits each poller task so that a panic inside a poller
/// ends up in the log instead of vanishing with the task. Supervisor tasks
/// are kept in a [`JoinSet`] so shutdown can wait for them.
#[derive(Clone)]
pub struct PollerSpawner {
    upstream: Arc<dyn PlayByPlayUpstream>,
    interval: Duration,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl PollerSpawner {
    pub fn new(upstream: Arc<dyn PlayByPlayUpstream>, config: PollerConfig) -> Self {
        Self {
            upstream,
            interval: config.interval,
            tasks: Arc::default(),
        }
    }

    /// Spawn a poller for `lease` under a supervisor task.
    pub async fn spawn(&self, lease: ActiveGame) {
        let game_code = lease.game_code().clone();
        let poller = Poller::new(self.upstream.clone(), self.interval, lease);
        let task = tokio::spawn(poller.run());

        let mut tasks = self.tasks.lock().await;
        // Reap supervisors of pollers that already finished.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            match task.await {
                Ok(_) => {}
                Err(e) if e.is_panic() => {
                    error!(%game_code, error = %e, "Poller panicked");
                }
                Err(e) => {
                    warn!(%game_code, error = %e, "Poller task cancelled");
                }
            }
        });
    }

    /// Number of pollers that have not finished yet.
    pub async fn running(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Wait up to `grace` for every spawned poller to finish.
    ///
    /// Returns how many were still running when the wait ended; those stay
    /// supervised. New spawns wait until this returns.
    pub async fn join_all(&self, grace: Duration) -> usize {
        let mut tasks = self.tasks.lock().await;
        let _ = tokio::time::timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        tasks.len()
    }
}

/// Starts a poller for a game code only if none is running.
#[derive(Clone)]
pub struct ActivationService {
    registry: GameRegistry,
    spawner: PollerSpawner,
}

impl ActivationService {
    pub fn new(registry: GameRegistry, spawner: PollerSpawner) -> Self {
        Self { registry, spawner }
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    /// Ask every running poller to stop. Returns how many were signalled.
    pub fn shutdown(&self) -> usize {
        let signalled = self.registry.stop_all();
        info!(pollers = signalled, "Stopping all pollers");
        signalled
    }

    /// Wait up to `grace` for the pollers to exit. Returns how many did not.
    pub async fn join_pollers(&self, grace: Duration) -> usize {
        self.spawner.join_all(grace).await
    }
}

impl Processor<ActivateGame> for ActivationService {
    type Output = Activation;
    type Error = Infallible;

    async fn process(&self, request: ActivateGame) -> Result<Activation, Infallible> {
        let game_code = request.game_code;
        match self.registry.try_activate(game_code.clone()) {
            Some(lease) => {
                info!(%game_code, "Activating game");
                self.spawner.spawn(lease).await;
                Ok(Activation::Started)
            }
            None => {
                info!(%game_code, "Game already active");
                Ok(Activation::AlreadyActive)
            }
        }
    }
}

impl Processor<DeactivateGame> for ActivationService {
    type Output = bool;
    type Error = Infallible;

    async fn process(&self, request: DeactivateGame) -> Result<bool, Infallible> {
        let stopping = self.registry.request_stop(request.game_code.as_str());
        if stopping {
            info!(game_code = %request.game_code, "Stop requested");
        }
        Ok(stopping)
    }
}

impl Processor<ListActiveGames> for ActivationService {
    type Output = Vec<GameCode>;
    type Error = Infallible;

    async fn process(&self, _request: ListActiveGames) -> Result<Vec<GameCode>, Infallible> {
        Ok(self.registry.list_active())
    }
}
