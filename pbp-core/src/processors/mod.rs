//! Processors driving the relay.
//!
//! - `ActivationService`: receives `ActivateGame` / `DeactivateGame` /
//!   `ListActiveGames`, claims codes in the registry and launches pollers
//! - `Poller`: owns one claimed code and runs fetch → filter → publish
//!   until the game ends

pub mod activation;
pub mod poller;

pub use activation::{
    ActivateGame, Activation, ActivationService, DeactivateGame, ListActiveGames, PollerSpawner,
};
pub use poller::{PollError, PollOutcome, Poller, Stage};
