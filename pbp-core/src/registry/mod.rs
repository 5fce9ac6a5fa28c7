//! Registry of games that currently have a running poller.
//!
//! The registry is the only state shared between pollers and request
//! handlers. Every operation takes one exclusive lock, does O(1) work and
//! returns; nothing holds the lock across an await point.
//!
//! Ownership of a code is represented by an [`ActiveGame`] lease handed out
//! by [`GameRegistry::try_activate`]. Dropping the lease removes the code,
//! which makes release unconditional on every exit path of a poller.

use pbp_sdk::GameCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

struct Entry {
    lease_id: u64,
    stop_tx: watch::Sender<bool>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<GameCode, Entry>,
    next_lease_id: u64,
}

impl Inner {
    fn insert(&mut self, game_code: GameCode) -> (u64, watch::Receiver<bool>) {
        let lease_id = self.next_lease_id;
        self.next_lease_id += 1;
        let (stop_tx, stop_rx) = watch::channel(false);
        self.entries.insert(game_code, Entry { lease_id, stop_tx });
        (lease_id, stop_rx)
    }
}

/// Concurrency-safe set of active game codes.
///
/// Cloning yields another handle to the same set.
#[derive(Clone, Default)]
pub struct GameRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-updated, so
    // a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_active(&self, game_code: &str) -> bool {
        self.lock().entries.contains_key(game_code)
    }

    /// Mark `game_code` active without handing out a lease.
    ///
    /// Replaces any existing entry; the previous owner's lease no longer
    /// matches and will not remove the new entry when dropped.
    pub fn activate(&self, game_code: GameCode) {
        self.lock().insert(game_code);
    }

    /// Remove `game_code` regardless of who owns it.
    ///
    /// Returns whether the code was active.
    pub fn deactivate(&self, game_code: &str) -> bool {
        self.lock().entries.remove(game_code).is_some()
    }

    /// Atomically mark `game_code` active if it is not already.
    ///
    /// Returns the lease when this caller now owns the code, `None` when
    /// another owner already holds it.
    pub fn try_activate(&self, game_code: GameCode) -> Option<ActiveGame> {
        let mut inner = self.lock();
        if inner.entries.contains_key(game_code.as_str()) {
            return None;
        }
        let (lease_id, stop_rx) = inner.insert(game_code.clone());
        drop(inner);

        debug!(%game_code, lease_id, "Game activated");
        Some(ActiveGame {
            registry: self.clone(),
            game_code,
            lease_id,
            stop_rx,
        })
    }

    /// Snapshot of the active codes, sorted.
    pub fn list_active(&self) -> Vec<GameCode> {
        let mut codes: Vec<GameCode> = self.lock().entries.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Ask the owner of `game_code` to stop.
    ///
    /// Returns whether the code was active. The code stays registered until
    /// its poller exits.
    pub fn request_stop(&self, game_code: &str) -> bool {
        match self.lock().entries.get(game_code) {
            Some(entry) => {
                entry.stop_tx.send_replace(true);
                true
            }
            None => false,
        }
    }

    /// Ask every owner to stop. Returns the number of codes signalled.
    pub fn stop_all(&self) -> usize {
        let inner = self.lock();
        for entry in inner.entries.values() {
            entry.stop_tx.send_replace(true);
        }
        inner.entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, game_code: &GameCode, lease_id: u64) {
        let mut inner = self.lock();
        let owned = inner
            .entries
            .get(game_code.as_str())
            .is_some_and(|entry| entry.lease_id == lease_id);
        if owned {
            inner.entries.remove(game_code.as_str());
            debug!(%game_code, lease_id, "Game deactivated");
        }
    }
}

/// Exclusive ownership of one active game code.
///
/// The code is removed from the registry when the lease is dropped.
pub struct ActiveGame {
    registry: GameRegistry,
    game_code: GameCode,
    lease_id: u64,
    stop_rx: watch::Receiver<bool>,
}

impl ActiveGame {
    pub fn game_code(&self) -> &GameCode {
        &self.game_code
    }

    pub fn stop_requested(&self) -> bool {
        *self.stop_rx.borrow()
    }

    /// Resolves once a stop has been requested for this game.
    ///
    /// Also resolves if the entry was removed or replaced behind the
    /// lease's back, since the lease then no longer owns the code.
    pub async fn stopped(&mut self) {
        let _ = self.stop_rx.wait_for(|stop| *stop).await;
    }
}

impl Drop for ActiveGame {
    fn drop(&mut self) {
        self.registry.release(&self.game_code, self.lease_id);
    }
}
