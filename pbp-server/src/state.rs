//! Application state shared across all request handlers.

use pbp_core::processors::ActivationService;

/// Application state that is shared across all request handlers.
///
/// Cheap to clone; the registry and upstream client inside are shared.
#[derive(Clone)]
pub struct AppState {
    pub activation: ActivationService,
}

impl AppState {
    pub fn new(activation: ActivationService) -> Self {
        Self { activation }
    }
}
