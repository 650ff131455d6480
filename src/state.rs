//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::readiness::ReadinessController;
use crate::store::SharedState;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// The readiness controller is private per-instance state; the shared-state
/// client talks to the store every instance has in common.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub readiness: ReadinessController,
    pub shared: SharedState,
}

impl AppState {
    pub fn new(config: AppConfig, readiness: ReadinessController, shared: SharedState) -> Self {
        Self {
            config: Arc::new(config),
            readiness,
            shared,
        }
    }
}
