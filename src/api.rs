//! HTTP API for the agent router

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::controller::TurnController;
use crate::gateway::ModelGateway;
use std::sync::Arc;

/// Controller type served over HTTP
pub type SharedController = TurnController<Arc<dyn ModelGateway>>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SharedController>,
}

impl AppState {
    pub fn new(controller: SharedController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
