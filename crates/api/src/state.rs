//! Shared handler state.

use std::sync::Arc;

use agent_core::Reasoner;
use orchestrator::Orchestrator;

/// The orchestrator the handlers drive, over any reasoner.
pub type SharedOrchestrator = Arc<Orchestrator<Arc<dyn Reasoner>>>;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: SharedOrchestrator,
    pub api_token: Option<String>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator<Arc<dyn Reasoner>>, api_token: Option<String>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            api_token,
        }
    }
}
