//! HTTP gateway for the economic-data agent.
//!
//! Exposes one [`orchestrator::Orchestrator`] over axum:
//!
//! - `GET /` - liveness banner
//! - `GET /health` - `{"status": "ok"}`
//! - `POST /ask` - `{text, conversation, user_id}` → `{response, attachments?, series_data?}`
//!
//! A failed turn still answers `200` with `{"response": "Error: ..."}`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, SharedOrchestrator};
