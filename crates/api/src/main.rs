use std::sync::Arc;

use agent_core::Reasoner;
use agent_tools::{executor_from_config, ToolsConfig};
use api::{router, ApiConfig, AppState};
use chat_brain::ChatBrain;
use orchestrator::{Orchestrator, OrchestratorConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!("API failed to start: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;

    // A missing reasoning-engine key is fatal; missing tool credentials are not.
    let brain: Arc<dyn Reasoner> = Arc::new(ChatBrain::from_env()?);
    let executor = executor_from_config(&ToolsConfig::from_env())?;
    let orchestrator = Orchestrator::new(brain, executor, OrchestratorConfig::from_env()?);

    let state = AppState::new(orchestrator, config.api_token.clone());
    let app = router(state, &config.cors_origin)?;

    info!(
        "Economic data agent listening on {} (auth: {}, cors: {})",
        config.addr,
        config.api_token.is_some(),
        config.cors_origin
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
