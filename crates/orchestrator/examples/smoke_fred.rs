//! Manual smoke test for live FRED tools and one agent turn.
//!
//! Run with: cargo run -p orchestrator --example smoke_fred -- GDP
//! With an agent turn:
//!   cargo run -p orchestrator --example smoke_fred -- CPIAUCSL "Show me the latest CPI value"
//!
//! Configuration via .env file or environment variables:
//!   FRED_API_KEY     - FRED API key (required)
//!   OPENAI_API_KEY   - Needed only when a prompt is given
//!   SMOKE_RELEASE    - Release name for the structure check (default: H.4.1)
//!   SMOKE_SEARCH     - Query for the series search check (default: denmark inflation)

use std::env;

use agent_tools::{executor_from_config, RegistryToolExecutor, ToolsConfig};
use chat_brain::ChatBrain;
use orchestrator::{Orchestrator, OrchestratorConfig, TurnRequest};
use serde_json::{json, Value};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orchestrator=info".parse()?)
                .add_directive("agent_tools=info".parse()?),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let series_id = args.first().cloned().unwrap_or_else(|| "GDP".to_string());
    let prompt = if args.len() > 1 { args[1..].join(" ") } else { String::new() };

    let tools_config = ToolsConfig::from_env();
    if tools_config.fred_api_key.is_none() {
        return Err("FRED_API_KEY is required for this smoke test but is not set.".into());
    }

    let executor = executor_from_config(&tools_config)?;

    run(&executor, "fred_recent_data", json!({"series_id": series_id, "latest_points": 6})).await?;
    run(&executor, "fred_series_release_schedule", json!({"series_id": series_id})).await?;

    let release = env::var("SMOKE_RELEASE").unwrap_or_else(|_| "H.4.1".to_string());
    run(&executor, "fred_release_structure", json!({"release_name": release})).await?;

    let search = env::var("SMOKE_SEARCH").unwrap_or_else(|_| "denmark inflation".to_string());
    run(&executor, "fred_search_series", json!({"query": search})).await?;

    if prompt.is_empty() {
        println!("\nAgent step skipped (no prompt provided).");
        return Ok(());
    }

    info!("Running one agent turn for series {}", series_id);
    let brain = ChatBrain::from_env()?;
    let orchestrator = Orchestrator::new(brain, executor, OrchestratorConfig::from_env()?);

    let response = orchestrator
        .process(TurnRequest::new(prompt).with_user_id("smoke-user"))
        .await?;

    dump_section("Agent Response", &Value::String(response.response.clone()));
    if !response.attachments.is_empty() {
        let titles: Vec<&str> = response.attachments.iter().map(|a| a.title.as_str()).collect();
        dump_section("Attachments", &json!(titles));
    }
    if !response.series_data.is_empty() {
        dump_section("Series Data", &serde_json::to_value(&response.series_data)?);
    }

    Ok(())
}

async fn run(
    executor: &RegistryToolExecutor,
    name: &str,
    args: Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let Value::Object(args) = args else {
        return Err("tool arguments must be an object".into());
    };

    let envelope = executor.execute(name, args).await?;
    dump_section(name, &serde_json::to_value(&envelope)?);
    Ok(())
}

fn dump_section(title: &str, payload: &Value) {
    println!("\n=== {} ===", title);
    match payload {
        Value::String(text) => println!("{}", text),
        other => println!(
            "{}",
            serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())
        ),
    }
}
