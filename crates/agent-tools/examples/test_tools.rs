//! Exercise every tool in the registry against the live upstreams.
//!
//! Run with: cargo run -p agent-tools --example test_tools
//!
//! Reads FRED_API_KEY, FRASER_API_KEY and OPENSEARCH_* from the environment
//! (or `.env`); tools without credentials print their error envelope.

use agent_tools::{executor_from_config, RegistryToolExecutor, ToolsConfig};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agent_tools=debug".parse()?),
        )
        .init();

    println!("=== Agent Tools Crate Test ===\n");

    let executor = executor_from_config(&ToolsConfig::from_env())?;

    println!("Registered tools:");
    for definition in executor.definitions() {
        println!("  - {}: {}", definition.name(), definition.function.description);
    }
    println!();

    run(&executor, "fred_recent_data", json!({"series_id": "UNRATE", "latest_points": 6})).await?;
    run(&executor, "fred_chart", json!({"series_id": "CPIAUCSL"})).await?;
    run(&executor, "fred_series_release_schedule", json!({"series_id": "GDP"})).await?;
    run(&executor, "fred_release_structure", json!({"release_name": "H.4.1"})).await?;
    run(&executor, "fred_search_series", json!({"query": "mortgage rate", "limit": 3})).await?;
    run(&executor, "fraser_search_fomc_titles", json!({"query": "Meeting, January 2010"})).await?;
    run(&executor, "retrieve_documents", json!({"query": "consumer price index"})).await?;

    println!("=== All tests complete ===");
    Ok(())
}

async fn run(
    executor: &RegistryToolExecutor,
    name: &str,
    args: Value,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- {} ---", name);
    let Value::Object(args) = args else {
        return Err("tool arguments must be an object".into());
    };

    let envelope = executor.execute(name, args).await?;
    println!("{}\n", envelope.tool_content());
    Ok(())
}
