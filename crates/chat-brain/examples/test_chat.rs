//! Simple test for ChatBrain.
//!
//! Run with: cargo run -p chat-brain --example test_chat
//! Or with a custom message: cargo run -p chat-brain --example test_chat -- "Your message here"
//!
//! Make sure to set environment variables in .env:
//!   OPENAI_API_KEY - API key for the chat-completions endpoint

use chat_brain::{ChatBrain, Message, Reasoner, ToolDefinition};
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let message_text = if args.len() > 1 {
        args[1..].join(" ")
    } else {
        "What is the latest US unemployment rate?".to_string()
    };

    println!("Initializing ChatBrain...");
    let brain = ChatBrain::from_env()?;

    println!("Brain initialized: {}", brain.name());
    println!("API URL: {}", brain.config().api_url);
    println!("Model: {}", brain.config().model);
    println!();

    // A single tool so the model can show it would call one.
    let tools = vec![ToolDefinition::function(
        "fred_recent_data",
        "Fetch the latest observations for a FRED series.",
        json!({
            "type": "object",
            "properties": {"series_id": {"type": "string"}},
            "required": ["series_id"]
        }),
    )];

    let history = vec![
        Message::system("You answer questions about US economic data."),
        Message::user(&message_text),
    ];

    println!("Sending: \"{}\"", message_text);
    println!("Waiting for response...\n");

    let reply = brain.next_action(&history, &tools).await?;

    println!("=== Response ===");
    if reply.has_tool_calls() {
        for call in &reply.tool_calls {
            println!(
                "tool call {} -> {}({})",
                call.call_id,
                call.name,
                serde_json::Value::Object(call.arguments.clone())
            );
        }
    } else {
        println!("{}", reply.content);
    }
    println!("================");

    Ok(())
}
