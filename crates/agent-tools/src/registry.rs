//! Tool registry for managing and executing tools.

use std::sync::Arc;

use agent_core::{ToolDefinition, ToolEnvelope};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs};

/// Ordered registry of tools.
///
/// The registry is filled once at startup and then shared read-only. Its
/// registration order is the order in which the tool table is presented to
/// the reasoning engine.
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced in place.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_shared(Arc::new(tool));
    }

    /// Register a shared tool.
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// Registered tool names, in registration order.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The function-calling tool table, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name with the given parameters.
    pub async fn execute(
        &self,
        name: &str,
        params: Map<String, Value>,
    ) -> Result<ToolEnvelope, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        debug!("Executing tool '{}' with {} params", name, params.len());

        let envelope = tool.execute(ToolArgs::new(params)).await;

        debug!(
            "Tool '{}' completed: error={}, message_len={}",
            name,
            envelope.is_error(),
            envelope.message().len()
        );

        Ok(envelope)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
