//! Policy-enforcing executor backed by ToolRegistry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use agent_core::{ToolDefinition, ToolEnvelope};
use serde_json::{Map, Value};
use tokio::time::timeout;
use tracing::warn;

use crate::error::ToolError;
use crate::registry::ToolRegistry;
use crate::tool::Tool;

/// Restrictions applied on top of the registry.
#[derive(Debug, Clone, Default)]
pub struct ToolPolicy {
    /// When set, only these tools are exposed and runnable.
    pub allowlist: Option<HashSet<String>>,
    /// Upper bound on a single invocation.
    pub timeout: Option<Duration>,
}

impl ToolPolicy {
    pub fn allow_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowlist = self.allowlist.get_or_insert_with(HashSet::new);
        for tool in tools {
            allowlist.insert(tool.into());
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Runs registry tools under a [`ToolPolicy`].
///
/// A tool outside the allowlist is indistinguishable from an unregistered
/// one. A timed-out invocation yields an error envelope rather than an error.
pub struct RegistryToolExecutor {
    registry: Arc<ToolRegistry>,
    policy: ToolPolicy,
}

impl RegistryToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self::with_policy(registry, ToolPolicy::default())
    }

    pub fn with_policy(registry: ToolRegistry, policy: ToolPolicy) -> Self {
        Self::from_shared(Arc::new(registry), policy)
    }

    pub fn from_shared(registry: Arc<ToolRegistry>, policy: ToolPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.registry.as_ref()
    }

    pub fn policy(&self) -> &ToolPolicy {
        &self.policy
    }

    fn is_allowed(&self, tool: &str) -> bool {
        match self.policy.allowlist {
            Some(ref allowlist) => allowlist.contains(tool),
            None => true,
        }
    }

    /// Look up a runnable tool.
    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        if !self.is_allowed(name) {
            return None;
        }
        self.registry.get(name)
    }

    /// The tool table exposed to the reasoning engine, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry
            .list_tools()
            .into_iter()
            .filter(|name| self.is_allowed(name))
            .filter_map(|name| self.registry.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Names of the runnable tools.
    pub fn supported_tools(&self) -> Vec<&str> {
        self.registry
            .list_tools()
            .into_iter()
            .filter(|name| self.is_allowed(name))
            .collect()
    }

    /// Execute a tool, enforcing the allowlist and the timeout.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolEnvelope, ToolError> {
        if !self.is_allowed(name) {
            return Err(ToolError::NotFound(name.to_string()));
        }

        let execute_future = self.registry.execute(name, arguments);

        match self.policy.timeout {
            Some(timeout_duration) => match timeout(timeout_duration, execute_future).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Tool '{}' timed out after {:?}", name, timeout_duration);
                    Ok(ToolEnvelope::failure(
                        format!("Tool '{}' did not finish in time.", name),
                        ToolError::Timeout(timeout_duration).to_string(),
                    ))
                }
            },
            None => execute_future.await,
        }
    }
}
