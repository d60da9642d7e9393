//! Tool abstraction exposed to tool-calling agents
//!
//! A tool describes itself through [`ToolMetadata`] (name, description and a
//! JSON schema for its arguments) and runs against a JSON argument object.
//! The MCP handler only ever talks to tools through the registry, so the
//! transport layer stays independent of what each tool does.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::ExecutionClient;
use crate::errors::CodaveriError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn metadata(&self) -> ToolMetadata;
    async fn execute(&self, arguments: Value) -> Result<String, CodaveriError>;
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.metadata().name.clone();
        self.tools.insert(name, tool);
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Metadata for every registered tool, sorted by name
    pub fn list_tools(&self) -> Vec<ToolMetadata> {
        let mut tools: Vec<ToolMetadata> = self.tools.values().map(|tool| tool.metadata()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ToolFactory;

impl ToolFactory {
    pub fn create_execute_code(client: ExecutionClient) -> Arc<dyn Tool> {
        Arc::new(execute_code::ExecuteCodeTool::new(client))
    }

    pub fn create_default_registry(client: ExecutionClient) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_tool(Self::create_execute_code(client));
        registry
    }
}

pub mod execute_code;

pub use execute_code::ExecuteCodeTool;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionConfig;

    fn client() -> ExecutionClient {
        ExecutionClient::new(ExecutionConfig::new("http://127.0.0.1:1", "k")).unwrap()
    }

    #[test]
    fn test_tool_registry_creation() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.tool_count(), 0);
        assert!(registry.list_tools().is_empty());
    }

    #[test]
    fn test_default_registry_exposes_execute_code() {
        let registry = ToolFactory::create_default_registry(client());
        assert_eq!(registry.tool_count(), 1);
        assert!(registry.get_tool("executeCode").is_some());
        assert!(registry.get_tool("nonexistent").is_none());

        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["executeCode".to_string()]);
    }

    #[test]
    fn test_register_same_name_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(ToolFactory::create_execute_code(client()));
        registry.register_tool(ToolFactory::create_execute_code(client()));
        assert_eq!(registry.tool_count(), 1);
    }
}
