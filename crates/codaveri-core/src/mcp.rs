//! MCP server handler exposing the tool registry
//!
//! The handler is transport-agnostic; the binary serves it over stdio. Tool
//! failures are reported back to the host as error results carrying the error
//! message, while protocol misuse (an unknown tool name) is a protocol error.

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool as McpTool,
    },
    service::RequestContext,
    Error as McpError, RoleServer, ServerHandler,
};
use serde_json::Value;
use std::sync::Arc;

use crate::tools::{ToolMetadata, ToolRegistry};

pub const SERVER_NAME: &str = "codaveri";

#[derive(Clone)]
pub struct CodaveriMcpServer {
    registry: Arc<ToolRegistry>,
}

impl CodaveriMcpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn tools(&self) -> Vec<McpTool> {
        self.registry.list_tools().iter().map(to_mcp_tool).collect()
    }

    /// Run the named tool and wrap its outcome for the host
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        let tool = self.registry.get_tool(name).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown tool: {}", name), None)
        })?;

        match tool.execute(arguments).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => {
                log::error!("Error executing {}: {}", name, e);
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

fn to_mcp_tool(metadata: &ToolMetadata) -> McpTool {
    let input_schema = match &metadata.input_schema {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    McpTool {
        name: metadata.name.clone().into(),
        description: Some(metadata.description.clone().into()),
        input_schema: Arc::new(input_schema),
        annotations: None,
    }
}

impl ServerHandler for CodaveriMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Use executeCode to run a program remotely and read back its standard output."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request
            .arguments
            .map(Value::Object)
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        self.dispatch(&request.name, arguments).await
    }
}
