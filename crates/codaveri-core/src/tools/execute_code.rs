//! The `executeCode` tool: run a snippet on the remote backend

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolMetadata};
use crate::client::ExecutionClient;
use crate::errors::CodaveriError;
use crate::languages::Language;

pub const TOOL_NAME: &str = "executeCode";

pub struct ExecuteCodeTool {
    client: ExecutionClient,
}

impl ExecuteCodeTool {
    pub fn new(client: ExecutionClient) -> Self {
        Self { client }
    }

    fn string_argument<'a>(arguments: &'a Value, name: &str) -> Result<&'a str, CodaveriError> {
        arguments
            .get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| CodaveriError::ToolError {
                tool_name: TOOL_NAME.to_string(),
                message: format!("Missing or invalid '{}' parameter", name),
            })
    }
}

#[async_trait]
impl Tool for ExecuteCodeTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: TOOL_NAME.to_string(),
            description: "Execute code".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "The code to be executed"
                    },
                    "language": {
                        "type": "string",
                        "enum": Language::names(),
                        "description": "The programming language of the code"
                    }
                },
                "required": ["code", "language"]
            }),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String, CodaveriError> {
        let code = Self::string_argument(&arguments, "code")?;
        let language = Self::string_argument(&arguments, "language")?;

        log::info!("executeCode: {} bytes of {}", code.len(), language);
        self.client.execute(code, language).await
    }
}
