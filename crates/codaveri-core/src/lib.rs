//! Client for a hosted code-execution API, exposed as an agent tool.
//!
//! A single capability is provided: run a snippet in one of a fixed set of
//! languages on a remote backend and return what it printed. The pipeline is
//! split into small pieces that can be used on their own:
//!
//! - **Language registry** ([`languages`]): language name to entry file and runtime version
//! - **Request builder** ([`request`]): the submission payload
//! - **Execution client** ([`client`]): job submission and completion polling
//! - **Result extraction** ([`response`]): projection of a finished job to its stdout
//! - **Tools** ([`tools`], [`mcp`]): the `executeCode` tool and its MCP server handler

pub mod client;
pub mod config;
pub mod errors;
pub mod languages;
pub mod mcp;
pub mod request;
pub mod response;
pub mod tools;

pub use client::{ExecutionClient, PollStatus};
pub use config::{ConfigLoader, ExecutionConfig, PollPolicy};
pub use errors::CodaveriError;
pub use languages::{resolve, Language, LanguageDescriptor};
pub use mcp::CodaveriMcpServer;
pub use request::ExecuteRequest;
pub use response::{extract_output, ResponseExecute, NO_OUTPUT};
pub use tools::{Tool, ToolFactory, ToolRegistry};
