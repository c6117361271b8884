//! MCP handshake

use crate::mcp::handlers::{parse_params, to_result};
use crate::mcp::types::MCPError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revisions this server speaks, newest first
pub const PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

const SERVER_NAME: &str = "blockdoc-mcp";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub client_info: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub server_info: ServerInfo,
    pub capabilities: Capabilities,
    pub instructions: Instructions,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Capabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

/// Usage notes surfaced to the client model
#[derive(Debug, Serialize)]
pub struct Instructions {
    pub block_types: &'static str,
    pub placement: &'static str,
    pub strict: &'static str,
}

impl Instructions {
    fn current() -> Self {
        Self {
            block_types: "Canonical types: paragraph, heading, quote, list, code, divider, \
                callout, latex, table, bookmark, image, attachment. Legacy aliases heading1-3, \
                bulleted_list, numbered_list and todo are accepted.",
            placement: "Use at most one of afterBlockId, beforeBlockId or parentId (+ index). \
                Without placement, blocks are appended to the document's note.",
            strict: "Requests are validated strictly unless strict=false; lenient requests \
                silently drop fields that do not apply to the block type.",
        }
    }
}

/// Agree on a protocol revision and advertise the tools capability
///
/// The client's revision is echoed back when this server speaks it; any other
/// revision fails the handshake with `INVALID_REQUEST`.
pub fn handle_initialize(params: Value) -> Result<Value, MCPError> {
    let params: InitializeParams = parse_params(params)?;
    let requested = params.protocol_version.as_str();

    if !PROTOCOL_VERSIONS.contains(&requested) {
        return Err(MCPError::invalid_request(format!(
            "Unsupported protocol version: {requested}. Server supports: {}",
            PROTOCOL_VERSIONS.join(", ")
        )));
    }

    tracing::debug!(
        "Handshake with {} using protocol {}",
        params
            .client_info
            .as_ref()
            .and_then(|c| c.get("name"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown client"),
        requested
    );

    to_result(&InitializeResult {
        protocol_version: params.protocol_version.clone(),
        server_info: ServerInfo {
            name: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
        },
        capabilities: Capabilities {
            tools: ToolsCapability {
                list_changed: false,
            },
        },
        instructions: Instructions::current(),
    })
}

#[cfg(test)]
#[path = "initialize_test.rs"]
mod initialize_test;
