//! MCP Tools Handler
//!
//! Implements MCP-compliant tools/list and tools/call methods. Every block
//! operation is exposed both as a direct JSON-RPC method and as a tool.

use crate::mcp::handlers::{blocks, documents, markdown};
use crate::mcp::types::MCPError;
use crate::models::BlockType;
use crate::operations::BlockOperations;
use serde_json::{json, Value};
use std::sync::Arc;

/// Names of every tool, in tools/list order
pub const TOOL_NAMES: [&str; 5] = [
    "append_block",
    "append_markdown",
    "import_markdown",
    "export_markdown",
    "read_document",
];

/// Handle tools/list
pub fn handle_tools_list(_params: Value) -> Result<Value, MCPError> {
    Ok(json!({ "tools": get_tool_schemas() }))
}

/// Route a tool call to the matching operation handler
pub async fn call_tool(
    operations: &Arc<BlockOperations>,
    tool_name: &str,
    arguments: Value,
) -> Result<Value, MCPError> {
    match tool_name {
        "append_block" => blocks::handle_append_block(operations, arguments).await,
        "append_markdown" => markdown::handle_append_markdown(operations, arguments).await,
        "import_markdown" => markdown::handle_import_markdown(operations, arguments),
        "export_markdown" => markdown::handle_export_markdown(operations, arguments).await,
        "read_document" => documents::handle_read_document(operations, arguments).await,
        _ => Err(MCPError::method_not_found(tool_name)),
    }
}

/// Handle tools/call
///
/// Tool execution errors are returned as successful responses with
/// `isError: true`; only a malformed call is a JSON-RPC error.
pub async fn handle_tools_call(
    operations: &Arc<BlockOperations>,
    params: Value,
) -> Result<Value, MCPError> {
    let tool_name = params["name"]
        .as_str()
        .ok_or_else(|| MCPError::invalid_params("Missing 'name' parameter".to_string()))?;
    if !TOOL_NAMES.contains(&tool_name) {
        return Err(MCPError::invalid_params(format!("Unknown tool: {}", tool_name)));
    }

    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    match call_tool(operations, tool_name, arguments).await {
        Ok(data) => {
            let text = serde_json::to_string_pretty(&data).map_err(|e| {
                MCPError::internal_error(format!("JSON serialization failed: {}", e))
            })?;
            Ok(json!({
                "content": [{ "type": "text", "text": text }],
                "isError": false
            }))
        }
        Err(e) => Ok(json!({
            "content": [{ "type": "text", "text": e.message }],
            "isError": true,
            "error": e.data
        })),
    }
}

fn target_properties() -> Value {
    json!({
        "workspaceId": {
            "type": "string",
            "description": "Workspace id; defaults to the server's configured workspace"
        },
        "docId": {
            "type": "string",
            "description": "Document id"
        }
    })
}

fn placement_schema() -> Value {
    json!({
        "type": "object",
        "description": "At most one of afterBlockId / beforeBlockId / index; parentId may accompany index",
        "properties": {
            "parentId": { "type": "string" },
            "afterBlockId": { "type": "string" },
            "beforeBlockId": { "type": "string" },
            "index": { "type": "integer", "minimum": 0 }
        }
    })
}

fn with_target(mut properties: Value) -> Value {
    if let (Value::Object(props), Value::Object(target)) = (&mut properties, target_properties()) {
        props.extend(target);
    }
    properties
}

/// JSON schemas for every tool
fn get_tool_schemas() -> Value {
    let types: Vec<&str> = BlockType::ALL
        .iter()
        .map(BlockType::as_str)
        .chain(["heading1", "heading2", "heading3", "bulleted_list", "numbered_list", "todo"])
        .collect();

    json!([
        {
            "name": "append_block",
            "description": "Append one block to a document. Without placement the block goes to the end of the document's note.",
            "inputSchema": {
                "type": "object",
                "properties": with_target(json!({
                    "type": { "type": "string", "enum": types, "description": "Canonical block type or legacy alias" },
                    "text": { "type": "string" },
                    "level": { "type": "integer", "minimum": 1, "maximum": 6, "description": "Heading level" },
                    "style": { "type": "string", "enum": ["bulleted", "numbered", "todo"] },
                    "checked": { "type": "boolean", "description": "Todo list items only" },
                    "language": { "type": "string", "description": "Code blocks only" },
                    "caption": { "type": "string" },
                    "url": { "type": "string", "description": "Required for bookmarks" },
                    "bookmarkStyle": { "type": "string", "enum": ["vertical", "horizontal", "list", "cube", "citation"] },
                    "rows": { "type": "integer", "minimum": 1, "maximum": 20 },
                    "columns": { "type": "integer", "minimum": 1, "maximum": 20 },
                    "latex": { "type": "string" },
                    "sourceId": { "type": "string", "description": "Blob id for images and attachments" },
                    "name": { "type": "string" },
                    "mimeType": { "type": "string" },
                    "size": { "type": "integer", "minimum": 0 },
                    "embed": { "type": "boolean" },
                    "strict": { "type": "boolean", "description": "Reject fields that do not apply to the type (default true)" },
                    "placement": placement_schema()
                })),
                "required": ["docId", "type"]
            }
        },
        {
            "name": "append_markdown",
            "description": "Convert Markdown to blocks and append them to a document in one batch",
            "inputSchema": {
                "type": "object",
                "properties": with_target(json!({
                    "markdown": { "type": "string" },
                    "placement": placement_schema()
                })),
                "required": ["docId", "markdown"]
            }
        },
        {
            "name": "import_markdown",
            "description": "Preview the block operations a Markdown document converts to, without writing anything",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "markdown": { "type": "string" }
                },
                "required": ["markdown"]
            }
        },
        {
            "name": "export_markdown",
            "description": "Render a document, or selected block subtrees, as Markdown",
            "inputSchema": {
                "type": "object",
                "properties": with_target(json!({
                    "rootIds": { "type": "array", "items": { "type": "string" } }
                })),
                "required": ["docId"]
            }
        },
        {
            "name": "read_document",
            "description": "Read a document as a flat, depth-first list of blocks plus its plain text",
            "inputSchema": {
                "type": "object",
                "properties": target_properties(),
                "required": ["docId"]
            }
        }
    ])
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;
