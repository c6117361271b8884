//! MCP Block Handlers
//!
//! `append_block`: create one block from a canonical or legacy type.

use crate::mcp::handlers::{parse_params, to_result};
use crate::mcp::types::MCPError;
use crate::models::AppendBlockParams;
use crate::operations::{BlockOperations, DocTarget};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Parameters for append_block method
///
/// The document target and the block request share one flat object:
///
/// ```json
/// { "docId": "doc-1", "type": "list", "style": "todo", "text": "Ship it" }
/// ```
#[derive(Debug, Deserialize)]
pub struct AppendBlockRequest {
    #[serde(flatten)]
    pub target: DocTarget,

    #[serde(flatten)]
    pub block: AppendBlockParams,
}

/// Handle append_block MCP request
pub async fn handle_append_block(
    operations: &Arc<BlockOperations>,
    params: Value,
) -> Result<Value, MCPError> {
    let request: AppendBlockRequest = parse_params(params)?;
    let result = operations
        .append_block(&request.target, &request.block)
        .await?;
    to_result(&result)
}

#[cfg(test)]
#[path = "blocks_test.rs"]
mod blocks_test;
