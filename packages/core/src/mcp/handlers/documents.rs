//! MCP Document Handlers

use crate::mcp::handlers::{parse_params, to_result};
use crate::mcp::types::MCPError;
use crate::operations::{BlockOperations, DocTarget};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Parameters for read_document method
#[derive(Debug, Deserialize)]
pub struct ReadDocumentParams {
    #[serde(flatten)]
    pub target: DocTarget,
}

/// Handle read_document MCP request
///
/// Returns the flattened blocks in document order plus the plain-text projection.
pub async fn handle_read_document(
    operations: &Arc<BlockOperations>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: ReadDocumentParams = parse_params(params)?;
    let read = operations.read_document(&params.target).await?;
    to_result(&read)
}
