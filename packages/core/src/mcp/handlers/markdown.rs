//! MCP Markdown Handlers
//!
//! - `import_markdown`: parse only, returns the block operations it would create
//! - `append_markdown`: parse and append every block to a document in one batch
//! - `export_markdown`: render a document (or selected subtrees) to Markdown
//!
//! # Examples
//!
//! ```rust,no_run
//! use blockdoc_core::mcp::handlers::markdown::handle_append_markdown;
//! use blockdoc_core::operations::BlockOperations;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example(operations: Arc<BlockOperations>) -> Result<(), Box<dyn std::error::Error>> {
//! let params = json!({
//!     "docId": "doc-1",
//!     "markdown": "# My Document\n\n- [ ] Task 1\n- [x] Task 2"
//! });
//! let result = handle_append_markdown(&operations, params)
//!     .await
//!     .map_err(|e| e.message)?;
//! println!("Created {} blocks", result["appendedCount"]);
//! # Ok(())
//! # }
//! ```

use crate::mcp::handlers::{parse_params, to_result};
use crate::mcp::types::MCPError;
use crate::models::{BlockId, Placement};
use crate::operations::{BlockOperations, DocTarget};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Parameters for import_markdown method
#[derive(Debug, Deserialize)]
pub struct ImportMarkdownParams {
    pub markdown: String,
}

/// Parameters for append_markdown method
#[derive(Debug, Deserialize)]
pub struct AppendMarkdownParams {
    #[serde(flatten)]
    pub target: DocTarget,

    pub markdown: String,

    /// Where the first imported block goes; the rest follow it in order
    #[serde(default)]
    pub placement: Option<Placement>,
}

/// Parameters for export_markdown method
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMarkdownParams {
    #[serde(flatten)]
    pub target: DocTarget,

    /// Subtrees to render; the whole page when omitted
    #[serde(default)]
    pub root_ids: Option<Vec<BlockId>>,
}

/// Handle import_markdown MCP request
pub fn handle_import_markdown(
    operations: &Arc<BlockOperations>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: ImportMarkdownParams = parse_params(params)?;
    let import = operations.import_markdown(&params.markdown)?;
    to_result(&import)
}

/// Handle append_markdown MCP request
pub async fn handle_append_markdown(
    operations: &Arc<BlockOperations>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: AppendMarkdownParams = parse_params(params)?;
    let result = operations
        .append_markdown(&params.target, &params.markdown, params.placement)
        .await?;
    to_result(&result)
}

/// Handle export_markdown MCP request
pub async fn handle_export_markdown(
    operations: &Arc<BlockOperations>,
    params: Value,
) -> Result<Value, MCPError> {
    let params: ExportMarkdownParams = parse_params(params)?;
    let export = operations
        .export_markdown(&params.target, params.root_ids)
        .await?;
    to_result(&export)
}

#[cfg(test)]
#[path = "markdown_test.rs"]
mod markdown_test;
