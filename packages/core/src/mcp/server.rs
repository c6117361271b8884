//! MCP stdio Server
//!
//! Async Tokio task that handles JSON-RPC 2.0 requests, one per line, and
//! writes one response per line. Notifications (no `id`) are never answered.

use crate::mcp::handlers::{blocks, documents, initialize, markdown, tools};
use crate::mcp::types::{MCPError, MCPNotification, MCPRequest, MCPResponse};
use crate::operations::BlockOperations;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, instrument, warn};

/// Run the MCP server on stdin/stdout until stdin is closed
#[instrument(skip(operations))]
pub async fn run_mcp_server(operations: Arc<BlockOperations>) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(operations, reader, writer).await
}

/// Serve requests from any line-oriented reader
///
/// Returns Ok(()) at EOF, or Err when the writer fails.
pub async fn serve<R, W>(
    operations: Arc<BlockOperations>,
    reader: R,
    mut writer: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("MCP server started");
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("MCP request: {}", line);

        let request: MCPRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                if let Ok(notification) = serde_json::from_str::<MCPNotification>(&line) {
                    debug!("MCP notification '{}' ignored", notification.method);
                    continue;
                }
                warn!("Failed to parse JSON-RPC request: {}", e);
                let error_response =
                    MCPResponse::error(0, MCPError::parse_error(format!("Invalid JSON: {}", e)));
                write_response(&mut writer, &error_response).await?;
                continue;
            }
        };

        let response = handle_request(&operations, request).await;
        write_response(&mut writer, &response).await?;
    }

    info!("MCP server stopped (input closed)");
    Ok(())
}

/// Handle a JSON-RPC request and return a response
#[instrument(skip(operations, request), fields(method = %request.method, id = %request.id))]
pub async fn handle_request(operations: &Arc<BlockOperations>, request: MCPRequest) -> MCPResponse {
    let params = request.params;
    let result = match request.method.as_str() {
        "initialize" => initialize::handle_initialize(params),
        "ping" => Ok(serde_json::json!({})),
        "tools/list" => tools::handle_tools_list(params),
        "tools/call" => tools::handle_tools_call(operations, params).await,
        "append_block" => blocks::handle_append_block(operations, params).await,
        "append_markdown" => markdown::handle_append_markdown(operations, params).await,
        "import_markdown" => markdown::handle_import_markdown(operations, params),
        "export_markdown" => markdown::handle_export_markdown(operations, params).await,
        "read_document" => documents::handle_read_document(operations, params).await,
        _ => {
            warn!("Unknown MCP method: {}", request.method);
            Err(MCPError::method_not_found(&request.method))
        }
    };

    match result {
        Ok(result) => {
            debug!("MCP request {} succeeded", request.id);
            MCPResponse::success(request.id, result)
        }
        Err(error) => {
            error!(
                "MCP request {} failed: {} (code: {})",
                request.id, error.message, error.code
            );
            MCPResponse::error(request.id, error)
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &MCPResponse,
) -> anyhow::Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
