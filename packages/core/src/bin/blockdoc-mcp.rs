//! Blockdoc MCP Server
//!
//! Serves block operations over JSON-RPC on stdin/stdout, backed by an
//! in-memory document store. Logs go to stderr so stdout stays the protocol
//! channel.
//!
//! # Usage
//!
//! ```bash
//! BLOCKDOC_WORKSPACE_ID=ws-1 cargo run --bin blockdoc-mcp
//! ```
//!
//! # Configuration
//!
//! - `BLOCKDOC_WORKSPACE_ID` - default workspace for requests that omit one
//! - `BLOCKDOC_STRICT` - strict field validation by default (`true`)
//! - `BLOCKDOC_MAX_MARKDOWN_BYTES` - Markdown size limit (1000000)
//! - `BLOCKDOC_MAX_BLOCKS_PER_IMPORT` - blocks per Markdown import (1000)
//! - `RUST_LOG` - log filter (`blockdoc_core=info`)

use blockdoc_core::config::EngineConfig;
use blockdoc_core::mcp;
use blockdoc_core::operations::BlockOperations;
use blockdoc_core::store::InMemoryDocumentStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("blockdoc_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    tracing::info!(
        "Starting blockdoc-mcp (default workspace: {}, strict: {})",
        config.default_workspace_id.as_deref().unwrap_or("<none>"),
        config.strict_by_default
    );

    let store = Arc::new(InMemoryDocumentStore::new());
    let operations = Arc::new(BlockOperations::new(store, config));

    mcp::run_mcp_server(operations).await
}
