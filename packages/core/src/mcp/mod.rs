//! Model Context Protocol (MCP) Integration
//!
//! JSON-RPC 2.0 over stdio giving AI agents access to block operations.
//!
//! # Usage
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "method": "append_block",
//!   "params": {
//!     "docId": "doc-1",
//!     "type": "heading2",
//!     "text": "Intro"
//!   }
//! }
//! ```
//!
//! Methods: `initialize`, `tools/list`, `tools/call`, `append_block`,
//! `append_markdown`, `import_markdown`, `export_markdown`, `read_document`.

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{handle_request, run_mcp_server, serve};
pub use types::{MCPError, MCPRequest, MCPResponse};
