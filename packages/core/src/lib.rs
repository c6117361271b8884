//! Blockdoc Core - Block Tree Mutation & Markdown Interchange
//!
//! This crate builds, mutates, reads and converts documents stored as block
//! trees in a collaborative document store.
//!
//! # Architecture
//!
//! - **Arena Tree**: A document is a flat id → node table; parents and children
//!   reference each other by id
//! - **Snapshot In, Delta Out**: Operations read one snapshot from a
//!   [`store::DocumentStore`] and submit one incremental delta
//! - **Traceable Loss**: Markdown conversion never fails on content; anything it
//!   cannot carry is reported as a warning and flags the result `lossy`
//!
//! # Modules
//!
//! - [`models`] - Block nodes, rich text, node table, request types
//! - [`blocks`] - Normalizer, validator, placement resolver, builder, tree reader
//! - [`markdown`] - Markdown import and export
//! - [`store`] - Document store boundary and in-memory implementation
//! - [`operations`] - `BlockOperations` service and error taxonomy
//! - [`config`] - Engine configuration
//! - [`mcp`] - MCP stdio server for AI agent integration

pub mod blocks;
pub mod config;
pub mod markdown;
pub mod mcp;
pub mod models;
pub mod operations;
pub mod store;

// Re-export commonly used types
pub use config::EngineConfig;
pub use models::*;
pub use operations::{BlockOperationError, BlockOperations, DocTarget};
pub use store::{DocRef, DocumentStore, InMemoryDocumentStore};
