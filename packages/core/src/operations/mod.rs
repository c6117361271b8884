//! Block Operations
//!
//! The service layer callers use to mutate and read documents. Each operation
//! fetches one snapshot, runs the synchronous engine in [`crate::blocks`] /
//! [`crate::markdown`] against it, and submits the result as a single delta.

mod block_operations;
mod error;

pub use block_operations::{
    AppendBlockResult, AppendMarkdownResult, BlockOperations, DocTarget, DocumentRead,
};
pub use error::BlockOperationError;
