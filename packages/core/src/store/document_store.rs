//! DocumentStore Trait - Collaboration Backend Boundary
//!
//! The engine never talks to the network or the CRDT layer directly. It reads
//! a materialized snapshot and hands back an incremental delta through this
//! trait; transport, merge and persistence belong to the implementation.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: Implementations talk to a remote backend
//! 2. **Opaque Failures**: Errors are `anyhow::Error` and pass through the
//!    engine unchanged
//! 3. **Incremental Writes**: `submit_delta` receives only the changes made
//!    since the snapshot at `Delta::base_version`

use crate::models::DocSnapshot;
use crate::store::{Delta, DeltaAck};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified document address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRef {
    pub workspace_id: String,
    pub doc_id: String,
}

impl DocRef {
    pub fn new(workspace_id: impl Into<String>, doc_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            doc_id: doc_id.into(),
        }
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace_id, self.doc_id)
    }
}

/// Abstraction over the collaborative document backend
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one store is shared by every
/// concurrent request.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the current materialized tree
    ///
    /// Returns `Ok(None)` when the document has no content yet.
    async fn fetch_snapshot(&self, doc: &DocRef) -> Result<Option<DocSnapshot>>;

    /// Submit an incremental delta
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the delta (for example because it
    /// references blocks that do not exist) or cannot be reached.
    async fn submit_delta(&self, doc: &DocRef, delta: Delta) -> Result<DeltaAck>;
}
