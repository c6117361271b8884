//! In-memory DocumentStore
//!
//! Keeps one snapshot per document behind a `tokio::sync::RwLock`. Each delta
//! is applied to a copy of the stored table and swapped in only if every op
//! succeeds.

use crate::models::{DocSnapshot, NodeTable};
use crate::store::{Delta, DeltaAck, DocRef, DocumentStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    docs: RwLock<HashMap<DocRef, DocSnapshot>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, replacing whatever was stored
    pub async fn put_snapshot(&self, doc: DocRef, snapshot: DocSnapshot) {
        self.docs.write().await.insert(doc, snapshot);
    }

    pub async fn document_count(&self) -> usize {
        self.docs.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn fetch_snapshot(&self, doc: &DocRef) -> Result<Option<DocSnapshot>> {
        Ok(self.docs.read().await.get(doc).cloned())
    }

    async fn submit_delta(&self, doc: &DocRef, delta: Delta) -> Result<DeltaAck> {
        let mut docs = self.docs.write().await;
        let current = docs.get(doc);
        let current_version = current.map(|s| s.version).unwrap_or(0);

        if delta.base_version != current_version {
            warn!(
                "Delta for {} was computed against version {} but store is at {}; applying anyway",
                doc, delta.base_version, current_version
            );
        }

        let mut working = current.map(|s| s.blocks.clone()).unwrap_or_else(NodeTable::new);
        delta
            .apply_to(&mut working)
            .with_context(|| format!("Rejected delta for document {}", doc))?;

        let version = current_version + 1;
        docs.insert(doc.clone(), DocSnapshot::new(version, working));
        debug!("Applied {} ops to {} (version {})", delta.ops.len(), doc, version);

        Ok(DeltaAck {
            version,
            applied_ops: delta.ops.len(),
        })
    }
}
