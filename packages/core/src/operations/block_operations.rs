//! BlockOperations Service
//!
//! Orchestrates normalize → validate → place → build for single blocks and
//! for whole Markdown documents, against a [`DocumentStore`].
//!
//! # Atomicity
//!
//! Every mutating call stages all of its changes (lazily created containers
//! included) on one [`Mutation`] before anything is submitted. Any error while
//! staging drops the mutation, so the store sees either the whole batch or
//! nothing.

use crate::blocks::{
    normalize, read_tree, resolve_placement, stage_block, validate, BuiltBlock, TreeRead,
};
use crate::config::EngineConfig;
use crate::markdown::{self, ImportStats, MarkdownExport, MarkdownImport};
use crate::models::{AppendBlockParams, BlockId, DocSnapshot, Placement};
use crate::operations::BlockOperationError;
use crate::store::{DocRef, DocumentStore, Mutation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Document addressed by a request
///
/// `workspace_id` may be omitted when the engine has a configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
}

impl DocTarget {
    pub fn doc(doc_id: impl Into<String>) -> Self {
        Self {
            workspace_id: None,
            doc_id: Some(doc_id.into()),
        }
    }

    pub fn in_workspace(workspace_id: impl Into<String>, doc_id: impl Into<String>) -> Self {
        Self {
            workspace_id: Some(workspace_id.into()),
            doc_id: Some(doc_id.into()),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Result of `append_block`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendBlockResult {
    pub appended: bool,
    pub block_id: BlockId,
    pub flavour: String,
    /// Stored discriminator (`h2`, `todo`, `text`, ...), absent for flavours without one
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    pub normalized_type: String,
    /// Legacy alias the caller used, `null` for canonical types
    pub legacy_type: Option<String>,
    pub parent_id: BlockId,
    pub index: usize,
    /// Containers created alongside the block (note, or the whole skeleton)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_containers: Vec<BlockId>,
    /// Store version after the write
    pub version: u64,
}

/// Result of `append_markdown`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendMarkdownResult {
    pub appended_count: usize,
    pub block_ids: Vec<BlockId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_containers: Vec<BlockId>,
    pub warnings: Vec<String>,
    pub lossy: bool,
    pub stats: ImportStats,
    /// Store version after the write; unchanged when nothing was imported
    pub version: u64,
}

/// Result of `read_document`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRead {
    pub workspace_id: String,
    pub doc_id: String,
    /// False when the store has no content for the document yet
    pub exists: bool,
    pub version: u64,
    #[serde(flatten)]
    pub tree: TreeRead,
}

/// Block mutation and Markdown interchange over a document store
pub struct BlockOperations {
    store: Arc<dyn DocumentStore>,
    config: EngineConfig,
}

impl BlockOperations {
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a request target against the configured default workspace
    ///
    /// # Errors
    ///
    /// `MissingRequiredWorkspaceOrDoc` when the doc id is missing, or the
    /// workspace id is missing and no default is configured.
    pub fn resolve_target(&self, target: &DocTarget) -> Result<DocRef, BlockOperationError> {
        let doc_id = present(target.doc_id.as_deref())
            .ok_or_else(|| BlockOperationError::missing_required("docId"))?;
        let workspace_id = present(target.workspace_id.as_deref())
            .or_else(|| present(self.config.default_workspace_id.as_deref()))
            .ok_or_else(|| {
                BlockOperationError::missing_required(
                    "workspaceId (no default workspace configured)",
                )
            })?;
        Ok(DocRef::new(workspace_id, doc_id))
    }

    async fn fetch(&self, doc: &DocRef) -> Result<Option<DocSnapshot>, BlockOperationError> {
        let snapshot = self.store.fetch_snapshot(doc).await?;
        match &snapshot {
            Some(s) => debug!("Fetched {} at version {} ({} blocks)", doc, s.version, s.blocks.len()),
            None => debug!("Document {} is empty", doc),
        }
        Ok(snapshot)
    }

    fn parse_markdown(
        &self,
        markdown: &str,
        context: &str,
    ) -> Result<MarkdownImport, BlockOperationError> {
        if markdown.len() > self.config.max_markdown_bytes {
            return Err(BlockOperationError::invalid_field(
                "markdown",
                context,
                format!(
                    "input is {} bytes; the limit is {}",
                    markdown.len(),
                    self.config.max_markdown_bytes
                ),
            ));
        }
        Ok(markdown::import_markdown(markdown))
    }

    /// Create one block
    ///
    /// # Errors
    ///
    /// Every `BlockOperationError` caller variant; `Store` when the fetch or
    /// submit fails.
    #[instrument(skip(self, params), fields(block_type = %params.block_type))]
    pub async fn append_block(
        &self,
        target: &DocTarget,
        params: &AppendBlockParams,
    ) -> Result<AppendBlockResult, BlockOperationError> {
        let doc = self.resolve_target(target)?;
        let block = normalize(params, self.config.strict_by_default)?;
        validate(&block, params)?;

        let snapshot = self.fetch(&doc).await?;
        let mut mutation = Mutation::new(snapshot.as_ref());
        let placement = resolve_placement(mutation.table(), &block.placement, block.strict)?;
        let built = stage_block(&mut mutation, &block, placement)?;

        let ack = self.store.submit_delta(&doc, mutation.into_delta()).await?;
        debug!(
            "Appended {} block {} under {} at index {}",
            block.block_type, built.block_id, built.parent_id, built.index
        );

        let BuiltBlock {
            block_id,
            flavour,
            block_type,
            parent_id,
            index,
            created_containers,
        } = built;
        Ok(AppendBlockResult {
            appended: true,
            block_id,
            flavour: flavour.to_string(),
            block_type,
            normalized_type: block.block_type.to_string(),
            legacy_type: block.legacy_type,
            parent_id,
            index,
            created_containers,
            version: ack.version,
        })
    }

    /// Import Markdown and append every resulting block in document order
    ///
    /// The first block goes to `placement` (default: end of the page's note);
    /// each following block goes right after the previous one. Fields are
    /// applied leniently, so Markdown never fails on field legality.
    #[instrument(skip(self, markdown, placement), fields(bytes = markdown.len()))]
    pub async fn append_markdown(
        &self,
        target: &DocTarget,
        markdown: &str,
        placement: Option<Placement>,
    ) -> Result<AppendMarkdownResult, BlockOperationError> {
        let doc = self.resolve_target(target)?;
        let import = self.parse_markdown(markdown, "append_markdown")?;
        if import.operations.len() > self.config.max_blocks_per_import {
            return Err(BlockOperationError::invalid_field(
                "markdown",
                "append_markdown",
                format!(
                    "produces {} blocks; the limit is {}",
                    import.operations.len(),
                    self.config.max_blocks_per_import
                ),
            ));
        }

        let snapshot = self.fetch(&doc).await?;
        let base_version = snapshot.as_ref().map_or(0, |s| s.version);
        let mut mutation = Mutation::new(snapshot.as_ref());
        let mut next_placement = placement.unwrap_or_default();
        let mut block_ids = Vec::with_capacity(import.operations.len());
        let mut created_containers = Vec::new();

        for op in &import.operations {
            let params = AppendBlockParams {
                strict: Some(false),
                placement: Some(next_placement),
                ..op.clone()
            };
            let block = normalize(&params, false)?;
            let resolved = resolve_placement(mutation.table(), &block.placement, false)?;
            let built = stage_block(&mut mutation, &block, resolved)?;

            next_placement = Placement::after(built.block_id.as_str());
            created_containers.extend(built.created_containers);
            block_ids.push(built.block_id);
        }

        let version = if mutation.is_empty() {
            base_version
        } else {
            self.store.submit_delta(&doc, mutation.into_delta()).await?.version
        };

        if import.lossy {
            warn!(
                "Markdown import into {} was lossy ({} warnings)",
                doc,
                import.warnings.len()
            );
        }
        debug!("Appended {} blocks from Markdown to {}", block_ids.len(), doc);

        Ok(AppendMarkdownResult {
            appended_count: block_ids.len(),
            block_ids,
            created_containers,
            warnings: import.warnings,
            lossy: import.lossy,
            stats: import.stats,
            version,
        })
    }

    /// Flatten a document for reading
    #[instrument(skip(self))]
    pub async fn read_document(
        &self,
        target: &DocTarget,
    ) -> Result<DocumentRead, BlockOperationError> {
        let doc = self.resolve_target(target)?;
        let snapshot = self.fetch(&doc).await?;
        let (exists, version, tree) = match &snapshot {
            Some(s) => (true, s.version, read_tree(&s.blocks)),
            None => (false, 0, TreeRead::default()),
        };
        if tree.unsupported > 0 {
            warn!("{} references {} missing blocks", doc, tree.unsupported);
        }
        Ok(DocumentRead {
            workspace_id: doc.workspace_id,
            doc_id: doc.doc_id,
            exists,
            version,
            tree,
        })
    }

    /// Render a document, or the subtrees under `root_ids`, as Markdown
    ///
    /// Without `root_ids` the page's children are rendered (the first note
    /// when there is no page).
    #[instrument(skip(self, root_ids))]
    pub async fn export_markdown(
        &self,
        target: &DocTarget,
        root_ids: Option<Vec<BlockId>>,
    ) -> Result<MarkdownExport, BlockOperationError> {
        let doc = self.resolve_target(target)?;
        let Some(snapshot) = self.fetch(&doc).await? else {
            return Ok(MarkdownExport::default());
        };

        let roots = match root_ids.filter(|ids| !ids.is_empty()) {
            Some(ids) => ids,
            None => match snapshot.blocks.page() {
                Some(page) => page.children.clone(),
                None => crate::blocks::reader::default_root(&snapshot.blocks)
                    .map(|n| vec![n.id.clone()])
                    .unwrap_or_default(),
            },
        };

        let export = markdown::export_markdown(&snapshot.blocks, &roots);
        if export.lossy {
            warn!(
                "Markdown export of {} was lossy ({} warnings)",
                doc,
                export.warnings.len()
            );
        }
        Ok(export)
    }

    /// Parse Markdown into block-creation operations without touching the store
    pub fn import_markdown(&self, markdown: &str) -> Result<MarkdownImport, BlockOperationError> {
        self.parse_markdown(markdown, "import_markdown")
    }
}

#[cfg(test)]
#[path = "block_operations_test.rs"]
mod block_operations_test;
