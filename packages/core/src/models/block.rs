//! Block Node Data Structures
//!
//! This module defines the `BlockNode` struct and the closed `Flavour`
//! enumeration that together describe one node of a document's block tree.
//!
//! # Architecture
//!
//! - **Arena Model**: Nodes reference their parent and children by id only;
//!   the owning [`NodeTable`](crate::models::NodeTable) is the single source of truth
//! - **Flavour-Determined Schema**: Each flavour declares the property keys it may
//!   carry; `BlockNode::validate` rejects anything else
//! - **Immutable Identity**: `id` is assigned once at creation and never changes
//!
//! # Examples
//!
//! ```rust
//! use blockdoc_core::models::{BlockNode, Flavour, RichText};
//! use serde_json::json;
//!
//! let code = BlockNode::new(Flavour::Code)
//!     .with_text(RichText::plain("fn main() {}"))
//!     .with_prop("language", json!("rust"));
//!
//! assert_eq!(code.prop_str("language"), Some("rust"));
//! assert!(code.validate().is_ok());
//! ```

use crate::models::RichText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Opaque block identifier, unique within a document
pub type BlockId = String;

/// Validation errors for block nodes and node tables
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Property '{key}' is not part of the '{flavour}' schema")]
    UnexpectedProperty { flavour: String, key: String },

    #[error("Flavour '{0}' does not carry text")]
    UnexpectedText(String),

    #[error("Block '{0}' cannot be its own child")]
    SelfReference(String),

    #[error("Block '{parent_id}' references missing child '{child_id}'")]
    DanglingChild { parent_id: String, child_id: String },

    #[error("Block '{0}' does not exist")]
    UnknownBlock(String),

    #[error("Block '{0}' already exists")]
    DuplicateBlock(String),
}

/// Read-only embed kinds that can appear in imported documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedKind {
    Github,
    Youtube,
    Figma,
    LinkedDoc,
    SyncedDoc,
    Html,
    Loom,
}

impl EmbedKind {
    const ALL: [EmbedKind; 7] = [
        EmbedKind::Github,
        EmbedKind::Youtube,
        EmbedKind::Figma,
        EmbedKind::LinkedDoc,
        EmbedKind::SyncedDoc,
        EmbedKind::Html,
        EmbedKind::Loom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedKind::Github => "embed-github",
            EmbedKind::Youtube => "embed-youtube",
            EmbedKind::Figma => "embed-figma",
            EmbedKind::LinkedDoc => "embed-linked-doc",
            EmbedKind::SyncedDoc => "embed-synced-doc",
            EmbedKind::Html => "embed-html",
            EmbedKind::Loom => "embed-loom",
        }
    }
}

/// Rendering/semantic kind of a block
///
/// Flavours are a closed set. Unknown names read from a snapshot are kept
/// verbatim in `Unknown` so readers and renderers can report them instead of
/// failing to deserialize the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Flavour {
    Page,
    Surface,
    Note,
    Paragraph,
    List,
    Code,
    Divider,
    Callout,
    Latex,
    Table,
    Bookmark,
    Image,
    Attachment,
    Embed(EmbedKind),
    Unknown(String),
}

impl Flavour {
    pub fn as_str(&self) -> &str {
        match self {
            Flavour::Page => "page",
            Flavour::Surface => "surface",
            Flavour::Note => "note",
            Flavour::Paragraph => "paragraph",
            Flavour::List => "list",
            Flavour::Code => "code",
            Flavour::Divider => "divider",
            Flavour::Callout => "callout",
            Flavour::Latex => "latex",
            Flavour::Table => "table",
            Flavour::Bookmark => "bookmark",
            Flavour::Image => "image",
            Flavour::Attachment => "attachment",
            Flavour::Embed(kind) => kind.as_str(),
            Flavour::Unknown(name) => name,
        }
    }

    /// Page, surface and note hold other blocks rather than content of their own
    pub fn is_container(&self) -> bool {
        matches!(self, Flavour::Page | Flavour::Surface | Flavour::Note)
    }

    /// Page and surface are document roots; ordinary content never lives directly under them
    pub fn is_structural_root(&self) -> bool {
        matches!(self, Flavour::Page | Flavour::Surface)
    }

    pub fn carries_text(&self) -> bool {
        matches!(
            self,
            Flavour::Paragraph | Flavour::List | Flavour::Code | Flavour::Callout
        )
    }

    /// Property keys a block of this flavour may carry
    ///
    /// Returns `None` for unknown flavours, whose schema this crate cannot know.
    pub fn schema_fields(&self) -> Option<&'static [&'static str]> {
        let fields: &'static [&'static str] = match self {
            Flavour::Page => &["title"],
            Flavour::Surface => &[],
            Flavour::Note => &["displayMode", "index"],
            Flavour::Paragraph => &[],
            Flavour::List => &["checked"],
            Flavour::Code => &["language", "caption"],
            Flavour::Divider => &[],
            Flavour::Callout => &["emoji"],
            Flavour::Latex => &["latex"],
            Flavour::Table => &["rows", "columns", "cells"],
            Flavour::Bookmark => &["url", "style", "caption"],
            Flavour::Image => &["sourceId", "caption", "size"],
            Flavour::Attachment => &["sourceId", "name", "mimeType", "size", "embed", "caption"],
            Flavour::Embed(_) => &["url", "caption", "title", "style"],
            Flavour::Unknown(_) => return None,
        };
        Some(fields)
    }
}

impl From<String> for Flavour {
    fn from(value: String) -> Self {
        match value.as_str() {
            "page" => Flavour::Page,
            "surface" => Flavour::Surface,
            "note" => Flavour::Note,
            "paragraph" => Flavour::Paragraph,
            "list" => Flavour::List,
            "code" => Flavour::Code,
            "divider" => Flavour::Divider,
            "callout" => Flavour::Callout,
            "latex" => Flavour::Latex,
            "table" => Flavour::Table,
            "bookmark" => Flavour::Bookmark,
            "image" => Flavour::Image,
            "attachment" => Flavour::Attachment,
            other => EmbedKind::ALL
                .iter()
                .find(|kind| kind.as_str() == other)
                .map(|kind| Flavour::Embed(*kind))
                .unwrap_or(Flavour::Unknown(value)),
        }
    }
}

impl From<&str> for Flavour {
    fn from(value: &str) -> Self {
        Flavour::from(value.to_string())
    }
}

impl From<Flavour> for String {
    fn from(value: Flavour) -> Self {
        match value {
            Flavour::Unknown(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a document's block tree.
///
/// # Fields
///
/// - `id`: Unique identifier (UUID for blocks created by this crate)
/// - `parent_id`: Owning block, `None` for roots (page)
/// - `flavour`: Rendering/semantic kind
/// - `block_type`: Flavour-dependent discriminator (`h1`..`h6`, `text`, `quote`,
///   `bulleted`, `numbered`, `todo`), serialized as `type`
/// - `text`: Inline-formatted runs, absent for structural flavours
/// - `children`: Ordered child ids; order is significant
/// - `props`: Flavour-specific properties, restricted to `Flavour::schema_fields`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockNode {
    pub id: BlockId,

    #[serde(default)]
    pub parent_id: Option<BlockId>,

    pub flavour: Flavour,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<RichText>,

    #[serde(default)]
    pub children: Vec<BlockId>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
}

impl BlockNode {
    /// Create a detached block with a freshly generated UUID
    pub fn new(flavour: Flavour) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), flavour)
    }

    /// Create a detached block with an explicit id (tests, snapshots from the store)
    pub fn with_id(id: impl Into<BlockId>, flavour: Flavour) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            flavour,
            block_type: None,
            text: None,
            children: Vec::new(),
            props: Map::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<BlockId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_type(mut self, block_type: impl Into<String>) -> Self {
        self.block_type = Some(block_type.into());
        self
    }

    pub fn with_text(mut self, text: RichText) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_prop(mut self, key: &str, value: Value) -> Self {
        self.props.insert(key.to_string(), value);
        self
    }

    pub fn with_children(mut self, children: Vec<BlockId>) -> Self {
        self.children = children;
        self
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn prop_bool(&self, key: &str) -> Option<bool> {
        self.props.get(key).and_then(Value::as_bool)
    }

    pub fn prop_u64(&self, key: &str) -> Option<u64> {
        self.props.get(key).and_then(Value::as_u64)
    }

    /// Plain-text projection of `text` (empty when the block has none)
    pub fn plain_text(&self) -> String {
        self.text
            .as_ref()
            .map(RichText::to_plain_string)
            .unwrap_or_default()
    }

    /// Heading level encoded in `type` (`h1`..`h6`) for paragraph blocks
    pub fn heading_level(&self) -> Option<u8> {
        if self.flavour != Flavour::Paragraph {
            return None;
        }
        let level = self.block_type.as_deref()?.strip_prefix('h')?;
        level.parse::<u8>().ok().filter(|l| (1..=6).contains(l))
    }

    /// Validate structural rules that can be checked on a single node
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` is empty
    /// - a property key is outside the flavour schema
    /// - a structural flavour (divider, table, image, attachment) carries text
    /// - the node lists itself as a child or parent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if let Some(fields) = self.flavour.schema_fields() {
            if let Some(key) = self.props.keys().find(|k| !fields.contains(&k.as_str())) {
                return Err(ValidationError::UnexpectedProperty {
                    flavour: self.flavour.to_string(),
                    key: key.clone(),
                });
            }
        }

        let structural = matches!(
            self.flavour,
            Flavour::Divider | Flavour::Table | Flavour::Image | Flavour::Attachment
        );
        if structural && self.text.as_ref().is_some_and(|t| !t.is_empty()) {
            return Err(ValidationError::UnexpectedText(self.flavour.to_string()));
        }

        if self.children.iter().any(|c| c == &self.id) || self.parent_id.as_ref() == Some(&self.id)
        {
            return Err(ValidationError::SelfReference(self.id.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "block_test.rs"]
mod block_test;
