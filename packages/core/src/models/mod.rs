//! Data Models
//!
//! This module contains the block-tree data structures used throughout Blockdoc:
//!
//! - `BlockNode` / `Flavour` - One node of a document tree and its closed kind
//! - `RichText` - Inline-formatted text runs
//! - `NodeTable` / `DocSnapshot` - Arena of nodes keyed by id, plus the store version
//! - `AppendBlockParams` / `Placement` - Raw block-creation requests
//!
//! Parent/child links are ids into the owning `NodeTable`; nodes never hold
//! references to each other.

mod block;
mod document;
mod request;
mod text;

pub use block::{BlockId, BlockNode, EmbedKind, Flavour, ValidationError};
pub use document::{DocSnapshot, NodeTable};
pub use request::{AppendBlockParams, BlockType, BookmarkStyle, ListStyle, Placement};
pub use text::{RichText, TextAttributes, TextRun};
