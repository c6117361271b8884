//! Markdown Interchange
//!
//! - [`import_markdown`] - Markdown text to ordered block-creation operations
//! - [`export_markdown`] - block subtrees to Markdown text
//!
//! Both directions are best-effort: anything that cannot be carried across
//! is reported in `warnings` and flips `lossy`.

pub mod import;
pub mod render;

pub use import::{import_markdown, ImportStats, MarkdownImport};
pub use render::{export_markdown, MarkdownExport, RenderStats};
