//! Block-Creation Request Types
//!
//! `AppendBlockParams` is the raw, caller-facing request record. It is what the
//! `append_block` operation receives and also what the Markdown importer emits
//! for each block it recognizes. Numeric fields are kept as `f64` so integrality
//! can be reported as a field error instead of a deserialization failure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical block types accepted by `append_block`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Paragraph,
    Heading,
    Quote,
    List,
    Code,
    Divider,
    Callout,
    Latex,
    Table,
    Bookmark,
    Image,
    Attachment,
}

impl BlockType {
    pub const ALL: [BlockType; 12] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::Quote,
        BlockType::List,
        BlockType::Code,
        BlockType::Divider,
        BlockType::Callout,
        BlockType::Latex,
        BlockType::Table,
        BlockType::Bookmark,
        BlockType::Image,
        BlockType::Attachment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::Quote => "quote",
            BlockType::List => "list",
            BlockType::Code => "code",
            BlockType::Divider => "divider",
            BlockType::Callout => "callout",
            BlockType::Latex => "latex",
            BlockType::Table => "table",
            BlockType::Bookmark => "bookmark",
            BlockType::Image => "image",
            BlockType::Attachment => "attachment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        BlockType::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// List item style, stored as the list block's `type`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    #[default]
    Bulleted,
    Numbered,
    Todo,
}

impl ListStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListStyle::Bulleted => "bulleted",
            ListStyle::Numbered => "numbered",
            ListStyle::Todo => "todo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bulleted" => Some(ListStyle::Bulleted),
            "numbered" => Some(ListStyle::Numbered),
            "todo" => Some(ListStyle::Todo),
            _ => None,
        }
    }
}

/// Bookmark card style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkStyle {
    Vertical,
    #[default]
    Horizontal,
    List,
    Cube,
    Citation,
}

impl BookmarkStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkStyle::Vertical => "vertical",
            BookmarkStyle::Horizontal => "horizontal",
            BookmarkStyle::List => "list",
            BookmarkStyle::Cube => "cube",
            BookmarkStyle::Citation => "citation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vertical" => Some(BookmarkStyle::Vertical),
            "horizontal" => Some(BookmarkStyle::Horizontal),
            "list" => Some(BookmarkStyle::List),
            "cube" => Some(BookmarkStyle::Cube),
            "citation" => Some(BookmarkStyle::Citation),
            _ => None,
        }
    }
}

/// Where a new block goes
///
/// At most one of `after_block_id` / `before_block_id` / `index` may be set;
/// `parent_id` may accompany `index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_block_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_block_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

impl Placement {
    pub fn under(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Default::default()
        }
    }

    pub fn after(block_id: impl Into<String>) -> Self {
        Self {
            after_block_id: Some(block_id.into()),
            ..Default::default()
        }
    }

    pub fn before(block_id: impl Into<String>) -> Self {
        Self {
            before_block_id: Some(block_id.into()),
            ..Default::default()
        }
    }

    pub fn at_index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Placement::default()
    }
}

/// Raw block-creation request
///
/// # Example
///
/// ```json
/// {
///     "type": "heading2",
///     "text": "Intro",
///     "placement": { "afterBlockId": "abc" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendBlockParams {
    /// Canonical type or legacy alias, case-insensitive
    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark_style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<f64>,

    /// Cell text grid, row-major; first row is the header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<Vec<Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<bool>,

    /// Strict field validation; `None` defers to the engine configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl AppendBlockParams {
    pub fn of_type(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(f64::from(level));
        self
    }

    pub fn with_style(mut self, style: ListStyle) -> Self {
        self.style = Some(style.as_str().to_string());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_table(mut self, data: Vec<Vec<String>>) -> Self {
        self.rows = Some(data.len() as f64);
        self.columns = Some(data.iter().map(Vec::len).max().unwrap_or(0) as f64);
        self.table_data = Some(data);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }
}
