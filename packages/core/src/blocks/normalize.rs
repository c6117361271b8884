//! Type normalization
//!
//! Maps a raw `AppendBlockParams` (canonical type or legacy alias, any case)
//! into a `NormalizedBlock` with every field resolved to its default or
//! clamped value. Field legality is checked separately by `blocks::validate`.

use crate::blocks::validate::MAX_TABLE_DIMENSION;
use crate::models::{AppendBlockParams, BlockType, BookmarkStyle, ListStyle, Placement};
use crate::operations::BlockOperationError;

/// Sub-field implied by a legacy alias
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasImplies {
    Level(u8),
    Style(ListStyle),
}

/// Legacy type names accepted for compatibility
pub const LEGACY_ALIASES: [(&str, BlockType, AliasImplies); 6] = [
    ("heading1", BlockType::Heading, AliasImplies::Level(1)),
    ("heading2", BlockType::Heading, AliasImplies::Level(2)),
    ("heading3", BlockType::Heading, AliasImplies::Level(3)),
    (
        "bulleted_list",
        BlockType::List,
        AliasImplies::Style(ListStyle::Bulleted),
    ),
    (
        "numbered_list",
        BlockType::List,
        AliasImplies::Style(ListStyle::Numbered),
    ),
    ("todo", BlockType::List, AliasImplies::Style(ListStyle::Todo)),
];

pub const DEFAULT_TABLE_DIMENSION: u32 = 3;
pub const DEFAULT_CODE_LANGUAGE: &str = "txt";

/// Canonical names followed by legacy aliases
pub fn accepted_type_names() -> Vec<String> {
    BlockType::ALL
        .iter()
        .map(|t| t.as_str().to_string())
        .chain(LEGACY_ALIASES.iter().map(|(name, _, _)| name.to_string()))
        .collect()
}

/// Resolve a type string to its canonical type and, for aliases, the alias entry
pub fn resolve_type(
    raw: &str,
) -> Result<(BlockType, Option<(&'static str, AliasImplies)>), BlockOperationError> {
    let lowered = raw.trim().to_ascii_lowercase();
    if let Some(canonical) = BlockType::parse(&lowered) {
        return Ok((canonical, None));
    }
    LEGACY_ALIASES
        .iter()
        .find(|(name, _, _)| *name == lowered)
        .map(|(name, canonical, implies)| (*canonical, Some((*name, *implies))))
        .ok_or_else(|| BlockOperationError::unsupported_type(raw, accepted_type_names()))
}

/// Fully resolved block-creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBlock {
    pub block_type: BlockType,
    /// Alias the caller used, kept for diagnostics and the response
    pub legacy_type: Option<String>,
    pub text: String,
    pub level: u8,
    pub style: ListStyle,
    pub checked: bool,
    pub language: String,
    pub caption: Option<String>,
    pub url: Option<String>,
    pub bookmark_style: BookmarkStyle,
    pub rows: u32,
    pub columns: u32,
    pub table_data: Option<Vec<Vec<String>>>,
    pub latex: Option<String>,
    pub source_id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub embed: bool,
    pub placement: Placement,
    pub strict: bool,
}

impl NormalizedBlock {
    /// Canonical request equivalent to this record
    ///
    /// Only fields meaningful for the block type are emitted, so the result
    /// passes strict validation whenever the original request did.
    pub fn to_params(&self) -> AppendBlockParams {
        let mut params = AppendBlockParams::of_type(self.block_type.as_str());
        params.strict = Some(self.strict);
        if !self.placement.is_empty() {
            params.placement = Some(self.placement.clone());
        }
        if !self.text.is_empty() {
            params.text = Some(self.text.clone());
        }
        params.caption = self.caption.clone();

        match self.block_type {
            BlockType::Heading => params.level = Some(f64::from(self.level)),
            BlockType::List => {
                params.style = Some(self.style.as_str().to_string());
                if self.style == ListStyle::Todo {
                    params.checked = Some(self.checked);
                }
            }
            BlockType::Code => params.language = Some(self.language.clone()),
            BlockType::Bookmark => {
                params.url = self.url.clone();
                params.bookmark_style = Some(self.bookmark_style.as_str().to_string());
            }
            BlockType::Table => {
                params.rows = Some(f64::from(self.rows));
                params.columns = Some(f64::from(self.columns));
                params.table_data = self.table_data.clone();
            }
            BlockType::Latex => params.latex = self.latex.clone(),
            BlockType::Image => {
                params.source_id = self.source_id.clone();
                params.size = self.size.map(|s| s as f64);
            }
            BlockType::Attachment => {
                params.source_id = self.source_id.clone();
                params.name = self.name.clone();
                params.mime_type = self.mime_type.clone();
                params.size = self.size.map(|s| s as f64);
                params.embed = Some(self.embed);
            }
            BlockType::Paragraph | BlockType::Quote | BlockType::Divider | BlockType::Callout => {}
        }
        params
    }
}

fn truncate_to_u32(value: f64) -> Option<u32> {
    value
        .is_finite()
        .then(|| value.trunc().clamp(0.0, f64::from(u32::MAX)) as u32)
}

fn truncate_to_u64(value: f64) -> Option<u64> {
    value
        .is_finite()
        .then(|| value.trunc().clamp(0.0, u64::MAX as f64) as u64)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalize a raw request
///
/// `strict_default` applies when the request does not set `strict` itself.
///
/// # Errors
///
/// Returns `UnsupportedType` when the type is neither canonical nor a known alias.
pub fn normalize(
    params: &AppendBlockParams,
    strict_default: bool,
) -> Result<NormalizedBlock, BlockOperationError> {
    let (block_type, alias) = resolve_type(&params.block_type)?;

    let implied_level = match alias {
        Some((_, AliasImplies::Level(level))) => Some(level),
        _ => None,
    };
    let implied_style = match alias {
        Some((_, AliasImplies::Style(style))) => Some(style),
        _ => None,
    };

    let level = params
        .level
        .and_then(truncate_to_u32)
        .map(|l| l.clamp(1, 6) as u8)
        .or(implied_level)
        .unwrap_or(1);

    let style = params
        .style
        .as_deref()
        .and_then(ListStyle::parse)
        .or(implied_style)
        .unwrap_or_default();

    let language = params
        .language
        .as_deref()
        .map(|l| l.trim().to_ascii_lowercase())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_string());

    let dimension = |value: Option<f64>| {
        value
            .and_then(truncate_to_u32)
            .unwrap_or(DEFAULT_TABLE_DIMENSION)
            .clamp(1, MAX_TABLE_DIMENSION)
    };

    Ok(NormalizedBlock {
        block_type,
        legacy_type: alias.map(|(name, _)| name.to_string()),
        text: params.text.clone().unwrap_or_default(),
        level,
        style,
        checked: params.checked.unwrap_or(false),
        language,
        caption: non_empty(&params.caption),
        url: non_empty(&params.url),
        bookmark_style: params
            .bookmark_style
            .as_deref()
            .and_then(BookmarkStyle::parse)
            .unwrap_or_default(),
        rows: dimension(params.rows),
        columns: dimension(params.columns),
        table_data: params.table_data.clone(),
        latex: non_empty(&params.latex),
        source_id: non_empty(&params.source_id),
        name: non_empty(&params.name),
        mime_type: non_empty(&params.mime_type),
        size: params.size.and_then(truncate_to_u64),
        embed: params.embed.unwrap_or(false),
        placement: params.placement.clone().unwrap_or_default(),
        strict: params.strict.unwrap_or(strict_default),
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod normalize_test;
