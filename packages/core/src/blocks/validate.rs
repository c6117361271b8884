//! Strict-mode field validation
//!
//! Checks the raw request against the normalized record. Rules run in a fixed
//! order and the first violation is returned. In lenient mode nothing is
//! checked here; the builder simply ignores fields the block type does not use.

use crate::blocks::normalize::{resolve_type, AliasImplies, NormalizedBlock};
use crate::models::{AppendBlockParams, BlockType, BookmarkStyle, ListStyle};
use crate::operations::BlockOperationError;
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_TABLE_DIMENSION: u32 = 20;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$").unwrap())
}

/// `scheme:rest` with no whitespace
pub fn is_url(value: &str) -> bool {
    url_pattern().is_match(value.trim())
}

struct Rules<'a> {
    block: &'a NormalizedBlock,
    raw: &'a AppendBlockParams,
}

impl Rules<'_> {
    fn context(&self) -> String {
        match &self.block.legacy_type {
            Some(alias) => format!("{} ({alias})", self.block.block_type),
            None => self.block.block_type.to_string(),
        }
    }

    fn fail(&self, field: &str, reason: impl Into<String>) -> Result<(), BlockOperationError> {
        Err(BlockOperationError::invalid_field(field, self.context(), reason))
    }

    fn alias_implies(&self) -> Option<(&'static str, AliasImplies)> {
        let alias = self.block.legacy_type.as_deref()?;
        resolve_type(alias).ok()?.1
    }

    fn is(&self, types: &[BlockType]) -> bool {
        types.contains(&self.block.block_type)
    }

    /// Reject `field` when present on any type outside `allowed`
    fn only_on(
        &self,
        field: &str,
        present: bool,
        allowed: &[BlockType],
    ) -> Result<(), BlockOperationError> {
        if present && !self.is(allowed) {
            let names: Vec<&str> = allowed.iter().map(BlockType::as_str).collect();
            return self.fail(field, format!("only valid for {}", names.join(", ")));
        }
        Ok(())
    }

    fn required(&self, field: &str, value: &Option<String>) -> Result<(), BlockOperationError> {
        if value.is_none() {
            return self.fail(field, "is required and must be non-empty");
        }
        Ok(())
    }

    fn integer_in(
        &self,
        field: &str,
        value: Option<f64>,
        min: f64,
        max: f64,
    ) -> Result<(), BlockOperationError> {
        if let Some(v) = value {
            if !v.is_finite() || v.fract() != 0.0 || v < min || v > max {
                return self.fail(field, format!("must be an integer between {min} and {max}"));
            }
        }
        Ok(())
    }

    fn heading(&self) -> Result<(), BlockOperationError> {
        self.only_on("level", self.raw.level.is_some(), &[BlockType::Heading])?;
        self.integer_in("level", self.raw.level, 1.0, 6.0)?;
        if let (Some(level), Some((alias, AliasImplies::Level(implied)))) =
            (self.raw.level, self.alias_implies())
        {
            if level != f64::from(implied) {
                return self.fail("level", format!("conflicts with legacy type '{alias}'"));
            }
        }
        Ok(())
    }

    fn list(&self) -> Result<(), BlockOperationError> {
        self.only_on("style", self.raw.style.is_some(), &[BlockType::List])?;
        if let Some(style) = self.raw.style.as_deref() {
            let Some(parsed) = ListStyle::parse(style) else {
                return self.fail("style", "must be one of bulleted, numbered, todo");
            };
            if let Some((alias, AliasImplies::Style(implied))) = self.alias_implies() {
                if parsed != implied {
                    return self.fail("style", format!("conflicts with legacy type '{alias}'"));
                }
            }
        }
        if self.raw.checked.is_some()
            && !(self.block.block_type == BlockType::List && self.block.style == ListStyle::Todo)
        {
            return self.fail("checked", "only valid for list with style todo");
        }
        Ok(())
    }

    fn text(&self) -> Result<(), BlockOperationError> {
        let has_text = self.raw.text.as_deref().is_some_and(|t| !t.is_empty());
        if has_text
            && self.is(&[
                BlockType::Divider,
                BlockType::Table,
                BlockType::Image,
                BlockType::Attachment,
                BlockType::Latex,
            ])
        {
            return self.fail("text", "must be empty for this block type");
        }
        Ok(())
    }

    fn code_and_caption(&self) -> Result<(), BlockOperationError> {
        self.only_on("language", self.raw.language.is_some(), &[BlockType::Code])?;
        self.only_on(
            "caption",
            self.raw.caption.is_some(),
            &[
                BlockType::Code,
                BlockType::Bookmark,
                BlockType::Image,
                BlockType::Attachment,
            ],
        )
    }

    fn bookmark(&self) -> Result<(), BlockOperationError> {
        self.only_on("url", self.raw.url.is_some(), &[BlockType::Bookmark])?;
        self.only_on(
            "bookmarkStyle",
            self.raw.bookmark_style.is_some(),
            &[BlockType::Bookmark],
        )?;
        if self.block.block_type != BlockType::Bookmark {
            return Ok(());
        }
        self.required("url", &self.block.url)?;
        if !self.block.url.as_deref().is_some_and(is_url) {
            return self.fail("url", "must be a valid URL");
        }
        if let Some(style) = self.raw.bookmark_style.as_deref() {
            if BookmarkStyle::parse(style).is_none() {
                return self.fail(
                    "bookmarkStyle",
                    "must be one of vertical, horizontal, list, cube, citation",
                );
            }
        }
        Ok(())
    }

    fn media(&self) -> Result<(), BlockOperationError> {
        let media = [BlockType::Image, BlockType::Attachment];
        self.only_on("sourceId", self.raw.source_id.is_some(), &media)?;
        self.only_on("size", self.raw.size.is_some(), &media)?;
        self.only_on("name", self.raw.name.is_some(), &[BlockType::Attachment])?;
        self.only_on("mimeType", self.raw.mime_type.is_some(), &[BlockType::Attachment])?;
        self.only_on("embed", self.raw.embed.is_some(), &[BlockType::Attachment])?;

        if self.is(&media) {
            self.required("sourceId", &self.block.source_id)?;
            if let Some(size) = self.raw.size {
                if !size.is_finite() || size.fract() != 0.0 || size < 0.0 {
                    return self.fail("size", "must be a non-negative integer");
                }
            }
        }
        if self.block.block_type == BlockType::Attachment {
            self.required("name", &self.block.name)?;
            self.required("mimeType", &self.block.mime_type)?;
        }
        Ok(())
    }

    fn latex(&self) -> Result<(), BlockOperationError> {
        self.only_on("latex", self.raw.latex.is_some(), &[BlockType::Latex])?;
        if self.block.block_type == BlockType::Latex {
            self.required("latex", &self.block.latex)?;
        }
        Ok(())
    }

    fn table(&self) -> Result<(), BlockOperationError> {
        let table = [BlockType::Table];
        self.only_on("rows", self.raw.rows.is_some(), &table)?;
        self.only_on("columns", self.raw.columns.is_some(), &table)?;
        self.only_on("tableData", self.raw.table_data.is_some(), &table)?;

        let max = f64::from(MAX_TABLE_DIMENSION);
        self.integer_in("rows", self.raw.rows, 1.0, max)?;
        self.integer_in("columns", self.raw.columns, 1.0, max)?;

        if let Some(data) = &self.block.table_data {
            let widest = data.iter().map(Vec::len).max().unwrap_or(0);
            if data.len() > self.block.rows as usize || widest > self.block.columns as usize {
                return self.fail(
                    "tableData",
                    format!(
                        "exceeds declared {}x{} grid",
                        self.block.rows, self.block.columns
                    ),
                );
            }
        }
        Ok(())
    }
}

/// Validate field legality for `block` (built from `raw`)
///
/// Does nothing when the normalized record is lenient.
///
/// # Errors
///
/// Returns the first `InvalidField` violation found.
pub fn validate(block: &NormalizedBlock, raw: &AppendBlockParams) -> Result<(), BlockOperationError> {
    if !block.strict {
        return Ok(());
    }
    let rules = Rules { block, raw };
    rules.heading()?;
    rules.list()?;
    rules.text()?;
    rules.code_and_caption()?;
    rules.bookmark()?;
    rules.media()?;
    rules.latex()?;
    rules.table()
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;
