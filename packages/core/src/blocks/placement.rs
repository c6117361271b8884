//! Placement resolution
//!
//! Turns a request's `Placement` into a concrete parent and insertion index
//! against the current node table. When the document has no note (or no page
//! at all) the parent is reported as pending; the builder creates it in the
//! same mutation batch.

use crate::models::{BlockId, NodeTable, Placement};
use crate::operations::BlockOperationError;

/// Parent the new block will be spliced into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentSlot {
    /// A block already present in the table
    Existing(BlockId),
    /// The page exists but has no note; one must be created under it
    PendingNote { page_id: BlockId },
    /// The document is empty; the page/surface/note skeleton must be created
    PendingDocument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlacement {
    pub parent: ParentSlot,
    /// Parent's children before the insertion
    pub siblings: Vec<BlockId>,
    /// Zero-based insertion index into `siblings`
    pub index: usize,
}

fn checked_index(
    index: Option<i64>,
    child_count: usize,
    strict: bool,
) -> Result<usize, BlockOperationError> {
    let Some(requested) = index else {
        return Ok(child_count);
    };
    if (0..=child_count as i64).contains(&requested) {
        return Ok(requested as usize);
    }
    if strict {
        return Err(BlockOperationError::index_out_of_range(requested, child_count));
    }
    Ok(requested.clamp(0, child_count as i64) as usize)
}

fn existing_parent(
    table: &NodeTable,
    parent_id: &str,
    strict: bool,
) -> Result<Vec<BlockId>, BlockOperationError> {
    let parent = table
        .get(parent_id)
        .ok_or_else(|| BlockOperationError::reference_not_found(parent_id))?;
    if strict && parent.flavour.is_structural_root() {
        return Err(BlockOperationError::invalid_parent(
            parent_id,
            parent.flavour.as_str(),
        ));
    }
    Ok(parent.children.clone())
}

fn relative_to(
    table: &NodeTable,
    placement: &Placement,
    reference_id: &str,
    after: bool,
    strict: bool,
) -> Result<ResolvedPlacement, BlockOperationError> {
    let reference = table
        .get(reference_id)
        .ok_or_else(|| BlockOperationError::reference_not_found(reference_id))?;
    let parent_id = reference.parent_id.clone().ok_or_else(|| {
        BlockOperationError::invalid_placement(format!(
            "block '{reference_id}' is a root and has no siblings"
        ))
    })?;
    if let Some(requested) = placement.parent_id.as_deref() {
        if requested != parent_id {
            return Err(BlockOperationError::invalid_placement(format!(
                "parentId '{requested}' does not match the parent '{parent_id}' of block '{reference_id}'"
            )));
        }
    }

    let siblings = existing_parent(table, &parent_id, strict)?;
    let position = siblings
        .iter()
        .position(|id| id == reference_id)
        .ok_or_else(|| {
            BlockOperationError::invalid_placement(format!(
                "block '{reference_id}' is not listed among the children of '{parent_id}'"
            ))
        })?;

    Ok(ResolvedPlacement {
        parent: ParentSlot::Existing(parent_id),
        siblings,
        index: if after { position + 1 } else { position },
    })
}

fn default_container(
    table: &NodeTable,
    placement: &Placement,
    strict: bool,
) -> Result<ResolvedPlacement, BlockOperationError> {
    let Some(page) = table.page() else {
        return Ok(ResolvedPlacement {
            parent: ParentSlot::PendingDocument,
            siblings: Vec::new(),
            index: checked_index(placement.index, 0, strict)?,
        });
    };
    match table.note_under(&page.id) {
        Some(note) => Ok(ResolvedPlacement {
            parent: ParentSlot::Existing(note.id.clone()),
            siblings: note.children.clone(),
            index: checked_index(placement.index, note.children.len(), strict)?,
        }),
        None => Ok(ResolvedPlacement {
            parent: ParentSlot::PendingNote {
                page_id: page.id.clone(),
            },
            siblings: Vec::new(),
            index: checked_index(placement.index, 0, strict)?,
        }),
    }
}

/// Resolve where a new block goes
///
/// # Errors
///
/// - `InvalidPlacement` when `afterBlockId`, `beforeBlockId` and `index` are combined,
///   or `parentId` disagrees with the reference block's parent
/// - `ReferenceNotFound` when a referenced block or parent does not exist
/// - `IndexOutOfRange` (strict only) when `index` is outside `[0, child_count]`
/// - `InvalidParent` (strict only) when the parent is a page or surface
pub fn resolve_placement(
    table: &NodeTable,
    placement: &Placement,
    strict: bool,
) -> Result<ResolvedPlacement, BlockOperationError> {
    match (
        placement.after_block_id.as_deref(),
        placement.before_block_id.as_deref(),
    ) {
        (Some(_), Some(_)) => Err(BlockOperationError::invalid_placement(
            "afterBlockId and beforeBlockId are mutually exclusive",
        )),
        (Some(_), None) | (None, Some(_)) if placement.index.is_some() => {
            Err(BlockOperationError::invalid_placement(
                "index cannot be combined with afterBlockId or beforeBlockId",
            ))
        }
        (Some(after), None) => relative_to(table, placement, after, true, strict),
        (None, Some(before)) => relative_to(table, placement, before, false, strict),
        (None, None) => match placement.parent_id.as_deref() {
            Some(parent_id) => {
                let siblings = existing_parent(table, parent_id, strict)?;
                let index = checked_index(placement.index, siblings.len(), strict)?;
                Ok(ResolvedPlacement {
                    parent: ParentSlot::Existing(parent_id.to_string()),
                    siblings,
                    index,
                })
            }
            None => default_container(table, placement, strict),
        },
    }
}

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;
