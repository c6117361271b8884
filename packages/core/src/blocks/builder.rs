//! Block construction
//!
//! Builds the flavour-specific node for a normalized request and stages it,
//! together with any container that had to be created for it, on a
//! [`Mutation`]. The whole batch is computed before anything is submitted.

use crate::blocks::normalize::NormalizedBlock;
use crate::blocks::order_key::OrderKey;
use crate::blocks::placement::{ParentSlot, ResolvedPlacement};
use crate::models::{BlockId, BlockNode, BlockType, Flavour, ListStyle, RichText};
use crate::operations::BlockOperationError;
use crate::store::Mutation;
use serde_json::{json, Map, Value};
use tracing::debug;

pub const NOTE_DISPLAY_MODE: &str = "both";

/// Outcome of staging one block
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltBlock {
    pub block_id: BlockId,
    pub flavour: Flavour,
    /// Stored `type` discriminator (`h2`, `todo`, ...)
    pub block_type: Option<String>,
    pub parent_id: BlockId,
    pub index: usize,
    /// Containers created in the same batch (page, surface, note)
    pub created_containers: Vec<BlockId>,
}

fn text_of(block: &NormalizedBlock) -> RichText {
    RichText::plain(block.text.clone())
}

fn table_props(block: &NormalizedBlock) -> Map<String, Value> {
    let row_ids: Vec<String> = (0..block.rows).map(|_| uuid::Uuid::new_v4().to_string()).collect();
    let column_ids: Vec<String> = (0..block.columns)
        .map(|_| uuid::Uuid::new_v4().to_string())
        .collect();

    let axis = |ids: &[String]| -> Value {
        let keys = OrderKey::sequence(ids.len());
        let entries: Map<String, Value> = ids
            .iter()
            .zip(keys)
            .map(|(id, order)| (id.clone(), json!({ "id": id, "order": order })))
            .collect();
        Value::Object(entries)
    };

    let mut cells = Map::new();
    for (r, row_id) in row_ids.iter().enumerate() {
        for (c, column_id) in column_ids.iter().enumerate() {
            let text = block
                .table_data
                .as_ref()
                .and_then(|data| data.get(r))
                .and_then(|row| row.get(c))
                .cloned()
                .unwrap_or_default();
            cells.insert(format!("{row_id}:{column_id}"), json!({ "text": text }));
        }
    }

    let mut props = Map::new();
    props.insert("rows".to_string(), axis(&row_ids));
    props.insert("columns".to_string(), axis(&column_ids));
    props.insert("cells".to_string(), Value::Object(cells));
    props
}

/// Construct the detached node for a normalized request
///
/// Fields the block type does not use are dropped here, which is how lenient
/// requests shed illegal fields.
pub fn build_node(block: &NormalizedBlock) -> BlockNode {
    let with_caption = |node: BlockNode| match &block.caption {
        Some(caption) => node.with_prop("caption", json!(caption)),
        None => node,
    };
    let string_or_empty = |value: &Option<String>| json!(value.clone().unwrap_or_default());

    match block.block_type {
        BlockType::Paragraph => BlockNode::new(Flavour::Paragraph)
            .with_type("text")
            .with_text(text_of(block)),
        BlockType::Heading => BlockNode::new(Flavour::Paragraph)
            .with_type(format!("h{}", block.level))
            .with_text(text_of(block)),
        BlockType::Quote => BlockNode::new(Flavour::Paragraph)
            .with_type("quote")
            .with_text(text_of(block)),
        BlockType::List => {
            let checked = block.style == ListStyle::Todo && block.checked;
            BlockNode::new(Flavour::List)
                .with_type(block.style.as_str())
                .with_text(text_of(block))
                .with_prop("checked", json!(checked))
        }
        BlockType::Code => with_caption(
            BlockNode::new(Flavour::Code)
                .with_text(text_of(block))
                .with_prop("language", json!(block.language)),
        ),
        BlockType::Divider => BlockNode::new(Flavour::Divider),
        BlockType::Callout => BlockNode::new(Flavour::Callout).with_text(text_of(block)),
        BlockType::Latex => {
            BlockNode::new(Flavour::Latex).with_prop("latex", string_or_empty(&block.latex))
        }
        BlockType::Table => {
            let mut node = BlockNode::new(Flavour::Table);
            node.props = table_props(block);
            node
        }
        BlockType::Bookmark => with_caption(
            BlockNode::new(Flavour::Bookmark)
                .with_prop("url", string_or_empty(&block.url))
                .with_prop("style", json!(block.bookmark_style.as_str())),
        ),
        BlockType::Image => {
            let node = with_caption(
                BlockNode::new(Flavour::Image).with_prop("sourceId", string_or_empty(&block.source_id)),
            );
            match block.size {
                Some(size) => node.with_prop("size", json!(size)),
                None => node,
            }
        }
        BlockType::Attachment => with_caption(
            BlockNode::new(Flavour::Attachment)
                .with_prop("sourceId", string_or_empty(&block.source_id))
                .with_prop("name", string_or_empty(&block.name))
                .with_prop("mimeType", string_or_empty(&block.mime_type))
                .with_prop("size", json!(block.size.unwrap_or(0)))
                .with_prop("embed", json!(block.embed)),
        ),
    }
}

fn new_note(page_id: &str, existing_notes: usize) -> BlockNode {
    let keys = OrderKey::sequence(existing_notes + 1);
    let index = keys.last().map(OrderKey::to_string).unwrap_or_default();
    BlockNode::new(Flavour::Note)
        .with_parent(page_id)
        .with_prop("displayMode", json!(NOTE_DISPLAY_MODE))
        .with_prop("index", json!(index))
}

/// Stage a note under `page_id`, appended after the page's existing children
fn stage_note(mutation: &mut Mutation, page_id: &str) -> Result<BlockId, BlockOperationError> {
    let page = mutation
        .table()
        .get(page_id)
        .ok_or_else(|| BlockOperationError::reference_not_found(page_id))?;
    let position = page.children.len();
    let existing_notes = page
        .children
        .iter()
        .filter_map(|id| mutation.table().get(id))
        .filter(|n| n.flavour == Flavour::Note)
        .count();

    let note = new_note(page_id, existing_notes);
    let note_id = note.id.clone();
    mutation.insert_block(note)?;
    mutation.insert_child(page_id, position, &note_id)?;
    debug!("Staged note {} under page {}", note_id, page_id);
    Ok(note_id)
}

/// Stage the `page -> surface, note` skeleton of an empty document
fn stage_skeleton(mutation: &mut Mutation) -> Result<[BlockId; 3], BlockOperationError> {
    let page = BlockNode::new(Flavour::Page).with_prop("title", json!(""));
    let page_id = page.id.clone();
    let surface = BlockNode::new(Flavour::Surface).with_parent(page_id.as_str());
    let surface_id = surface.id.clone();

    mutation.insert_block(page)?;
    mutation.insert_block(surface)?;
    mutation.insert_child(&page_id, 0, &surface_id)?;
    let note_id = stage_note(mutation, &page_id)?;
    debug!("Staged document skeleton rooted at {}", page_id);
    Ok([page_id, surface_id, note_id])
}

/// Build the node for `block` and stage it at `placement`
///
/// Lazily created containers are staged first, in the same mutation.
///
/// # Errors
///
/// Returns `Validation` if the staged node breaks a tree invariant; the
/// mutation should then be discarded.
pub fn stage_block(
    mutation: &mut Mutation,
    block: &NormalizedBlock,
    placement: ResolvedPlacement,
) -> Result<BuiltBlock, BlockOperationError> {
    let (parent_id, created_containers) = match placement.parent {
        ParentSlot::Existing(id) => (id, Vec::new()),
        ParentSlot::PendingNote { page_id } => {
            let note_id = stage_note(mutation, &page_id)?;
            (note_id.clone(), vec![note_id])
        }
        ParentSlot::PendingDocument => {
            let [page_id, surface_id, note_id] = stage_skeleton(mutation)?;
            (note_id.clone(), vec![page_id, surface_id, note_id])
        }
    };

    let node = build_node(block).with_parent(parent_id.as_str());
    let built = BuiltBlock {
        block_id: node.id.clone(),
        flavour: node.flavour.clone(),
        block_type: node.block_type.clone(),
        parent_id: parent_id.clone(),
        index: placement.index,
        created_containers,
    };

    mutation.insert_block(node)?;
    mutation.insert_child(&parent_id, placement.index, &built.block_id)?;
    Ok(built)
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
