//! Tree reading
//!
//! Depth-first flattening of a node table into rows plus a plain-text
//! projection. Traversal starts at the page (or the first note when there is
//! no page) and then sweeps every node not yet visited in table order, so
//! orphaned subtrees are still reported. Each id is visited at most once,
//! which also makes cyclic `children` data terminate.

use crate::blocks::warnings::WarningLog;
use crate::models::{BlockId, BlockNode, Flavour, NodeTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One flattened row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatBlock {
    pub id: BlockId,
    pub parent_id: Option<BlockId>,
    pub flavour: String,
    #[serde(rename = "type")]
    pub block_type: Option<String>,
    pub text: Option<String>,
    pub checked: Option<bool>,
    pub language: Option<String>,
    pub child_ids: Vec<BlockId>,
}

impl From<&BlockNode> for FlatBlock {
    fn from(node: &BlockNode) -> Self {
        Self {
            id: node.id.clone(),
            parent_id: node.parent_id.clone(),
            flavour: node.flavour.to_string(),
            block_type: node.block_type.clone(),
            text: node.text.as_ref().map(|t| t.to_plain_string()),
            checked: node.prop_bool("checked"),
            language: node.prop_str("language").map(str::to_string),
            child_ids: node.children.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRead {
    pub blocks: Vec<FlatBlock>,
    /// Non-empty block texts in document order, joined with `\n`
    pub plain_text: String,
    /// Referenced children missing from the table
    pub unsupported: usize,
    pub warnings: Vec<String>,
}

/// Default traversal root: the page, else the first note
pub fn default_root(table: &NodeTable) -> Option<&BlockNode> {
    table.page().or_else(|| table.find_first(&Flavour::Note))
}

/// Flatten the whole table starting from its default root
pub fn read_tree(table: &NodeTable) -> TreeRead {
    let roots: Vec<BlockId> = default_root(table).map(|n| n.id.clone()).into_iter().collect();
    read_tree_from(table, &roots)
}

/// Flatten the table starting from `roots`, then sweep unvisited nodes
pub fn read_tree_from(table: &NodeTable, roots: &[BlockId]) -> TreeRead {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut rows = Vec::new();
    let mut texts = Vec::new();
    let mut unsupported = 0;
    let mut warnings = WarningLog::new();

    let sweep = table.iter().map(|n| n.id.as_str());
    let starts: Vec<&str> = roots.iter().map(String::as_str).chain(sweep).collect();

    for start in starts {
        if visited.contains(start) {
            continue;
        }
        let mut stack = vec![(None::<&str>, start)];
        while let Some((referrer, id)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = table.get(id) else {
                unsupported += 1;
                match referrer {
                    Some(parent) => warnings.push(format!(
                        "Block '{parent}' references missing child '{id}'; skipped"
                    )),
                    None => warnings.push(format!("Root block '{id}' does not exist; skipped")),
                }
                continue;
            };

            let text = node.plain_text();
            if !text.is_empty() {
                texts.push(text);
            }
            rows.push(FlatBlock::from(node));
            for child in node.children.iter().rev() {
                if !visited.contains(child.as_str()) {
                    stack.push((Some(node.id.as_str()), child.as_str()));
                }
            }
        }
    }

    TreeRead {
        blocks: rows,
        plain_text: texts.join("\n"),
        unsupported,
        warnings: warnings.into_vec(),
    }
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod reader_test;
