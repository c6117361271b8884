//! Document Arena
//!
//! `NodeTable` is a flat id → node map that remembers insertion order, so
//! "table order" iteration is stable across runs. `DocSnapshot` pairs a table
//! with the store version it was materialized at.

use crate::models::{BlockId, BlockNode, Flavour, ValidationError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Flat arena of block nodes keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeTable {
    nodes: HashMap<BlockId, BlockNode>,
    order: Vec<BlockId>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BlockNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Insert or replace a node. Replacing keeps the original table position.
    pub fn insert(&mut self, node: BlockNode) -> Option<BlockNode> {
        let id = node.id.clone();
        let previous = self.nodes.insert(id.clone(), node);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    /// Nodes in table (insertion) order
    pub fn iter(&self) -> impl Iterator<Item = &BlockNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// First node of the given flavour in table order
    pub fn find_first(&self, flavour: &Flavour) -> Option<&BlockNode> {
        self.iter().find(|n| &n.flavour == flavour)
    }

    /// The document's page root
    pub fn page(&self) -> Option<&BlockNode> {
        self.iter()
            .find(|n| n.flavour == Flavour::Page && n.parent_id.is_none())
            .or_else(|| self.find_first(&Flavour::Page))
    }

    /// First note container among the page's children
    pub fn note_under(&self, page_id: &str) -> Option<&BlockNode> {
        self.get(page_id)?
            .children
            .iter()
            .filter_map(|id| self.get(id))
            .find(|n| n.flavour == Flavour::Note)
    }

    /// Splice `child_id` into `parent_id`'s children at `index`, shifting later ids right
    ///
    /// The child must already be present in the table; its `parent_id` is updated.
    pub fn insert_child(
        &mut self,
        parent_id: &str,
        index: usize,
        child_id: &str,
    ) -> Result<(), ValidationError> {
        if parent_id == child_id {
            return Err(ValidationError::SelfReference(child_id.to_string()));
        }
        if !self.nodes.contains_key(child_id) {
            return Err(ValidationError::UnknownBlock(child_id.to_string()));
        }
        let parent = self
            .nodes
            .get_mut(parent_id)
            .ok_or_else(|| ValidationError::UnknownBlock(parent_id.to_string()))?;
        let index = index.min(parent.children.len());
        parent.children.insert(index, child_id.to_string());

        if let Some(child) = self.nodes.get_mut(child_id) {
            child.parent_id = Some(parent_id.to_string());
        }
        Ok(())
    }

    /// Check every `children` entry resolves to a node in the table
    pub fn validate_references(&self) -> Result<(), ValidationError> {
        for node in self.iter() {
            if let Some(missing) = node.children.iter().find(|c| !self.contains(c)) {
                return Err(ValidationError::DanglingChild {
                    parent_id: node.id.clone(),
                    child_id: missing.clone(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<BlockNode> for NodeTable {
    fn from_iter<T: IntoIterator<Item = BlockNode>>(iter: T) -> Self {
        let mut table = NodeTable::new();
        for node in iter {
            table.insert(node);
        }
        table
    }
}

impl Serialize for NodeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for NodeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nodes = Vec::<BlockNode>::deserialize(deserializer)?;
        Ok(nodes.into_iter().collect())
    }
}

/// Materialized document state at a given store version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSnapshot {
    /// Store clock the snapshot was read at; deltas are computed against it
    pub version: u64,

    pub blocks: NodeTable,
}

impl DocSnapshot {
    pub fn new(version: u64, blocks: NodeTable) -> Self {
        Self { version, blocks }
    }
}
