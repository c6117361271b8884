//! Incremental deltas
//!
//! A `Mutation` stages changes on a working copy of a snapshot's node table
//! and records each change as a `DeltaOp`. Nothing reaches the store until the
//! mutation is turned into a `Delta` and submitted; a mutation that fails
//! part-way is simply dropped, so a batch either lands whole or not at all.

use crate::models::{BlockId, BlockNode, DocSnapshot, NodeTable, ValidationError};
use serde::{Deserialize, Serialize};

/// One incremental change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DeltaOp {
    /// Add a new block to the node table (children are linked by `InsertChild`)
    InsertBlock { block: BlockNode },

    /// Splice `child_id` into `parent_id`'s children at `index`
    #[serde(rename_all = "camelCase")]
    InsertChild {
        parent_id: BlockId,
        child_id: BlockId,
        index: usize,
    },
}

/// Changes computed against the snapshot at `base_version`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub base_version: u64,
    pub ops: Vec<DeltaOp>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every op to `table` in order
    ///
    /// Only references introduced by this delta are checked; dangling ids
    /// already present in the table are left for readers to skip.
    ///
    /// On error `table` may be partially modified; callers that need
    /// all-or-nothing semantics apply to a clone.
    pub fn apply_to(&self, table: &mut NodeTable) -> Result<(), ValidationError> {
        for op in &self.ops {
            apply_op(table, op)?;
        }
        for op in &self.ops {
            if let DeltaOp::InsertBlock { block } = op {
                if let Some(missing) = block.children.iter().find(|c| !table.contains(c)) {
                    return Err(ValidationError::DanglingChild {
                        parent_id: block.id.clone(),
                        child_id: missing.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn apply_op(table: &mut NodeTable, op: &DeltaOp) -> Result<(), ValidationError> {
    match op {
        DeltaOp::InsertBlock { block } => {
            if table.contains(&block.id) {
                return Err(ValidationError::DuplicateBlock(block.id.clone()));
            }
            block.validate()?;
            table.insert(block.clone());
            Ok(())
        }
        DeltaOp::InsertChild {
            parent_id,
            child_id,
            index,
        } => table.insert_child(parent_id, *index, child_id),
    }
}

/// Store acknowledgement for a submitted delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaAck {
    /// Document version after the delta was applied
    pub version: u64,
    pub applied_ops: usize,
}

/// Staged batch of changes against one snapshot
#[derive(Debug, Clone)]
pub struct Mutation {
    base_version: u64,
    working: NodeTable,
    ops: Vec<DeltaOp>,
}

impl Mutation {
    /// Start a batch from a fetched snapshot (`None` for an empty document)
    pub fn new(snapshot: Option<&DocSnapshot>) -> Self {
        let (base_version, working) = match snapshot {
            Some(snapshot) => (snapshot.version, snapshot.blocks.clone()),
            None => (0, NodeTable::new()),
        };
        Self {
            base_version,
            working,
            ops: Vec::new(),
        }
    }

    /// Current state including everything staged so far
    pub fn table(&self) -> &NodeTable {
        &self.working
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    pub fn insert_block(&mut self, block: BlockNode) -> Result<(), ValidationError> {
        let op = DeltaOp::InsertBlock {
            block: BlockNode {
                children: Vec::new(),
                ..block
            },
        };
        self.stage(op)
    }

    pub fn insert_child(
        &mut self,
        parent_id: &str,
        index: usize,
        child_id: &str,
    ) -> Result<(), ValidationError> {
        self.stage(DeltaOp::InsertChild {
            parent_id: parent_id.to_string(),
            child_id: child_id.to_string(),
            index,
        })
    }

    fn stage(&mut self, op: DeltaOp) -> Result<(), ValidationError> {
        apply_op(&mut self.working, &op)?;
        self.ops.push(op);
        Ok(())
    }

    pub fn into_delta(self) -> Delta {
        Delta {
            base_version: self.base_version,
            ops: self.ops,
        }
    }
}
