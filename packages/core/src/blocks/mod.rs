//! Block Tree Engine
//!
//! Pure, synchronous pieces of the block pipeline:
//!
//! 1. [`normalize`] - canonical type + resolved fields from a raw request
//! 2. [`validate`] - strict-mode field legality
//! 3. [`placement`] - parent and insertion index against the current tree
//! 4. [`builder`] - flavour schema construction and staging on a mutation
//! 5. [`reader`] - depth-first flattening for reads

pub mod builder;
pub mod normalize;
pub mod order_key;
pub mod placement;
pub mod reader;
pub mod validate;
mod warnings;

pub use builder::{build_node, stage_block, BuiltBlock};
pub use normalize::{normalize, NormalizedBlock};
pub use order_key::OrderKey;
pub use placement::{resolve_placement, ParentSlot, ResolvedPlacement};
pub use reader::{read_tree, read_tree_from, FlatBlock, TreeRead};
pub use validate::validate;
pub(crate) use warnings::WarningLog;
