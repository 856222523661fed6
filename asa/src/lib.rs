//! An aggregating sorted associative structure: an ordered multiset keyed
//! by value that supports logarithmic insert/search/delete alongside
//! constant- or linear-time order-statistic aggregates (min, max, sum,
//! mean, median).
//!
//! The structure is a 2-3 tree ([`tree`]) whose keys are handles into a
//! sorted doubly-linked queue ([`queue`]); every distinct key lives in
//! exactly one [`value_node::ValueNode`], referenced from both structures.
//! The tree gives `O(log n)` dictionary access; the queue gives `O(n)`
//! order-statistic traversal with a two-finger median walk that terminates
//! from both ends at once. Both arenas are generation-checked ([`arena`])
//! so stale handles are rejected rather than silently aliasing.
//!
//! [`engine::Asa`] is the sole entry point for the core; [`agds`] is a thin
//! optional layer for wiring one `Asa` per table column into a larger
//! associative graph.

mod agds;
mod arena;
mod engine;
mod error;
mod queue;
mod tree;
mod value_node;

pub use agds::{Column, RowId};
pub use engine::{Aggregable, Asa, Deleted};
pub use error::{Error, Result};
pub use queue::{Iter, Median, ReverseIter};
pub use tree::{TreeNode, TreeNodeHandle};
pub use value_node::{ValueNode, ValueNodeHandle};
