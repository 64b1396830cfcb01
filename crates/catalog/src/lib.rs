//! Projections of a specification document for the sidebar and selection
//! modal: the selection filter, the two-level category tree and the
//! grouped-document tree.
//!
//! Every function here is a fresh pass over its inputs. Trees are rebuilt
//! on each open instead of being patched in place.

pub mod filter;
pub mod groups;
pub mod tree;

pub use filter::{FilterStats, filter_by_tags, filter_by_used_paths};
pub use groups::{ApiGroup, GroupNode, build_group_tree};
pub use tree::{CategoryNode, CategoryTree, OperationLeaf, UNTAGGED_CATEGORY, build_category_tree, build_category_tree_with};
