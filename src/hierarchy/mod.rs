//! Hierarchy reconstruction
//!
//! Converts the source's flattened merged-cell entity table back into an
//! explicit tree plus a per-row full-path record. Pure; no I/O.

mod reconstruct;
mod tree;

pub use reconstruct::reconstruct;
pub use tree::{HierarchyTree, NodeId, TreeNode};

/// Top-level partition identifier: the enrollment year
pub type ScopeKey = i32;

/// A named node of the reconstructed hierarchy
///
/// `path` is the ancestor-name chain from the scope root down to this
/// node, ending with the node's own name; its length equals the node's
/// tree level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNode {
    pub name: String,
    pub scope: ScopeKey,

    /// Raw href of the node's link, when the source makes it clickable
    pub address: Option<String>,

    pub path: Vec<String>,
}

impl EntityNode {
    /// The node's link, if the source exposed one
    pub fn link(&self) -> Option<crate::markup::Link> {
        self.address.as_ref().map(|address| crate::markup::Link {
            name: self.name.clone(),
            address: address.clone(),
        })
    }
}
