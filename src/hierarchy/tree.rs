//! Arena-backed hierarchy tree
//!
//! Nodes are stored in a flat arena and addressed by index, giving each
//! node a non-owning parent back-reference and insertion-ordered children
//! without reference counting. Nodes are never removed, so indices stay
//! valid for the tree's lifetime.

use super::{EntityNode, ScopeKey};
use std::collections::VecDeque;

/// Index of a node within its tree's arena
pub type NodeId = usize;

/// A single tree node: entity payload plus structural links
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub entity: EntityNode,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Distance from the root (root = 0)
    pub level: usize,
}

/// The reconstructed hierarchy for one scope
#[derive(Debug, Clone)]
pub struct HierarchyTree {
    nodes: Vec<TreeNode>,
}

impl HierarchyTree {
    /// Creates a tree whose root represents the scope itself
    pub fn new(scope: ScopeKey) -> Self {
        let root = TreeNode {
            entity: EntityNode {
                name: scope.to_string(),
                scope,
                address: None,
                path: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
            level: 0,
        };
        Self { nodes: vec![root] }
    }

    /// The root node's id (always 0)
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attaches a new child under `parent`, preserving insertion order
    pub fn add_child(&mut self, parent: NodeId, entity: EntityNode) -> NodeId {
        let id = self.nodes.len();
        let level = self.nodes[parent].level + 1;
        self.nodes.push(TreeNode {
            entity,
            parent: Some(parent),
            children: Vec::new(),
            level,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Depth-first walk yielding one formatted line per root-to-leaf chain
    ///
    /// Lazy; the consumer decides where the lines go (typically a debug
    /// log sink).
    pub fn dfs_lines(&self) -> impl Iterator<Item = String> + '_ {
        DfsLines {
            tree: self,
            stack: vec![(self.root(), self.node(self.root()).entity.name.clone())],
        }
    }

    /// Breadth-first walk yielding one formatted line per internal node,
    /// listing its direct children
    pub fn bfs_lines(&self) -> impl Iterator<Item = String> + '_ {
        BfsLines {
            tree: self,
            queue: VecDeque::from([self.root()]),
        }
    }
}

struct DfsLines<'a> {
    tree: &'a HierarchyTree,
    stack: Vec<(NodeId, String)>,
}

impl Iterator for DfsLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some((id, prefix)) = self.stack.pop() {
            let node = self.tree.node(id);
            if node.children.is_empty() {
                return Some(prefix);
            }
            // Push in reverse so children emit in insertion order
            for &child in node.children.iter().rev() {
                let name = &self.tree.node(child).entity.name;
                self.stack.push((child, format!("{} -> {}", prefix, name)));
            }
        }
        None
    }
}

struct BfsLines<'a> {
    tree: &'a HierarchyTree,
    queue: VecDeque<NodeId>,
}

impl Iterator for BfsLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(id) = self.queue.pop_front() {
            let node = self.tree.node(id);
            if node.children.is_empty() {
                continue;
            }
            let names: Vec<&str> = node
                .children
                .iter()
                .map(|&c| {
                    self.queue.push_back(c);
                    self.tree.node(c).entity.name.as_str()
                })
                .collect();
            return Some(format!(
                "[level {}] {}: {}",
                node.level,
                node.entity.name,
                names.join("; ")
            ));
        }
        None
    }
}
