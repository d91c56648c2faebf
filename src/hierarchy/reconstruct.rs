//! Merged-cell table reconstruction
//!
//! The entity listing arrives as a flattened table where a cell with
//! rowspan `s` is physically present only in its first row and implicitly
//! covers the next `s - 1` rows. Reconstruction rebuilds the explicit tree
//! and emits one full-path entity per input row.

use super::tree::{HierarchyTree, NodeId};
use super::{EntityNode, ScopeKey};
use crate::markup::Cell;
use crate::{CatalogError, Result};

/// Span counter for the root frame; decremented but never exhausted.
const ROOT_SENTINEL: u32 = u32::MAX;

/// A level currently in effect, with the number of rows it still covers
/// (including the row being processed).
struct Frame {
    node: NodeId,
    remaining: u32,
}

/// Rebuilds the hierarchy tree and the per-row leaf list from raw rows
///
/// Each row must physically supply at least its own leaf cell; levels
/// above the leaf may be carried over from spanning cells of earlier
/// rows. Returns the tree (rooted at the scope) and the ordered leaf
/// entities, one per input row.
///
/// # Errors
///
/// `MalformedHierarchyTable` if a row supplies no cells, a cell declares
/// a span of 0, or an inner level's span outlives the level above it.
/// Fatal for the scope's fetch; not retried.
pub fn reconstruct(
    rows: &[Vec<Cell>],
    scope: ScopeKey,
) -> Result<(HierarchyTree, Vec<EntityNode>)> {
    let mut tree = HierarchyTree::new(scope);
    let mut frames = vec![Frame {
        node: tree.root(),
        remaining: ROOT_SENTINEL,
    }];
    let mut leaves = Vec::with_capacity(rows.len());

    for (row_idx, row) in rows.iter().enumerate() {
        if row.is_empty() {
            return Err(CatalogError::MalformedHierarchyTable(format!(
                "row {} supplies no cells; every row must own its leaf",
                row_idx
            )));
        }

        let mut leaf = None;
        for cell in row {
            if cell.span == 0 {
                return Err(CatalogError::MalformedHierarchyTable(format!(
                    "row {}: cell '{}' declares a span of 0",
                    row_idx, cell.text
                )));
            }

            let parent = frames.last().expect("root frame is never popped").node;
            let mut path = tree.node(parent).entity.path.clone();
            path.push(cell.text.clone());

            let entity = EntityNode {
                name: cell.text.clone(),
                scope,
                address: cell.link.as_ref().map(|l| l.address.clone()),
                path,
            };
            let node = tree.add_child(parent, entity);
            frames.push(Frame {
                node,
                remaining: cell.span,
            });
            leaf = Some(node);
        }

        // Guaranteed by the emptiness check above
        let leaf = leaf.expect("row contributed at least one cell");
        leaves.push(tree.node(leaf).entity.clone());

        for frame in frames.iter_mut() {
            frame.remaining = frame.remaining.saturating_sub(1);
        }
        while frames.last().map_or(false, |f| f.remaining == 0) {
            frames.pop();
        }
        // A buried exhausted frame means a level's span outlived its
        // parent's; the next decrement would drive it negative.
        if frames.iter().any(|f| f.remaining == 0) {
            return Err(CatalogError::MalformedHierarchyTable(format!(
                "row {}: a spanned level outlives its parent level",
                row_idx
            )));
        }
    }

    Ok((tree, leaves))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Cell;

    fn paths(leaves: &[EntityNode]) -> Vec<Vec<String>> {
        leaves.iter().map(|l| l.path.clone()).collect()
    }

    #[test]
    fn test_single_parent_three_leaves() {
        // Major X covers all three rows; each row supplies its own leaf
        let rows = vec![
            vec![Cell::spanning("Major X", 3), Cell::text("Core")],
            vec![Cell::text("Elective")],
            vec![Cell::text("Core")],
        ];
        let (tree, leaves) = reconstruct(&rows, 2016).unwrap();

        let root = tree.node(tree.root());
        assert_eq!(root.children.len(), 1);
        let major = tree.node(root.children[0]);
        assert_eq!(major.entity.name, "Major X");
        assert_eq!(major.children.len(), 3);

        // Duplicate leaf names are legal and yield separate nodes
        assert_eq!(
            paths(&leaves),
            vec![
                vec!["Major X".to_string(), "Core".to_string()],
                vec!["Major X".to_string(), "Elective".to_string()],
                vec!["Major X".to_string(), "Core".to_string()],
            ]
        );
    }

    #[test]
    fn test_leaf_count_equals_row_count() {
        let rows = vec![
            vec![
                Cell::spanning("School A", 2),
                Cell::spanning("Class I", 2),
                Cell::text("Alpha"),
            ],
            vec![Cell::text("Beta")],
            vec![Cell::text("School B"), Cell::text("Gamma")],
        ];
        let (_, leaves) = reconstruct(&rows, 2017).unwrap();
        assert_eq!(leaves.len(), rows.len());
    }

    #[test]
    fn test_path_length_equals_level() {
        let rows = vec![
            vec![
                Cell::spanning("School A", 2),
                Cell::spanning("Class I", 2),
                Cell::text("Alpha"),
            ],
            vec![Cell::text("Beta")],
        ];
        let (tree, _) = reconstruct(&rows, 2017).unwrap();
        for id in 0..tree.len() {
            let node = tree.node(id);
            assert_eq!(node.entity.path.len(), node.level);
        }
    }

    #[test]
    fn test_deep_leaf_reattaches_to_kept_ancestors() {
        // Row 2 supplies only its leaf; both ancestors carry over
        let rows = vec![
            vec![
                Cell::spanning("School", 3),
                Cell::spanning("Class", 2),
                Cell::text("One"),
            ],
            vec![Cell::text("Two")],
            vec![Cell::text("Direct")],
        ];
        let (tree, leaves) = reconstruct(&rows, 2016).unwrap();

        assert_eq!(
            leaves[1].path,
            vec!["School".to_string(), "Class".to_string(), "Two".to_string()]
        );
        // Class's span ended with row 2, so row 3 attaches under School
        assert_eq!(
            leaves[2].path,
            vec!["School".to_string(), "Direct".to_string()]
        );

        let school = tree.node(tree.node(tree.root()).children[0]);
        assert_eq!(school.children.len(), 2);
    }

    #[test]
    fn test_span_one_pops_immediately() {
        let rows = vec![
            vec![Cell::text("A"), Cell::text("Leaf1")],
            vec![Cell::text("B"), Cell::text("Leaf2")],
        ];
        let (tree, leaves) = reconstruct(&rows, 2016).unwrap();

        // A did not carry past its own row; B attaches to the root
        assert_eq!(tree.node(tree.root()).children.len(), 2);
        assert_eq!(leaves[1].path, vec!["B".to_string(), "Leaf2".to_string()]);
    }

    #[test]
    fn test_deterministic() {
        let rows = vec![
            vec![Cell::spanning("Major X", 2), Cell::text("Core")],
            vec![Cell::text("Elective")],
        ];
        let (tree_a, leaves_a) = reconstruct(&rows, 2016).unwrap();
        let (tree_b, leaves_b) = reconstruct(&rows, 2016).unwrap();

        assert_eq!(paths(&leaves_a), paths(&leaves_b));
        assert_eq!(tree_a.len(), tree_b.len());
        assert_eq!(
            tree_a.dfs_lines().collect::<Vec<_>>(),
            tree_b.dfs_lines().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_row_is_malformed() {
        let rows = vec![
            vec![Cell::spanning("Major X", 2), Cell::text("Core")],
            vec![],
        ];
        let err = reconstruct(&rows, 2016).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedHierarchyTable(_)));
    }

    #[test]
    fn test_zero_span_is_malformed() {
        let rows = vec![vec![Cell::spanning("Major X", 0), Cell::text("Core")]];
        let err = reconstruct(&rows, 2016).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedHierarchyTable(_)));
    }

    #[test]
    fn test_child_span_outliving_parent_is_malformed() {
        // Inner level claims 3 rows while its parent only covers 2
        let rows = vec![
            vec![
                Cell::spanning("School", 2),
                Cell::spanning("Class", 3),
                Cell::text("One"),
            ],
            vec![Cell::text("Two")],
            vec![Cell::text("Three")],
        ];
        let err = reconstruct(&rows, 2016).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedHierarchyTable(_)));
    }

    #[test]
    fn test_leaf_link_becomes_address() {
        let rows = vec![vec![
            Cell::spanning("Major X", 1),
            Cell::linked("Core", "PyjhQuery.aspx?id=7"),
        ]];
        let (_, leaves) = reconstruct(&rows, 2016).unwrap();
        assert_eq!(leaves[0].address.as_deref(), Some("PyjhQuery.aspx?id=7"));
    }
}
