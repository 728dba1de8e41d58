//! Call hierarchy view model
//!
//! Holds the caller tree returned by the server together with transient
//! per-node expansion state, and flattens the visible portion into rows for
//! the tree overlay. Expansion is collapsed by default and is discarded
//! when the view closes.

use std::collections::HashSet;

use crate::types::{CallHierarchy, CallHierarchyNode};

/// Stable identity of a node: the index path from the root caller list.
pub type NodeId = Vec<usize>;

/// One visible row of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRow {
    pub id: NodeId,
    pub depth: usize,
    pub caller_function: String,
    pub file_path: String,
    pub line_number: u64,
    pub is_recursive: bool,
    pub has_children: bool,
    pub expanded: bool,
}

impl HierarchyRow {
    /// Location label with long paths truncated to `.../<file>`.
    pub fn display_location(&self) -> String {
        format!("{}:{}", truncate_path(&self.file_path), self.line_number)
    }

    /// Whether a click at this character column within the row lands on the
    /// expansion toggle. The toggle occupies the two cells after the
    /// indentation; leaves have no toggle. Clicks anywhere else on the row
    /// navigate to the caller location instead.
    pub fn toggle_hit(&self, column: usize) -> bool {
        let start = self.depth * 2;
        self.has_children && column >= start && column < start + 2
    }
}

/// Paths longer than this render as `.../<file name>`.
const PATH_TRUNCATE_LEN: usize = 40;

pub fn truncate_path(path: &str) -> String {
    if path.len() > PATH_TRUNCATE_LEN {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        format!(".../{}", file_name)
    } else {
        path.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct HierarchyView {
    pub data: CallHierarchy,
    expanded: HashSet<NodeId>,
    pub selected: usize,
}

impl HierarchyView {
    pub fn new(data: CallHierarchy) -> Self {
        Self {
            data,
            expanded: HashSet::new(),
            selected: 0,
        }
    }

    /// Flatten the tree into the rows currently visible: every top-level
    /// caller, plus children of expanded nodes, depth first.
    pub fn visible_rows(&self) -> Vec<HierarchyRow> {
        let mut rows = Vec::new();
        self.collect_rows(&self.data.callers, &mut Vec::new(), 0, &mut rows);
        rows
    }

    fn collect_rows(
        &self,
        nodes: &[CallHierarchyNode],
        prefix: &mut NodeId,
        depth: usize,
        rows: &mut Vec<HierarchyRow>,
    ) {
        for (index, node) in nodes.iter().enumerate() {
            prefix.push(index);
            let expanded = self.expanded.contains(prefix);
            rows.push(HierarchyRow {
                id: prefix.clone(),
                depth,
                caller_function: node.caller_function.clone(),
                file_path: node.file_path.clone(),
                line_number: node.line_number,
                is_recursive: node.is_recursive,
                has_children: !node.callers.is_empty(),
                expanded,
            });
            if expanded {
                self.collect_rows(&node.callers, prefix, depth + 1, rows);
            }
            prefix.pop();
        }
    }

    pub fn select_next(&mut self) {
        let count = self.visible_rows().len();
        if count > 0 {
            self.selected = (self.selected + 1).min(count - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_row(&self) -> Option<HierarchyRow> {
        self.visible_rows().into_iter().nth(self.selected)
    }

    /// Toggle expansion of the selected node. No-op for leaves.
    pub fn toggle_selected(&mut self) {
        if let Some(row) = self.selected_row() {
            if row.has_children {
                if !self.expanded.remove(&row.id) {
                    self.expanded.insert(row.id);
                }
                // Collapsing can shrink the visible list below the cursor.
                let count = self.visible_rows().len();
                self.selected = self.selected.min(count.saturating_sub(1));
            }
        }
    }

    /// Navigation target of the selected node.
    pub fn selected_location(&self) -> Option<(String, u64)> {
        self.selected_row().map(|row| (row.file_path, row.line_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, children: Vec<CallHierarchyNode>) -> CallHierarchyNode {
        CallHierarchyNode {
            caller_function: name.to_string(),
            file_path: format!("src/{}.c", name),
            line_number: 7,
            is_recursive: false,
            callers: children,
        }
    }

    fn sample() -> HierarchyView {
        HierarchyView::new(CallHierarchy {
            function_name: "target".into(),
            total_callers: 2,
            callers: vec![node("a", vec![node("a1", vec![node("a1x", vec![])])]), node("b", vec![])],
        })
    }

    #[test]
    fn test_collapsed_by_default_shows_top_level_only() {
        let view = sample();
        let rows = view.visible_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].caller_function, "a");
        assert!(rows[0].has_children);
        assert!(!rows[0].expanded);
        assert_eq!(rows[1].caller_function, "b");
        assert!(!rows[1].has_children);
    }

    #[test]
    fn test_expand_reveals_children_depth_first() {
        let mut view = sample();
        view.toggle_selected(); // expand "a"
        let rows = view.visible_rows();
        assert_eq!(
            rows.iter().map(|r| r.caller_function.as_str()).collect::<Vec<_>>(),
            vec!["a", "a1", "b"]
        );
        assert_eq!(rows[1].depth, 1);

        // Expand "a1" as well.
        view.select_next();
        view.toggle_selected();
        let rows = view.visible_rows();
        assert_eq!(
            rows.iter().map(|r| r.caller_function.as_str()).collect::<Vec<_>>(),
            vec!["a", "a1", "a1x", "b"]
        );
    }

    #[test]
    fn test_collapse_discards_subtree_and_clamps_cursor() {
        let mut view = sample();
        view.toggle_selected(); // expand "a"
        view.select_next();
        view.select_next();
        view.select_next(); // clamp at "b"
        assert_eq!(view.selected_row().unwrap().caller_function, "b");

        view.selected = 0;
        view.toggle_selected(); // collapse "a"
        assert_eq!(view.visible_rows().len(), 2);
    }

    #[test]
    fn test_toggle_leaf_is_noop() {
        let mut view = sample();
        view.select_next(); // "b"
        view.toggle_selected();
        assert_eq!(view.visible_rows().len(), 2);
    }

    #[test]
    fn test_selected_location() {
        let view = sample();
        assert_eq!(view.selected_location(), Some(("src/a.c".into(), 7)));
    }

    #[test]
    fn test_toggle_hit_covers_glyph_only() {
        let mut view = sample();
        let rows = view.visible_rows();
        // "a" has children at depth 0: toggle sits in columns 0..2.
        assert!(rows[0].toggle_hit(0));
        assert!(rows[0].toggle_hit(1));
        assert!(!rows[0].toggle_hit(2));
        assert!(!rows[0].toggle_hit(10));
        // "b" is a leaf: every column navigates.
        assert!(!rows[1].toggle_hit(0));

        // After expanding "a", child "a1" at depth 1 toggles in 2..4.
        view.toggle_selected();
        let rows = view.visible_rows();
        assert!(!rows[1].toggle_hit(1));
        assert!(rows[1].toggle_hit(2));
        assert!(rows[1].toggle_hit(3));
        assert!(!rows[1].toggle_hit(4));
    }

    #[test]
    fn test_truncate_path() {
        assert_eq!(truncate_path("src/main.c"), "src/main.c");
        let long = "very/long/nested/path/that/exceeds/forty/characters/file.c";
        assert_eq!(truncate_path(long), ".../file.c");
    }

    #[test]
    fn test_visible_row_count_matches_recursive_count_when_fully_expanded() {
        let mut view = sample();
        // Expand everything reachable.
        loop {
            let before = view.visible_rows().len();
            for index in 0..before {
                view.selected = index;
                if let Some(row) = view.selected_row() {
                    if row.has_children && !row.expanded {
                        view.toggle_selected();
                    }
                }
            }
            if view.visible_rows().len() == before {
                break;
            }
        }
        // Fully expanded tree shows every node; +1 is the root target row
        // rendered separately by the overlay.
        assert_eq!(view.visible_rows().len() + 1, view.data.total_nodes());
    }
}
