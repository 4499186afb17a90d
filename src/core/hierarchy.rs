//! Device-group hierarchy tree
//!
//! The backend reports each firewall's location as an ordered path from the
//! top-level device group down to the firewall. [`build_tree`] turns that path
//! into a chain of nodes and [`rows`] flattens the chain into display rows
//! according to a [`HierarchyView`] (expanded paths plus the selection).
//!
//! Node paths are the segment names joined with `/`, so `["Global", "EU",
//! "fw-01"]` yields nodes at `Global`, `Global/EU` and `Global/EU/fw-01`.

use std::collections::BTreeSet;

use super::objects::FirewallPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    pub name: String,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    fn leaf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes along the chain, including this one
    pub fn depth(&self) -> usize {
        let mut count = 1;
        let mut current = self;
        while let Some(child) = current.children.first() {
            count += 1;
            current = child;
        }
        count
    }
}

/// Builds a linear chain from an ordered path. Each segment becomes the sole
/// child of the previous one; an empty path has no tree.
pub fn build_tree<S: AsRef<str>>(path: &[S]) -> Option<HierarchyNode> {
    // Built leaf-first so no recursion or parent pointers are needed
    path.iter().rev().fold(None, |child, segment| {
        let mut node = HierarchyNode::leaf(segment.as_ref());
        node.children.extend(child);
        Some(node)
    })
}

/// Every prefix of `path` as a joined node path, root first.
pub fn expanded_chain<S: AsRef<str>>(path: &[S]) -> BTreeSet<String> {
    let mut prefixes = BTreeSet::new();
    let mut current = String::new();
    for segment in path {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment.as_ref());
        prefixes.insert(current.clone());
    }
    prefixes
}

/// Finds the hierarchy entry for a firewall hostname
pub fn find_firewall<'a>(firewalls: &'a [FirewallPath], hostname: &str) -> Option<&'a FirewallPath> {
    firewalls.iter().find(|fw| fw.hostname == hostname)
}

/// Actions the user can perform on the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyAction {
    /// Flip the expansion of a node path
    Toggle(String),
    /// Make a node path the selection
    Select(String),
    /// Expand every prefix of a freshly loaded path
    ExpandChain(Vec<String>),
    /// Forget expansion and selection
    Reset,
}

/// Expansion and selection state, independent of the tree itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyView {
    pub expanded: BTreeSet<String>,
    pub selected: Option<String>,
}

impl HierarchyView {
    #[must_use]
    pub fn apply(mut self, action: HierarchyAction) -> Self {
        match action {
            HierarchyAction::Toggle(path) => {
                if !self.expanded.remove(&path) {
                    self.expanded.insert(path);
                }
            }
            HierarchyAction::Select(path) => self.selected = Some(path),
            HierarchyAction::ExpandChain(segments) => {
                self.expanded.extend(expanded_chain(&segments));
            }
            HierarchyAction::Reset => {
                self.expanded.clear();
                self.selected = None;
            }
        }
        self
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected.as_deref() == Some(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Expanded,
    Collapsed,
}

impl Indicator {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Expanded => "▼",
            Self::Collapsed => "▶",
        }
    }
}

/// Marker drawn in place of an indicator for leaf nodes
pub const LEAF_GLYPH: &str = "•";

/// One visible line of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow<'a> {
    pub name: &'a str,
    pub depth: usize,
    pub path: String,
    /// `None` for nodes without children
    pub indicator: Option<Indicator>,
    pub selected: bool,
}

impl TreeRow<'_> {
    /// Action for a click on the expand/collapse indicator
    pub fn on_indicator(&self) -> Option<HierarchyAction> {
        self.indicator
            .map(|_| HierarchyAction::Toggle(self.path.clone()))
    }

    /// Action for a click on the label
    pub fn on_label(&self) -> HierarchyAction {
        HierarchyAction::Select(self.path.clone())
    }

    pub fn glyph(&self) -> &'static str {
        self.indicator.map_or(LEAF_GLYPH, Indicator::glyph)
    }
}

/// Lazily yields the visible rows of `tree` in pre-order.
///
/// The iterator holds an explicit stack, so chains of any depth are walked
/// without recursion. Cloning it (or calling `rows` again) restarts the walk.
pub fn rows<'t, 'v>(tree: &'t HierarchyNode, view: &'v HierarchyView) -> Rows<'t, 'v> {
    Rows {
        view,
        stack: vec![(tree, 0, String::new())],
    }
}

#[derive(Debug, Clone)]
pub struct Rows<'t, 'v> {
    view: &'v HierarchyView,
    stack: Vec<(&'t HierarchyNode, usize, String)>,
}

/// Rows borrow only from the tree, so the view can be replaced mid-walk
impl<'t> Iterator for Rows<'t, '_> {
    type Item = TreeRow<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth, parent) = self.stack.pop()?;
        let path = if parent.is_empty() {
            node.name.clone()
        } else {
            format!("{parent}/{}", node.name)
        };

        let expanded = self.view.is_expanded(&path);
        let indicator = node.has_children().then_some(if expanded {
            Indicator::Expanded
        } else {
            Indicator::Collapsed
        });

        if expanded {
            // Reversed so the first child is popped first
            for child in node.children.iter().rev() {
                self.stack.push((child, depth + 1, path.clone()));
            }
        }

        Some(TreeRow {
            name: &node.name,
            depth,
            selected: self.view.is_selected(&path),
            path,
            indicator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> HierarchyNode {
        build_tree(&["Global", "EU", "fw-01"]).unwrap()
    }

    #[test]
    fn test_build_tree_empty() {
        let empty: [&str; 0] = [];
        assert!(build_tree(&empty).is_none());
    }

    #[test]
    fn test_build_tree_chain() {
        let tree = chain();
        assert_eq!(tree.name, "Global");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "EU");
        assert_eq!(tree.children[0].children[0].name, "fw-01");
        assert!(tree.children[0].children[0].children.is_empty());
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_build_tree_single() {
        let tree = build_tree(&["shared"]).unwrap();
        assert_eq!(tree.name, "shared");
        assert!(!tree.has_children());
    }

    #[test]
    fn test_expanded_chain_prefixes() {
        let set = expanded_chain(&["a", "b", "c"]);
        let expected: BTreeSet<String> = ["a", "a/b", "a/b/c"].iter().map(|s| (*s).to_string()).collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_collapsed_root_renders_one_row() {
        let tree = chain();
        let view = HierarchyView::default();
        let rendered: Vec<_> = rows(&tree, &view).collect();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].indicator, Some(Indicator::Collapsed));
        assert_eq!(rendered[0].glyph(), "▶");
    }

    #[test]
    fn test_fully_expanded_chain() {
        let tree = chain();
        let view = HierarchyView::default()
            .apply(HierarchyAction::ExpandChain(vec!["Global".into(), "EU".into(), "fw-01".into()]));
        let rendered: Vec<_> = rows(&tree, &view).collect();

        let depths: Vec<usize> = rendered.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        let paths: Vec<&str> = rendered.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["Global", "Global/EU", "Global/EU/fw-01"]);
        assert_eq!(rendered[0].indicator, Some(Indicator::Expanded));
        assert_eq!(rendered[1].indicator, Some(Indicator::Expanded));
        assert_eq!(rendered[2].indicator, None);
        assert_eq!(rendered[2].glyph(), LEAF_GLYPH);
        assert!(rendered[2].on_indicator().is_none());
    }

    #[test]
    fn test_toggle_twice_restores() {
        let view = HierarchyView::default();
        let toggled = view
            .clone()
            .apply(HierarchyAction::Toggle("Global".into()))
            .apply(HierarchyAction::Toggle("Global".into()));
        assert_eq!(toggled, view);
    }

    #[test]
    fn test_label_click_selects_without_expanding() {
        let tree = chain();
        let view = HierarchyView::default();
        let row = rows(&tree, &view).next().unwrap();
        let view = view.apply(row.on_label());

        assert_eq!(view.selected.as_deref(), Some("Global"));
        assert!(view.expanded.is_empty());
        assert!(rows(&tree, &view).next().unwrap().selected);
    }

    #[test]
    fn test_indicator_click_toggles() {
        let tree = chain();
        let view = HierarchyView::default();
        let action = rows(&tree, &view).next().unwrap().on_indicator().unwrap();
        let view = view.apply(action);
        assert_eq!(rows(&tree, &view).count(), 2);
    }

    #[test]
    fn test_selection_last_click_wins() {
        let view = HierarchyView::default()
            .apply(HierarchyAction::Select("Global".into()))
            .apply(HierarchyAction::Select("Global/EU".into()));
        assert!(view.is_selected("Global/EU"));
        assert!(!view.is_selected("Global"));
    }

    #[test]
    fn test_reset_clears_state() {
        let view = HierarchyView::default()
            .apply(HierarchyAction::ExpandChain(vec!["a".into()]))
            .apply(HierarchyAction::Select("a".into()))
            .apply(HierarchyAction::Reset);
        assert_eq!(view, HierarchyView::default());
    }

    #[test]
    fn test_rows_are_restartable() {
        let tree = chain();
        let view = HierarchyView {
            expanded: expanded_chain(&["Global"]),
            selected: None,
        };
        let iter = rows(&tree, &view);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let segments: Vec<String> = (0..2_000).map(|i| format!("dg{i}")).collect();
        let tree = build_tree(&segments).unwrap();
        assert_eq!(tree.depth(), 2_000);
        let view = HierarchyView {
            expanded: expanded_chain(&segments),
            selected: None,
        };
        assert_eq!(rows(&tree, &view).count(), 2_000);
        // Iterative drop for the nested chain
        let mut node = Some(tree);
        while let Some(mut n) = node {
            node = n.children.pop();
        }
    }

    #[test]
    fn test_find_firewall() {
        let firewalls = vec![
            FirewallPath {
                hostname: "fw-01".into(),
                path: vec!["Global".into(), "fw-01".into()],
            },
            FirewallPath {
                hostname: "fw-02".into(),
                path: vec!["Global".into()],
            },
        ];
        assert_eq!(find_firewall(&firewalls, "fw-02").unwrap().path.len(), 1);
        assert!(find_firewall(&firewalls, "fw-03").is_none());
    }
}
