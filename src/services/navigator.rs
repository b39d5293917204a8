use serde::Serialize;

use crate::models::{Amount, BudgetNode, BudgetTree, DrillPath, YearlyBudget};

/// Name of the synthesized node standing for the whole year.
pub const TOTAL_LABEL: &str = "總計";

/// Borrowed view of a resolved node, or of the virtual root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeView<'a> {
    pub name: &'a str,
    pub value: Amount,
    pub children: &'a [BudgetNode],
}

impl<'a> NodeView<'a> {
    fn of(node: &'a BudgetNode) -> Self {
        Self {
            name: &node.name,
            value: node.value,
            children: &node.children,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Children ordered by value, largest first. Equal values keep tree order.
    pub fn sorted_children(&self) -> Vec<&'a BudgetNode> {
        let mut sorted: Vec<&BudgetNode> = self.children.iter().collect();
        sorted.sort_by(|a, b| Amount::cmp_desc(&a.value, &b.value));
        sorted
    }
}

/// Resolve `path` against one year's tree by name, first match at each step.
///
/// `None` means the path does not exist in this tree, which is expected when
/// a selection made in one year is looked up in another.
pub fn resolve<'a>(
    tree: &'a BudgetTree,
    total: Amount,
    path: &DrillPath,
) -> Option<NodeView<'a>> {
    let Some((first, rest)) = path.segments().split_first() else {
        return Some(NodeView {
            name: TOTAL_LABEL,
            value: total,
            children: &tree.roots,
        });
    };

    let mut node = tree.root(first)?;
    for name in rest {
        node = node.child(name)?;
    }
    Some(NodeView::of(node))
}

pub fn resolve_year<'a>(budget: &'a YearlyBudget, path: &DrillPath) -> Option<NodeView<'a>> {
    resolve(&budget.tree, budget.total_amount, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    fn amt(v: f64) -> Amount {
        Amount::new(v, Unit::ThousandNtd)
    }

    fn tree() -> BudgetTree {
        BudgetTree::from_roots(vec![
            BudgetNode::with_children(
                "一般政務支出",
                amt(30.0),
                vec![
                    BudgetNode::leaf("行政支出", amt(5.0)),
                    BudgetNode::leaf("立法支出", amt(20.0)),
                    BudgetNode::leaf("司法支出", amt(5.0)),
                ],
            ),
            BudgetNode::leaf("國防支出", amt(50.0)),
        ])
    }

    #[test]
    fn test_empty_path_is_virtual_root() {
        let tree = tree();
        let view = resolve(&tree, amt(123.0), &DrillPath::root()).unwrap();
        assert_eq!(view.name, TOTAL_LABEL);
        assert_eq!(view.value, amt(123.0));
        assert_eq!(view.children, tree.roots.as_slice());
    }

    #[test]
    fn test_resolves_nested_path() {
        let tree = tree();
        let path = DrillPath::new(["一般政務支出", "立法支出"]);
        let view = resolve(&tree, amt(0.0), &path).unwrap();
        assert_eq!(view.name, "立法支出");
        assert_eq!(view.value, amt(20.0));
        assert!(!view.has_children());
    }

    #[test]
    fn test_missing_segment_returns_none() {
        let tree = tree();
        assert!(resolve(&tree, amt(0.0), &DrillPath::new(["不存在"])).is_none());
        assert!(resolve(&tree, amt(0.0), &DrillPath::new(["國防支出", "陸軍"])).is_none());
    }

    #[test]
    fn test_sorted_children_is_read_only_and_stable() {
        let tree = tree();
        let view = resolve(&tree, amt(0.0), &DrillPath::new(["一般政務支出"])).unwrap();
        let names: Vec<&str> = view
            .sorted_children()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["立法支出", "行政支出", "司法支出"]);
        // Stored order untouched
        assert_eq!(tree.roots[0].children[0].name, "行政支出");
    }

    #[test]
    fn test_duplicate_names_resolve_to_first_match() {
        let tree = BudgetTree::from_roots(vec![
            BudgetNode::leaf("補助", amt(1.0)),
            BudgetNode::leaf("補助", amt(2.0)),
        ]);
        let view = resolve(&tree, amt(0.0), &DrillPath::new(["補助"])).unwrap();
        assert_eq!(view.value, amt(1.0));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let tree = tree();
        let path = DrillPath::new(["一般政務支出"]);
        let first = resolve(&tree, amt(80.0), &path);
        let second = resolve(&tree, amt(80.0), &path);
        assert_eq!(first, second);
    }
}
