//! # Reconciler
//!
//! Computes the minimal mutation sequence that transforms a live view
//! into the shape of a target view, then applies it. The diff is a keyed
//! list comparison restricted to one level of children at a time,
//! recursing into matched pairs, so untouched subtrees (and the cursor
//! anchors inside them) are never disturbed.
//!
//! The diff is pure: it returns a [`PatchOp`] list that a separate
//! [`apply`] step executes, which keeps the algorithm independently
//! testable and lets a concrete toolkit translate ops into its own
//! mutations. Each op's path addresses the view as left by the ops
//! before it.

use crate::view::{RenderedView, ViewNode};

/// A single structural mutation of the live view.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    /// Insert a subtree at `at` within the element addressed by `path`.
    Insert {
        path: Vec<usize>,
        at: usize,
        node: ViewNode,
    },
    /// Remove the child at `at` within the element addressed by `path`.
    Remove { path: Vec<usize>, at: usize },
    /// Replace the content of the text leaf addressed by `path`.
    ///
    /// An id-stable node whose text changed is patched in place rather
    /// than removed and re-inserted, which is what keeps a live cursor
    /// anchored inside edited content.
    UpdateText { path: Vec<usize>, text: String },
}

/// Diffs `live` against `target` and returns the mutation list.
pub fn diff(live: &ViewNode, target: &ViewNode) -> Vec<PatchOp> {
    let mut ops = Vec::new();
    let mut scratch = live.clone();
    diff_children(&mut scratch, target, &mut Vec::new(), &mut ops);
    ops
}

/// Applies a mutation list in order.
pub fn apply(live: &mut ViewNode, ops: &[PatchOp]) {
    for op in ops {
        match op {
            PatchOp::Insert { path, at, node } => {
                let children = children_mut(live, path);
                children.insert(*at, node.clone());
            }
            PatchOp::Remove { path, at } => {
                let children = children_mut(live, path);
                children.remove(*at);
            }
            PatchOp::UpdateText { path, text } => {
                if let ViewNode::Text(t) = node_mut(live, path) {
                    *t = text.clone();
                }
            }
        }
    }
}

/// Patches `live` to match `target` and returns the mutation count.
pub fn reconcile(live: &mut ViewNode, target: &ViewNode) -> usize {
    let ops = diff(live, target);
    apply(live, &ops);
    ops.len()
}

fn node_mut<'a>(root: &'a mut ViewNode, path: &[usize]) -> &'a mut ViewNode {
    let mut node = root;
    for &idx in path {
        let ViewNode::Element(el) = node else {
            unreachable!("patch paths address elements");
        };
        node = &mut el.children[idx];
    }
    node
}

fn children_mut<'a>(root: &'a mut ViewNode, path: &[usize]) -> &'a mut Vec<ViewNode> {
    let ViewNode::Element(el) = node_mut(root, path) else {
        unreachable!("patch paths address elements");
    };
    &mut el.children
}

fn diff_children(
    live: &mut ViewNode,
    target: &ViewNode,
    path: &mut Vec<usize>,
    ops: &mut Vec<PatchOp>,
) {
    let target_children = target.children();
    let target_ids: Vec<_> = target_children.iter().filter_map(RenderedView::id).collect();

    let ViewNode::Element(el) = live else {
        return;
    };

    let mut at = 0;
    for t in target_children {
        // Evict keyed live children that no longer exist in the target
        // before considering the next target child.
        while at < el.children.len() {
            match el.children[at].id() {
                Some(id) if !target_ids.contains(&id) => {
                    el.children.remove(at);
                    ops.push(PatchOp::Remove {
                        path: path.clone(),
                        at,
                    });
                }
                _ => break,
            }
        }

        match t.id() {
            Some(id) => {
                match el.children.iter().position(|c| c.id() == Some(id)) {
                    Some(found) if found == at => {
                        // Matched in place: recurse, no mutation.
                        path.push(at);
                        diff_children(&mut el.children[at], t, path, ops);
                        path.pop();
                    }
                    Some(found) => {
                        // Out of order: re-home the target subtree. Row
                        // splices never reorder surviving rows, so this
                        // path only covers pathological inputs.
                        el.children.remove(found);
                        ops.push(PatchOp::Remove {
                            path: path.clone(),
                            at: found,
                        });
                        el.children.insert(at, t.clone());
                        ops.push(PatchOp::Insert {
                            path: path.clone(),
                            at,
                            node: t.clone(),
                        });
                    }
                    None => {
                        el.children.insert(at, t.clone());
                        ops.push(PatchOp::Insert {
                            path: path.clone(),
                            at,
                            node: t.clone(),
                        });
                    }
                }
            }
            None => {
                // Unkeyed content is compared by structural position.
                diff_positional(el, at, t, path, ops);
            }
        }
        at += 1;
    }

    while el.children.len() > at {
        el.children.remove(at);
        ops.push(PatchOp::Remove {
            path: path.clone(),
            at,
        });
    }
}

fn diff_positional(
    el: &mut crate::view::ViewElement,
    at: usize,
    target: &ViewNode,
    path: &mut Vec<usize>,
    ops: &mut Vec<PatchOp>,
) {
    enum Action {
        Retain,
        PatchText(String),
        Recurse,
        Replace,
        Insert,
    }

    let action = match (el.children.get(at), target) {
        (Some(ViewNode::Text(live_text)), ViewNode::Text(target_text)) => {
            if live_text == target_text {
                Action::Retain
            } else {
                Action::PatchText(target_text.clone())
            }
        }
        (Some(ViewNode::Element(live_el)), ViewNode::Element(target_el))
            if live_el.id.is_none()
                && live_el.hidden == target_el.hidden
                && live_el.rows == target_el.rows =>
        {
            Action::Recurse
        }
        (Some(_), _) => Action::Replace,
        (None, _) => Action::Insert,
    };

    match action {
        Action::Retain => {}
        Action::PatchText(text) => {
            if let ViewNode::Text(live_text) = &mut el.children[at] {
                *live_text = text.clone();
            }
            path.push(at);
            ops.push(PatchOp::UpdateText {
                path: path.clone(),
                text,
            });
            path.pop();
        }
        Action::Recurse => {
            path.push(at);
            diff_children(&mut el.children[at], target, path, ops);
            path.pop();
        }
        Action::Replace => {
            el.children.remove(at);
            ops.push(PatchOp::Remove {
                path: path.clone(),
                at,
            });
            el.children.insert(at, target.clone());
            ops.push(PatchOp::Insert {
                path: path.clone(),
                at,
                node: target.clone(),
            });
        }
        Action::Insert => {
            el.children.insert(at, target.clone());
            ops.push(PatchOp::Insert {
                path: path.clone(),
                at,
                node: target.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeId;
    use crate::parsing::parse;
    use crate::view::{RenderOptions, render};
    use pretty_assertions::assert_eq;

    fn keyed(id: NodeId, text: &str) -> ViewNode {
        ViewNode::element(Some(id), false, vec![ViewNode::text(text)])
    }

    fn root(children: Vec<ViewNode>) -> ViewNode {
        ViewNode::element(None, true, children)
    }

    #[test]
    fn identical_trees_cost_zero() {
        let a = NodeId::new();
        let b = NodeId::new();
        let mut live = root(vec![keyed(a, "A"), keyed(b, "B")]);
        let target = live.clone();
        assert_eq!(reconcile(&mut live, &target), 0);
        assert_eq!(live, target);
    }

    #[test]
    fn removing_the_first_child_costs_one() {
        let (a, b, c) = (NodeId::new(), NodeId::new(), NodeId::new());
        let mut live = root(vec![keyed(a, "A"), keyed(b, "B"), keyed(c, "C")]);
        let target = root(vec![keyed(b, "B"), keyed(c, "C")]);
        assert_eq!(reconcile(&mut live, &target), 1);
        assert_eq!(live, target);
    }

    #[test]
    fn removing_a_middle_child_costs_one() {
        let (a, b, c) = (NodeId::new(), NodeId::new(), NodeId::new());
        let mut live = root(vec![keyed(a, "A"), keyed(b, "B"), keyed(c, "C")]);
        let target = root(vec![keyed(a, "A"), keyed(c, "C")]);
        assert_eq!(reconcile(&mut live, &target), 1);
        assert_eq!(live, target);
    }

    #[test]
    fn inserting_at_the_front_costs_one() {
        let (a, b, c) = (NodeId::new(), NodeId::new(), NodeId::new());
        let mut live = root(vec![keyed(b, "B"), keyed(c, "C")]);
        let target = root(vec![keyed(a, "A"), keyed(b, "B"), keyed(c, "C")]);
        assert_eq!(reconcile(&mut live, &target), 1);
        assert_eq!(live, target);
    }

    #[test]
    fn id_stable_text_change_is_patched_in_place() {
        let (a, b) = (NodeId::new(), NodeId::new());
        let mut live = root(vec![keyed(a, "A"), keyed(b, "B")]);
        let target = root(vec![keyed(a, "A!"), keyed(b, "B")]);
        let ops = diff(&live, &target);
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], PatchOp::UpdateText { .. }));
        apply(&mut live, &ops);
        assert_eq!(live, target);
    }

    #[test]
    fn trailing_removals_cost_one_each() {
        let (a, b, c) = (NodeId::new(), NodeId::new(), NodeId::new());
        let mut live = root(vec![keyed(a, "A"), keyed(b, "B"), keyed(c, "C")]);
        let target = root(vec![keyed(a, "A")]);
        assert_eq!(reconcile(&mut live, &target), 2);
        assert_eq!(live, target);
    }

    #[test]
    fn empty_to_populated_and_back() {
        let a = NodeId::new();
        let mut live = root(vec![]);
        let target = root(vec![keyed(a, "A")]);
        assert_eq!(reconcile(&mut live, &target), 1);
        assert_eq!(live, target);

        let empty = root(vec![]);
        assert_eq!(reconcile(&mut live, &empty), 1);
        assert_eq!(live, empty);
    }

    #[test]
    fn rendered_parse_trees_reconcile_to_equality() {
        let before = parse("# Title\nBody");
        let mut live = render(&before, RenderOptions::default());
        let after = parse("# Title\nBody edited\nNew row");
        let target = render(&after, RenderOptions::default());
        let count = reconcile(&mut live, &target);
        assert_eq!(live, target);
        assert!(count > 0);
    }

    #[test]
    fn unchanged_rows_are_not_touched_across_an_edit() {
        use crate::model::rows_from;
        use crate::parsing::parse_rows;

        let mut rows = rows_from("# Title\nBody\nTail");
        let mut live = render(&parse_rows(&rows), RenderOptions::default());

        // Edit only the middle row, keeping its id.
        rows[1].text = "Body edited".to_string();
        let target = render(&parse_rows(&rows), RenderOptions::default());

        let ops = diff(&live, &target);
        // One in-place text patch; header and tail rows untouched.
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], PatchOp::UpdateText { .. }));
        apply(&mut live, &ops);
        assert_eq!(live, target);
    }

    #[test]
    fn splitting_a_row_inserts_exactly_the_new_rows() {
        use crate::model::{Row, rows_from};
        use crate::parsing::parse_rows;

        let rows = rows_from("# Title\nBody");
        let mut live = render(&parse_rows(&rows), RenderOptions::default());

        // Simulate an enter press at the end of "# Title": one new empty
        // row spliced between the two existing rows.
        let mut after = rows.clone();
        after.insert(1, Row::new(""));
        let target = render(&parse_rows(&after), RenderOptions::default());

        let ops = diff(&live, &target);
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], PatchOp::Insert { .. }));
        apply(&mut live, &ops);
        assert_eq!(live, target);
    }
}
