//! # Rendered View
//!
//! The toolkit-agnostic structural rendering of a node tree. A
//! [`ViewNode`] tree is what the reconciler patches and what the position
//! model walks; a concrete UI maps it to its own widgets, keeping the
//! node `id` as the stable key.
//!
//! A row element's textual content is exactly its buffer row (syntax
//! markers included), and row boundaries contribute one newline, so the
//! full view text always equals the buffer. Hiding a syntax marker
//! changes cursor targeting, never text length.

use crate::model::{Children, Node, NodeId, NodeKind};

/// How a tree is rendered into a view.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Render syntax markers as hidden (the read-only presentation).
    /// Hidden markers keep their literal length but are not valid cursor
    /// targets.
    pub hide_syntax: bool,
}

/// One node of the live view: an element or a text leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewNode {
    Element(ViewElement),
    Text(String),
}

/// An element of the live view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewElement {
    /// Reconciliation key; present on block-level elements.
    pub id: Option<NodeId>,
    /// Rendered syntax text excluded from valid cursor targets.
    pub hidden: bool,
    /// Children are block/row elements separated by newlines.
    pub rows: bool,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn element(id: Option<NodeId>, rows: bool, children: Vec<ViewNode>) -> Self {
        ViewNode::Element(ViewElement {
            id,
            hidden: false,
            rows,
            children,
        })
    }

    pub fn text(t: impl Into<String>) -> Self {
        ViewNode::Text(t.into())
    }

    fn syntax_span(marker: &str, hidden: bool) -> Self {
        ViewNode::Element(ViewElement {
            id: None,
            hidden,
            rows: false,
            children: vec![ViewNode::Text(marker.to_string())],
        })
    }
}

/// Abstract interface over a live rendered view.
///
/// The position model and reconciler are written against this trait so
/// any concrete UI toolkit can participate by exposing its own node
/// classification.
pub trait RenderedView: Sized {
    fn children(&self) -> &[Self];
    /// `Some` for text leaves.
    fn text(&self) -> Option<&str>;
    fn is_hidden(&self) -> bool;
    fn id(&self) -> Option<NodeId>;
    /// Whether children are row/block elements separated by newlines.
    fn is_rows(&self) -> bool;

    /// Rune length of the subtree's text, including internal row breaks.
    fn text_len(&self) -> usize {
        if let Some(t) = self.text() {
            return t.chars().count();
        }
        let children = self.children();
        let breaks = if self.is_rows() && !children.is_empty() {
            children.len() - 1
        } else {
            0
        };
        children.iter().map(Self::text_len).sum::<usize>() + breaks
    }
}

impl RenderedView for ViewNode {
    fn children(&self) -> &[Self] {
        match self {
            ViewNode::Element(el) => &el.children,
            ViewNode::Text(_) => &[],
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            ViewNode::Text(t) => Some(t),
            ViewNode::Element(_) => None,
        }
    }

    fn is_hidden(&self) -> bool {
        matches!(self, ViewNode::Element(el) if el.hidden)
    }

    fn id(&self) -> Option<NodeId> {
        match self {
            ViewNode::Element(el) => el.id,
            ViewNode::Text(_) => None,
        }
    }

    fn is_rows(&self) -> bool {
        matches!(self, ViewNode::Element(el) if el.rows)
    }
}

/// Renders a tree into a view rooted at a single rows-element.
pub fn render(tree: &[Node], opts: RenderOptions) -> ViewNode {
    let children = tree.iter().map(|node| render_node(node, opts)).collect();
    ViewNode::element(None, true, children)
}

fn render_node(node: &Node, opts: RenderOptions) -> ViewNode {
    if node.kind.is_container() {
        // Container syntax lives on the row children (fence lines carry
        // their own markers), so only the children render here.
        let children = match &node.children {
            Children::Nodes(items) => items.iter().map(|item| render_node(item, opts)).collect(),
            _ => Vec::new(),
        };
        return ViewNode::Element(ViewElement {
            id: node.id,
            hidden: false,
            rows: true,
            children,
        });
    }

    if node.kind == NodeKind::PlainText {
        return match &node.children {
            Children::Text(t) => ViewNode::text(t.clone()),
            _ => ViewNode::text(""),
        };
    }

    let mut children = Vec::new();
    if !node.syntax.open.is_empty() {
        children.push(ViewNode::syntax_span(&node.syntax.open, opts.hide_syntax));
    }
    match &node.children {
        Children::None => {}
        Children::Text(t) => children.push(ViewNode::text(t.clone())),
        Children::Nodes(nodes) => {
            children.extend(nodes.iter().map(|child| render_node(child, opts)));
        }
    }
    if !node.syntax.close.is_empty() {
        children.push(ViewNode::syntax_span(&node.syntax.close, opts.hide_syntax));
    }

    ViewNode::Element(ViewElement {
        id: node.id,
        hidden: false,
        rows: false,
        children,
    })
}

/// Reads the full text back out of a view, newlines at row boundaries.
///
/// Hidden markers still contribute their literal text; visibility only
/// affects cursor targeting.
pub fn view_text<V: RenderedView>(view: &V) -> String {
    let mut out = String::new();
    collect_text(view, &mut out);
    out
}

fn collect_text<V: RenderedView>(view: &V, out: &mut String) {
    if let Some(t) = view.text() {
        out.push_str(t);
        return;
    }
    let children = view.children();
    for (k, child) in children.iter().enumerate() {
        collect_text(child, out);
        if view.is_rows() && k + 1 < children.len() {
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn view_text_equals_buffer() {
        let text = "# Title\nBody *em* text\n> quote\n- item\n```rust\ncode\n```\n---";
        let view = render(&parse(text), RenderOptions::default());
        assert_eq!(view_text(&view), text);
    }

    #[test]
    fn hidden_markers_keep_their_length() {
        let text = "# Title\n**bold**";
        let shown = render(&parse(text), RenderOptions::default());
        let hidden = render(&parse(text), RenderOptions { hide_syntax: true });
        assert_eq!(shown.text_len(), hidden.text_len());
        assert_eq!(view_text(&hidden), text);
    }

    #[test]
    fn block_elements_carry_their_row_ids() {
        let tree = parse("# Title\nBody");
        let view = render(&tree, RenderOptions::default());
        let blocks = view.children();
        assert_eq!(blocks[0].id(), tree[0].id);
        assert_eq!(blocks[1].id(), tree[1].id);
    }

    #[test]
    fn container_rows_are_keyed_elements() {
        let tree = parse("> a\n> b");
        let view = render(&tree, RenderOptions::default());
        let quote = &view.children()[0];
        assert!(quote.is_rows());
        assert_eq!(quote.children().len(), 2);
        assert!(quote.children().iter().all(|row| row.id().is_some()));
    }

    #[test]
    fn text_len_counts_runes_and_row_breaks() {
        let view = render(&parse("ab\ncd"), RenderOptions::default());
        assert_eq!(view.text_len(), 5);
    }
}
