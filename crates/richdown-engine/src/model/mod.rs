//! # Document Model
//!
//! The data structures produced by the parser and consumed by everything
//! else: stable node identity, the row list that carries it, and the
//! block/inline tree.
//!
//! ## Identity
//!
//! A [`NodeId`] is assigned when a row of text is created and is never
//! reused or recomputed. Re-parsing unchanged rows yields the same ids,
//! which is what makes view reconciliation cheap and keeps cursor anchors
//! durable across re-renders. Compound blocks (blockquotes, lists, fenced
//! code) adopt their first row's id as the container key; ids are unique
//! among siblings at every tree level, which is the property reconciliation
//! keys on.

use serde::Serialize;
use uuid::Uuid;

/// Stable identifier for a block-level node.
///
/// Process-unique, assigned at creation, never recomputed on re-parse for
/// rows whose content is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single line of the buffer together with its stable identity.
///
/// Rows are the unit of cursor arithmetic and of id stability: the edit
/// engine splices rows, and the parser derives block ids from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: NodeId,
    pub text: String,
}

impl Row {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            text: text.into(),
        }
    }

    /// Length of the row text in runes (Unicode scalar values).
    pub fn len_runes(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits raw text into rows, one per line, each with a fresh id.
///
/// The empty string yields a single empty row: a document always has at
/// least one row.
pub fn rows_from(text: &str) -> Vec<Row> {
    text.split('\n').map(Row::new).collect()
}

/// The literal marker text of a node, as an ordered open/close pair.
///
/// `close` is empty for prefix-only markers (`"# "`) and for syntax-less
/// nodes both sides are empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Syntax {
    pub open: String,
    pub close: String,
}

impl Syntax {
    pub fn none() -> Self {
        Self::default()
    }

    /// Prefix-only syntax, e.g. `"# "` or a list marker.
    pub fn prefix(open: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: String::new(),
        }
    }

    /// Symmetric syntax wrapping content on both sides, e.g. `"**"`.
    pub fn wrap(marker: impl Into<String>) -> Self {
        let open = marker.into();
        Self {
            close: open.clone(),
            open,
        }
    }

    pub fn pair(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.close.is_empty()
    }
}

impl Serialize for Syntax {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        if self.is_empty() {
            return serializer.serialize_none();
        }
        let len = if self.close.is_empty() { 1 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.open)?;
        if !self.close.is_empty() {
            seq.serialize_element(&self.close)?;
        }
        seq.end()
    }
}

/// The kind of a list item, derived from its marker prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "component")]
pub enum ListKind {
    Unordered,
    Ordered,
    Todo { checked: bool },
}

/// Discriminates every node the parser can produce.
///
/// A closed enum: renderers and exports match exhaustively, so adding a
/// kind is a compile-time error everywhere it matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "component")]
pub enum NodeKind {
    // Block kinds
    Header { level: u8 },
    Paragraph,
    Blockquote,
    BlockquoteItem,
    List,
    ListItem { kind: ListKind, depth: usize },
    CodeBlock { lang: Option<String> },
    CodeLine,
    Break,
    // Inline kinds
    PlainText,
    Escape,
    Emphasis,
    Strong,
    StrongEmphasis,
    Strike,
    Code,
}

impl NodeKind {
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Header { .. }
                | NodeKind::Paragraph
                | NodeKind::Blockquote
                | NodeKind::BlockquoteItem
                | NodeKind::List
                | NodeKind::ListItem { .. }
                | NodeKind::CodeBlock { .. }
                | NodeKind::CodeLine
                | NodeKind::Break
        )
    }

    /// Container blocks hold one row-level child per buffer line.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Blockquote | NodeKind::List | NodeKind::CodeBlock { .. }
        )
    }
}

/// Node content: a leaf with none, a plain text run, or child nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Children {
    None,
    Text(String),
    Nodes(Vec<Node>),
}

impl Children {
    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }
}

/// A parsed document node.
///
/// Block-level nodes own an id (the reconciliation key); inline nodes do
/// not. `syntax` holds the literal marker text so the markdown projection
/// can reproduce the source exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: Option<NodeId>,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub syntax: Syntax,
    pub children: Children,
}

impl Node {
    pub fn block(id: NodeId, kind: NodeKind, syntax: Syntax, children: Children) -> Self {
        debug_assert!(kind.is_block());
        Self {
            id: Some(id),
            kind,
            syntax,
            children,
        }
    }

    pub fn inline(kind: NodeKind, syntax: Syntax, children: Children) -> Self {
        debug_assert!(!kind.is_block());
        Self {
            id: None,
            kind,
            syntax,
            children,
        }
    }

    pub fn text(run: impl Into<String>) -> Self {
        Self::inline(NodeKind::PlainText, Syntax::none(), Children::Text(run.into()))
    }

    /// Structural equality ignoring ids.
    ///
    /// Two parses of the same text are `same_shape` even though their rows
    /// carry different ids.
    pub fn same_shape(&self, other: &Node) -> bool {
        self.kind == other.kind
            && self.syntax == other.syntax
            && match (&self.children, &other.children) {
                (Children::None, Children::None) => true,
                (Children::Text(a), Children::Text(b)) => a == b,
                (Children::Nodes(a), Children::Nodes(b)) => {
                    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
                }
                _ => false,
            }
    }
}

/// Structural equality of two whole trees, ignoring ids.
pub fn same_shape(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn rows_from_splits_on_line_breaks() {
        let rows = rows_from("one\ntwo\nthree");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].text, "one");
        assert_eq!(rows[2].text, "three");
    }

    #[test]
    fn rows_from_empty_string_yields_one_empty_row() {
        let rows = rows_from("");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "");
    }

    #[test]
    fn rows_preserve_trailing_empty_line() {
        let rows = rows_from("one\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].text, "");
    }

    #[test]
    fn syntax_wrap_is_symmetric() {
        let s = Syntax::wrap("**");
        assert_eq!(s.open, "**");
        assert_eq!(s.close, "**");
    }

    #[test]
    fn same_shape_ignores_ids() {
        let a = Node::block(
            NodeId::new(),
            NodeKind::Paragraph,
            Syntax::none(),
            Children::Text("hi".into()),
        );
        let b = Node::block(
            NodeId::new(),
            NodeKind::Paragraph,
            Syntax::none(),
            Children::Text("hi".into()),
        );
        assert!(a.same_shape(&b));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn same_shape_detects_content_change() {
        let a = Node::text("hi");
        let b = Node::text("ho");
        assert!(!a.same_shape(&b));
    }

    #[test]
    fn row_rune_length_counts_scalars_not_bytes() {
        let row = Row::new("héllo");
        assert_eq!(row.len_runes(), 5);
        assert_eq!(row.text.len(), 6);
    }
}
