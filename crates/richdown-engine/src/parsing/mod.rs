//! # Parsing
//!
//! Two passes turn raw text into a typed node tree:
//!
//! 1. **Block pass** (`blocks`): rows are classified by a prefix scan and
//!    multi-row constructs accumulate into single block nodes.
//! 2. **Inline pass** (`inline`): each block's content string is scanned
//!    left to right with one lookahead dispatch per rune.
//!
//! Parsing is pure, deterministic, and total: malformed markers degrade
//! to plain text, never to an error.

pub mod blocks;
pub mod inline;

pub use blocks::parse_rows;
pub use inline::parse_inline;

use crate::model::{Node, rows_from};

/// Parses raw text into block nodes with freshly generated row ids.
///
/// Id preservation across edits is the edit engine's job: it splices rows
/// and re-runs [`parse_rows`], which derives ids from the rows it is
/// given.
pub fn parse(text: &str) -> Vec<Node> {
    parse_rows(&rows_from(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Children, NodeKind, same_shape};

    #[test]
    fn parse_is_deterministic_in_shape() {
        let text = "# h\n*em* plain\n> q";
        assert!(same_shape(&parse(text), &parse(text)));
    }

    #[test]
    fn markerless_text_is_one_plain_paragraph_per_line() {
        let text = "just some text\nand another line";
        for (node, line) in parse(text).iter().zip(text.split('\n')) {
            assert_eq!(node.kind, NodeKind::Paragraph);
            assert_eq!(node.children, Children::Text(line.into()));
        }
    }
}
