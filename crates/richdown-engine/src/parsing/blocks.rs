//! Block parsing: classifies each row by a prefix scan and accumulates
//! multi-row constructs (blockquotes, lists, fenced code) into single
//! block nodes.
//!
//! Block ids are carried by the rows themselves, so re-parsing unchanged
//! rows reproduces the same ids. Compound blocks adopt their first row's
//! id as the container key.

use crate::model::{Children, ListKind, Node, NodeKind, Row, Syntax};
use crate::parsing::inline::parse_inline;

/// Parses a row list into an ordered sequence of block nodes.
///
/// Total: every row ends up in exactly one block, and malformed markers
/// degrade to paragraphs.
pub fn parse_rows(rows: &[Row]) -> Vec<Node> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < rows.len() {
        let row = &rows[i];

        if let Some((level, marker)) = header_marker(&row.text) {
            let rest = &row.text[marker.len()..];
            out.push(Node::block(
                row.id,
                NodeKind::Header { level },
                Syntax::prefix(marker),
                parse_inline(rest),
            ));
            i += 1;
            continue;
        }

        if quote_marker(&row.text).is_some() {
            let first = row.id;
            let mut items = Vec::new();
            while i < rows.len() {
                let Some(marker) = quote_marker(&rows[i].text) else {
                    break;
                };
                let rest = &rows[i].text[marker.len()..];
                items.push(Node::block(
                    rows[i].id,
                    NodeKind::BlockquoteItem,
                    Syntax::prefix(marker),
                    parse_inline(rest),
                ));
                i += 1;
            }
            out.push(Node::block(
                first,
                NodeKind::Blockquote,
                Syntax::none(),
                Children::Nodes(items),
            ));
            continue;
        }

        if list_marker(&row.text).is_some() {
            let first = row.id;
            let mut items = Vec::new();
            while i < rows.len() {
                let Some((kind, depth, marker)) = list_marker(&rows[i].text) else {
                    break;
                };
                let rest = &rows[i].text[marker.len()..];
                items.push(Node::block(
                    rows[i].id,
                    NodeKind::ListItem { kind, depth },
                    Syntax::prefix(marker),
                    parse_inline(rest),
                ));
                i += 1;
            }
            out.push(Node::block(
                first,
                NodeKind::List,
                Syntax::none(),
                Children::Nodes(items),
            ));
            continue;
        }

        if let Some(lang) = fence_open(&row.text) {
            // A fence only forms a code block when a closing fence row
            // exists; otherwise the opening row degrades to a paragraph.
            if let Some(close) = (i + 1..rows.len()).find(|&j| rows[j].text == "```") {
                let mut lines = Vec::new();
                lines.push(Node::block(
                    rows[i].id,
                    NodeKind::CodeLine,
                    Syntax::prefix(rows[i].text.clone()),
                    Children::None,
                ));
                for line in &rows[i + 1..close] {
                    lines.push(Node::block(
                        line.id,
                        NodeKind::CodeLine,
                        Syntax::none(),
                        Children::Text(line.text.clone()),
                    ));
                }
                lines.push(Node::block(
                    rows[close].id,
                    NodeKind::CodeLine,
                    Syntax::prefix("```"),
                    Children::None,
                ));
                out.push(Node::block(
                    rows[i].id,
                    NodeKind::CodeBlock { lang },
                    Syntax::pair(rows[i].text.clone(), "```"),
                    Children::Nodes(lines),
                ));
                i = close + 1;
                continue;
            }
        }

        if row.text == "---" {
            out.push(Node::block(
                row.id,
                NodeKind::Break,
                Syntax::prefix("---"),
                Children::None,
            ));
            i += 1;
            continue;
        }

        out.push(Node::block(
            row.id,
            NodeKind::Paragraph,
            Syntax::none(),
            parse_inline(&row.text),
        ));
        i += 1;
    }
    out
}

/// ATX heading marker: one to six `#` followed by a space.
fn header_marker(text: &str) -> Option<(u8, String)> {
    let hashes = text.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) && text[hashes..].starts_with(' ') {
        Some((hashes as u8, text[..hashes + 1].to_string()))
    } else {
        None
    }
}

/// Blockquote marker: `>` with or without a following space.
fn quote_marker(text: &str) -> Option<String> {
    if text.starts_with("> ") {
        Some("> ".to_string())
    } else if text.starts_with('>') {
        Some(">".to_string())
    } else {
        None
    }
}

/// List marker with tracked nesting depth: indentation (tabs, or spaces at
/// two per level) followed by `- `, `- [ ] `, `- [x] `, or `N. `.
fn list_marker(text: &str) -> Option<(ListKind, usize, String)> {
    let indent_len = text.len() - text.trim_start_matches(['\t', ' ']).len();
    let indent = &text[..indent_len];
    let rest = &text[indent_len..];
    let depth = if indent.contains('\t') {
        indent.chars().filter(|&c| c == '\t').count()
    } else {
        indent.len() / 2
    };

    if rest.starts_with("- [ ] ") {
        return Some((ListKind::Todo { checked: false }, depth, text[..indent_len + 6].to_string()));
    }
    if rest.starts_with("- [x] ") {
        return Some((ListKind::Todo { checked: true }, depth, text[..indent_len + 6].to_string()));
    }
    if rest.starts_with("- ") {
        return Some((ListKind::Unordered, depth, text[..indent_len + 2].to_string()));
    }
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && rest[digits..].starts_with(". ") {
        return Some((
            ListKind::Ordered,
            depth,
            text[..indent_len + digits + 2].to_string(),
        ));
    }
    None
}

/// Fence opener: three backticks plus an optional language tag.
fn fence_open(text: &str) -> Option<Option<String>> {
    let rest = text.strip_prefix("```")?;
    if rest.is_empty() {
        Some(None)
    } else {
        Some(Some(rest.to_string()))
    }
}
