//! # Exports
//!
//! Read-only projections of the tree: plaintext (optionally re-inserting
//! syntax markers), HTML, a structural JSON dump with node kinds resolved
//! to stable names, and the derived document metrics. Nothing here feeds
//! back into the engine.

use serde::Serialize;

use crate::model::{Children, ListKind, Node, NodeKind};

/// Projects the tree back to text. With `markdown` the literal syntax
/// markers are re-inserted, reproducing the source buffer exactly for
/// well-formed input; without it only the visible content remains.
pub fn to_plaintext(tree: &[Node], markdown: bool) -> String {
    let mut out = String::new();
    for (i, node) in tree.iter().enumerate() {
        plaintext_node(node, markdown, &mut out);
        if i + 1 < tree.len() {
            out.push('\n');
        }
    }
    out
}

fn plaintext_node(node: &Node, markdown: bool, out: &mut String) {
    if node.kind.is_container() {
        if let Children::Nodes(items) = &node.children {
            for (k, item) in items.iter().enumerate() {
                plaintext_node(item, markdown, out);
                if k + 1 < items.len() {
                    out.push('\n');
                }
            }
        }
        return;
    }
    if markdown {
        out.push_str(&node.syntax.open);
    }
    match &node.children {
        Children::None => {}
        Children::Text(t) => out.push_str(t),
        Children::Nodes(children) => {
            for child in children {
                plaintext_node(child, markdown, out);
            }
        }
    }
    if markdown {
        out.push_str(&node.syntax.close);
    }
}

/// Projects the tree to an HTML string.
pub fn to_html(tree: &[Node]) -> String {
    let mut out = String::new();
    for (i, node) in tree.iter().enumerate() {
        html_block(node, &mut out);
        if i + 1 < tree.len() {
            out.push('\n');
        }
    }
    out
}

fn html_block(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Header { level } => {
            out.push_str(&format!("<h{level}>"));
            html_inline(&node.children, out);
            out.push_str(&format!("</h{level}>"));
        }
        NodeKind::Paragraph => {
            out.push_str("<p>");
            html_inline(&node.children, out);
            out.push_str("</p>");
        }
        NodeKind::Blockquote => {
            out.push_str("<blockquote>");
            if let Children::Nodes(items) = &node.children {
                for item in items {
                    out.push_str("<p>");
                    html_inline(&item.children, out);
                    out.push_str("</p>");
                }
            }
            out.push_str("</blockquote>");
        }
        NodeKind::List => {
            let Children::Nodes(items) = &node.children else {
                return;
            };
            let ordered = items.iter().all(|item| {
                matches!(
                    item.kind,
                    NodeKind::ListItem {
                        kind: ListKind::Ordered,
                        ..
                    }
                )
            });
            out.push_str(if ordered { "<ol>" } else { "<ul>" });
            for item in items {
                out.push_str("<li>");
                html_inline(&item.children, out);
                out.push_str("</li>");
            }
            out.push_str(if ordered { "</ol>" } else { "</ul>" });
        }
        NodeKind::CodeBlock { lang } => {
            match lang {
                Some(lang) => out.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    html_escape::encode_double_quoted_attribute(lang)
                )),
                None => out.push_str("<pre><code>"),
            }
            if let Children::Nodes(lines) = &node.children {
                // Fence rows carry no content; only interior lines print.
                let mut first = true;
                for line in lines {
                    if let Children::Text(t) = &line.children {
                        if !first {
                            out.push('\n');
                        }
                        out.push_str(&html_escape::encode_text(t));
                        first = false;
                    }
                }
            }
            out.push_str("</code></pre>");
        }
        NodeKind::Break => out.push_str("<hr>"),
        // Row-level children of containers are handled by their parents;
        // a stray one prints as a paragraph.
        NodeKind::BlockquoteItem | NodeKind::ListItem { .. } | NodeKind::CodeLine => {
            out.push_str("<p>");
            html_inline(&node.children, out);
            out.push_str("</p>");
        }
        _ => html_inline(&node.children, out),
    }
}

fn html_inline(children: &Children, out: &mut String) {
    match children {
        Children::None => out.push_str("<br>"),
        Children::Text(t) => out.push_str(&html_escape::encode_text(t)),
        Children::Nodes(nodes) => {
            for node in nodes {
                let (open, close) = match node.kind {
                    NodeKind::Emphasis => ("<em>", "</em>"),
                    NodeKind::Strong => ("<strong>", "</strong>"),
                    NodeKind::StrongEmphasis => ("<strong><em>", "</em></strong>"),
                    NodeKind::Strike => ("<strike>", "</strike>"),
                    NodeKind::Code => ("<code>", "</code>"),
                    _ => ("", ""),
                };
                out.push_str(open);
                match &node.children {
                    Children::Text(t) => out.push_str(&html_escape::encode_text(t)),
                    Children::Nodes(_) => html_inline(&node.children, out),
                    Children::None => {}
                }
                out.push_str(close);
            }
        }
    }
}

/// Serializes the tree as a structural JSON document, node kinds resolved
/// to their stable component names.
pub fn to_json(tree: &[Node]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tree)
}

/// Derived document statistics, recomputed from the visible text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// First line of the document, clamped to 100 runes.
    pub title: String,
    /// Rune count of the visible text.
    pub characters: usize,
    pub words: usize,
    /// Estimated reading time in minutes at 250 words per minute.
    pub duration: f64,
}

pub fn metrics(tree: &[Node]) -> Metrics {
    let txt = to_plaintext(tree, false);
    let title: String = txt
        .split('\n')
        .next()
        .unwrap_or("")
        .chars()
        .take(100)
        .collect();
    let title = if title.is_empty() {
        "Untitled".to_string()
    } else {
        title
    };
    let words = txt.split_whitespace().count();
    Metrics {
        title,
        characters: txt.chars().count(),
        words,
        duration: words as f64 / 250.0,
    }
}
