//! Inline parsing: a single left-to-right rune scan with one
//! lookahead-driven dispatch per character.
//!
//! Unmatched or rejected markers always degrade to literal text; this pass
//! never fails. Code spans are raw zones: their contents are not
//! re-parsed.

use crate::model::{Children, Node, NodeKind, Syntax};

/// Parses a block's content string into inline children.
///
/// Returns [`Children::None`] for empty input and [`Children::Text`] when
/// the whole line is a single plain run.
pub fn parse_inline(text: &str) -> Children {
    let runes: Vec<char> = text.chars().collect();
    if runes.is_empty() {
        return Children::None;
    }

    let mut out: Vec<Node> = Vec::new();
    let mut run = String::new();
    let mut i = 0;

    while i < runes.len() {
        let c = runes[i];
        let to_end = runes.len() - i;
        let parsed = match c {
            '\\' if i + 1 < runes.len() && is_escapable(runes[i + 1]) => Some((
                Node::inline(
                    NodeKind::Escape,
                    Syntax::prefix("\\"),
                    Children::Text(runes[i + 1].to_string()),
                ),
                i + 2,
            )),
            '*' | '_' => {
                // Longest marker present at the cursor wins the attempt;
                // a failed attempt emits one literal rune, not a retry.
                if to_end >= 7 && is_run(&runes, i, c, 3) {
                    match_span(&runes, i, c, 3, NodeKind::StrongEmphasis)
                } else if to_end >= 5 && is_run(&runes, i, c, 2) {
                    match_span(&runes, i, c, 2, NodeKind::Strong)
                } else if to_end >= 3 {
                    match_span(&runes, i, c, 1, NodeKind::Emphasis)
                } else {
                    None
                }
            }
            '~' => {
                if to_end >= 5 && is_run(&runes, i, c, 2) {
                    match_span(&runes, i, c, 2, NodeKind::Strike)
                } else if to_end >= 3 {
                    match_span(&runes, i, c, 1, NodeKind::Strike)
                } else {
                    None
                }
            }
            '`' => {
                if to_end >= 3 {
                    match_span(&runes, i, c, 1, NodeKind::Code)
                } else {
                    None
                }
            }
            _ => None,
        };

        match parsed {
            Some((node, next)) => {
                flush(&mut out, &mut run);
                out.push(node);
                i = next;
            }
            None => {
                run.push(c);
                i += 1;
            }
        }
    }
    flush(&mut out, &mut run);

    if out.is_empty() {
        return Children::None;
    }
    if out.len() == 1
        && out[0].kind == NodeKind::PlainText
        && let Children::Text(t) = &out[0].children
    {
        return Children::Text(t.clone());
    }
    Children::Nodes(out)
}

fn flush(out: &mut Vec<Node>, run: &mut String) {
    if !run.is_empty() {
        out.push(Node::text(std::mem::take(run)));
    }
}

/// A rune is escapable when it is not ASCII-alphanumeric (underscore
/// included).
fn is_escapable(c: char) -> bool {
    !c.is_ascii_alphanumeric()
}

fn is_run(runes: &[char], at: usize, marker: char, len: usize) -> bool {
    runes[at..].len() >= len && runes[at..at + len].iter().all(|&r| r == marker)
}

/// The bracket matcher: finds the closing marker for an opening run of
/// `marker` of length `len` at `at` and builds the inline node.
///
/// The nearest closing run whose preceding rune is not a backslash wins;
/// underscore-based markers additionally require the closing run to be
/// followed by a space or end-of-string. The match is rejected (the
/// opening marker stays literal) when the first or last rune of the
/// matched span is a space, except for backtick code, which permits
/// interior leading and trailing spaces. Accepted spans are re-parsed
/// recursively, except for code.
fn match_span(
    runes: &[char],
    at: usize,
    marker: char,
    len: usize,
    kind: NodeKind,
) -> Option<(Node, usize)> {
    let content_start = at + len;
    let mut close = None;
    // The preceding rune must lie inside the span, so the search starts
    // one past the content start.
    let mut j = content_start + 1;
    while j + len <= runes.len() {
        if is_run(runes, j, marker, len)
            && runes[j - 1] != '\\'
            && (marker != '_' || runes.get(j + len).is_none_or(|&r| r == ' '))
        {
            close = Some(j);
            break;
        }
        j += 1;
    }
    let close = close?;

    let content = &runes[content_start..close];
    if marker != '`' && (content[0] == ' ' || content[content.len() - 1] == ' ') {
        return None;
    }

    let inner: String = content.iter().collect();
    let children = if kind == NodeKind::Code {
        Children::Text(inner)
    } else {
        parse_inline(&inner)
    };
    let syntax = Syntax::wrap(marker.to_string().repeat(len));
    Some((Node::inline(kind, syntax, children), close + len))
}
