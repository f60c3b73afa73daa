//! # Position Model
//!
//! Bidirectional mapping between a linear rune offset into the buffer and
//! a structural coordinate, against both the row list (the abstract tree
//! side) and any [`RenderedView`] (the live side).
//!
//! For every offset that does not land inside a hidden syntax marker,
//! `pos_at_point(view, point_at_pos(view, offset))` recovers the offset
//! exactly. Offsets inside hidden markers are clamped to the nearest
//! visible content position.

use crate::model::Row;
use crate::view::RenderedView;

/// A cursor coordinate: row index, intra-row rune offset, and absolute
/// rune offset into the buffer. Row boundaries count exactly one rune
/// (the newline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub y: usize,
    pub x: usize,
    pub pos: usize,
}

impl Pos {
    pub fn new(y: usize, x: usize, pos: usize) -> Self {
        Self { y, x, pos }
    }

    fn advance(&mut self, runes: usize) {
        self.x += runes;
        self.pos += runes;
    }

    fn newline(&mut self) {
        self.y += 1;
        self.x = 0;
        self.pos += 1;
    }
}

/// A point in a rendered view: the path of child indices from the root,
/// and a rune offset within that node's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPoint {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl ViewPoint {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("view point does not address a node in the tracked view")]
    Unreachable,
    #[error("offset lies beyond the end of the view")]
    OutOfBounds,
}

/// Forward direction: derives the buffer coordinate of a view point by
/// walking the view top-down and accumulating the rune lengths of
/// preceding siblings and rows.
///
/// A point inside a hidden marker is clamped to the position just past
/// the marker.
pub fn pos_at_point<V: RenderedView>(root: &V, point: &ViewPoint) -> Result<Pos, PositionError> {
    let mut pos = Pos::default();
    descend(root, &point.path, point.offset, &mut pos)?;
    Ok(pos)
}

fn descend<V: RenderedView>(
    node: &V,
    path: &[usize],
    offset: usize,
    pos: &mut Pos,
) -> Result<(), PositionError> {
    if node.is_hidden() {
        // Not a valid cursor target: land just past the marker.
        accumulate(node, pos);
        return Ok(());
    }
    let Some((&idx, rest)) = path.split_first() else {
        advance_within(node, offset, pos);
        return Ok(());
    };
    let children = node.children();
    if idx >= children.len() {
        return Err(PositionError::Unreachable);
    }
    for child in &children[..idx] {
        accumulate(child, pos);
        if node.is_rows() {
            pos.newline();
        }
    }
    descend(&children[idx], rest, offset, pos)
}

/// Adds a node's entire textual extent to the running coordinate.
fn accumulate<V: RenderedView>(node: &V, pos: &mut Pos) {
    if let Some(t) = node.text() {
        pos.advance(t.chars().count());
        return;
    }
    let children = node.children();
    for (k, child) in children.iter().enumerate() {
        accumulate(child, pos);
        if node.is_rows() && k + 1 < children.len() {
            pos.newline();
        }
    }
}

/// Adds the first `offset` runes of a node's content, clamped to its end.
fn advance_within<V: RenderedView>(node: &V, offset: usize, pos: &mut Pos) {
    let mut remaining = offset;
    walk_within(node, &mut remaining, pos);
}

fn walk_within<V: RenderedView>(node: &V, remaining: &mut usize, pos: &mut Pos) -> bool {
    if *remaining == 0 {
        return true;
    }
    if let Some(t) = node.text() {
        let len = t.chars().count();
        let step = len.min(*remaining);
        pos.advance(step);
        *remaining -= step;
        return *remaining == 0;
    }
    let children = node.children();
    for (k, child) in children.iter().enumerate() {
        if walk_within(child, remaining, pos) {
            return true;
        }
        if node.is_rows() && k + 1 < children.len() {
            pos.newline();
            *remaining -= 1;
            if *remaining == 0 {
                return true;
            }
        }
    }
    false
}

/// Reverse direction: finds the view point addressed by an absolute rune
/// offset, walking the view depth-first and subtracting each visited
/// node's length until the offset fits.
///
/// Offsets inside a hidden marker are normalized to the nearest valid
/// content position after the marker (or the end of the enclosing element
/// when the marker closes it).
pub fn point_at_pos<V: RenderedView>(root: &V, offset: usize) -> Result<ViewPoint, PositionError> {
    match locate(root, offset) {
        Search::Found(path, offset) => Ok(ViewPoint::new(path, offset)),
        Search::Remaining(_) => Err(PositionError::OutOfBounds),
    }
}

enum Search {
    Found(Vec<usize>, usize),
    Remaining(usize),
}

fn locate<V: RenderedView>(node: &V, remaining: usize) -> Search {
    if let Some(t) = node.text() {
        let len = t.chars().count();
        if remaining <= len {
            return Search::Found(Vec::new(), remaining);
        }
        return Search::Remaining(remaining - len);
    }
    if remaining == 0 {
        return Search::Found(Vec::new(), 0);
    }

    let children = node.children();
    let mut rem = remaining;
    for (k, child) in children.iter().enumerate() {
        if child.is_hidden() {
            let len = child.text_len();
            if rem <= len {
                if k + 1 < children.len() {
                    // Clamp to the start of the adjacent visible content.
                    rem = 0;
                    continue;
                }
                // A closing marker ends the element: land at its end.
                return Search::Found(Vec::new(), node.text_len());
            }
            rem -= len;
        } else {
            match locate(child, rem) {
                Search::Found(mut path, offset) => {
                    path.insert(0, k);
                    return Search::Found(path, offset);
                }
                Search::Remaining(rest) => rem = rest,
            }
        }
        if node.is_rows() && k + 1 < children.len() {
            // The newline itself resolves to the start of the next row.
            rem -= 1;
        }
    }
    Search::Remaining(rem)
}

/// Tree-side forward mapping: coordinate of an absolute rune offset in a
/// row list.
pub fn pos_from_offset(rows: &[Row], offset: usize) -> Result<Pos, PositionError> {
    let mut remaining = offset;
    for (y, row) in rows.iter().enumerate() {
        let len = row.len_runes();
        if remaining <= len {
            return Ok(Pos::new(y, remaining, offset));
        }
        remaining -= len + 1;
    }
    Err(PositionError::OutOfBounds)
}

/// Tree-side reverse mapping: absolute rune offset of a row coordinate.
pub fn offset_of(rows: &[Row], y: usize, x: usize) -> Result<usize, PositionError> {
    if y >= rows.len() || x > rows[y].len_runes() {
        return Err(PositionError::OutOfBounds);
    }
    let preceding: usize = rows[..y].iter().map(|row| row.len_runes() + 1).sum();
    Ok(preceding + x)
}
