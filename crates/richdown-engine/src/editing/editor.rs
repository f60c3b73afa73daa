//! The editor state machine.
//!
//! [`Editor`] owns the rows (and with them node identity), the derived
//! buffer and tree, both cursors, and the history. Every mutation flows
//! through its operation set; nothing else touches the state, and the
//! exclusive borrow makes overlapping dispatches unrepresentable.
//!
//! Failed operations leave the editor exactly as it was: every fallible
//! step validates before the first field is written.

use std::time::Instant;

use crate::editing::history::{Debouncer, History, Snapshot};
use crate::editing::runes;
use crate::editing::{EditError, Op};
use crate::model::{Node, NodeId, Row, rows_from};
use crate::parsing::parse_rows;
use crate::position::{Pos, offset_of, pos_from_offset};
use crate::view::{RenderOptions, ViewNode, render};

pub struct Editor {
    rows: Vec<Row>,
    buffer: String,
    tree: Vec<Node>,
    pos1: Pos,
    pos2: Pos,
    /// Ids of the rows two above and two below the selection; the splice
    /// window handed to out-of-band `input` reconciliation.
    ext_pos_range: (NodeId, NodeId),
    focused: bool,
    read_only: bool,
    history: History,
    debounce: Debouncer,
}

impl Editor {
    pub fn new(text: &str) -> Self {
        let rows = rows_from(text);
        let buffer = text.to_string();
        let tree = parse_rows(&rows);
        let pos = Pos::default();
        let history = History::new(Snapshot {
            buffer: buffer.clone(),
            rows: rows.clone(),
            pos1: pos,
            pos2: pos,
        });
        let ext_pos_range = ext_range(&rows, pos, pos);
        Self {
            rows,
            buffer,
            tree,
            pos1: pos,
            pos2: pos,
            ext_pos_range,
            focused: false,
            read_only: false,
            history,
            debounce: Debouncer::default(),
        }
    }

    // ---- Read API -------------------------------------------------------

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn tree(&self) -> &[Node] {
        &self.tree
    }

    pub fn pos1(&self) -> Pos {
        self.pos1
    }

    pub fn pos2(&self) -> Pos {
        self.pos2
    }

    pub fn is_collapsed(&self) -> bool {
        self.pos1.pos == self.pos2.pos
    }

    pub fn ext_pos_range(&self) -> (NodeId, NodeId) {
        self.ext_pos_range
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Renders the current tree; read-only mode hides syntax markers.
    pub fn view(&self) -> ViewNode {
        render(
            &self.tree,
            RenderOptions {
                hide_syntax: self.read_only,
            },
        )
    }

    // ---- Focus and mode transitions -------------------------------------

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn toggle_read_only(&mut self) {
        self.read_only = !self.read_only;
    }

    // ---- Selection ------------------------------------------------------

    /// Commits a selection. Positions are normalized so `pos1 <= pos2`
    /// and validated against the tracked rows; a stale coordinate is a
    /// recoverable error and the selection is left unchanged.
    pub fn select(&mut self, pos1: Pos, pos2: Pos) -> Result<(), EditError> {
        let a = self.validate(pos1)?;
        let b = self.validate(pos2)?;
        let (first, second) = if a.pos <= b.pos { (a, b) } else { (b, a) };
        self.ext_pos_range = ext_range(&self.rows, first, second);
        self.pos1 = first;
        self.pos2 = second;
        Ok(())
    }

    /// Selection by absolute rune offsets.
    pub fn select_offsets(&mut self, start: usize, end: usize) -> Result<(), EditError> {
        let pos1 = pos_from_offset(&self.rows, start)?;
        let pos2 = pos_from_offset(&self.rows, end)?;
        self.select(pos1, pos2)
    }

    fn validate(&self, pos: Pos) -> Result<Pos, EditError> {
        let offset = offset_of(&self.rows, pos.y, pos.x)?;
        if offset != pos.pos {
            return Err(EditError::StalePosition);
        }
        Ok(pos)
    }

    // ---- Content mutation -----------------------------------------------

    /// Replaces the half-open selection `[pos1, pos2)` with `data`,
    /// splicing the affected row span and re-parsing it. The cursor
    /// collapses to the end of the insertion.
    pub fn write(&mut self, data: &str) -> Result<(), EditError> {
        if self.read_only {
            return Ok(());
        }
        let p1 = self.validate(self.pos1)?;
        let p2 = self.validate(self.pos2)?;
        self.commit_mutation();

        let new_rows = rows_from(data);
        let head = runes::slice_runes(&self.rows[p1.y].text, 0, p1.x).to_string();
        let tail = runes::slice_runes(
            &self.rows[p2.y].text,
            p2.x,
            self.rows[p2.y].len_runes(),
        )
        .to_string();

        // The start row keeps its id and absorbs the first new row; rows
        // strictly inside the selection are replaced by the remaining new
        // rows, which carry fresh ids.
        self.rows[p1.y].text = head + &new_rows[0].text;
        self.rows
            .splice(p1.y + 1..p2.y + 1, new_rows[1..].iter().cloned());
        let last = p1.y + new_rows.len() - 1;
        self.rows[last].text.push_str(&tail);

        let offset = p1.pos + runes::len_runes(data);
        let pos = pos_from_offset(&self.rows, offset)?;
        self.pos1 = pos;
        self.pos2 = pos;
        self.render();
        self.debounce.schedule(Instant::now());
        Ok(())
    }

    /// Expands the collapsed cursor by `drop_l` runes to the left and
    /// `drop_r` to the right, then deletes the expansion.
    pub fn drop_runes(&mut self, drop_l: usize, drop_r: usize) -> Result<(), EditError> {
        if self.read_only {
            return Ok(());
        }
        let start = self.pos1.pos.saturating_sub(drop_l);
        let end = (self.pos2.pos + drop_r).min(runes::len_runes(&self.buffer));
        self.pos1 = pos_from_offset(&self.rows, start)?;
        self.pos2 = pos_from_offset(&self.rows, end)?;
        self.write("")
    }

    pub fn backspace_rune(&mut self) -> Result<(), EditError> {
        if !self.is_collapsed() {
            return self.write("");
        }
        let drop = runes::grapheme_before(&self.buffer, self.pos1.pos);
        self.drop_runes(drop, 0)
    }

    pub fn backspace_word(&mut self) -> Result<(), EditError> {
        if !self.is_collapsed() {
            return self.write("");
        }
        let drop = runes::word_before(&self.buffer, self.pos1.pos);
        self.drop_runes(drop, 0)
    }

    pub fn backspace_paragraph(&mut self) -> Result<(), EditError> {
        if !self.is_collapsed() {
            return self.write("");
        }
        let drop = runes::paragraph_before(&self.buffer, self.pos1.pos);
        self.drop_runes(drop, 0)
    }

    pub fn delete_rune_forward(&mut self) -> Result<(), EditError> {
        if !self.is_collapsed() {
            return self.write("");
        }
        let drop = runes::grapheme_after(&self.buffer, self.pos2.pos);
        self.drop_runes(0, drop)
    }

    pub fn delete_word_forward(&mut self) -> Result<(), EditError> {
        if !self.is_collapsed() {
            return self.write("");
        }
        let drop = runes::word_after(&self.buffer, self.pos2.pos);
        self.drop_runes(0, drop)
    }

    pub fn tab(&mut self) -> Result<(), EditError> {
        self.write("\t")
    }

    pub fn enter(&mut self) -> Result<(), EditError> {
        self.write("\n")
    }

    /// Reconciles an out-of-band edit: the platform already mutated the
    /// live view, and `rows` is what now stands in place of the span
    /// between the first and last given ids. The caller-supplied cursor
    /// is committed verbatim.
    ///
    /// An id absent from the tracked rows aborts the operation with the
    /// prior state intact.
    pub fn input(
        &mut self,
        rows: Vec<Row>,
        at_end: bool,
        pos1: Pos,
        pos2: Pos,
    ) -> Result<(), EditError> {
        if self.read_only {
            return Ok(());
        }
        let first = rows.first().ok_or(EditError::EmptySplice)?.id;
        let last = rows.last().ok_or(EditError::EmptySplice)?.id;
        let start = self
            .rows
            .iter()
            .position(|row| row.id == first)
            .ok_or(EditError::NodeNotFound(first))?;
        let end = if at_end {
            self.rows.len() - 1
        } else {
            self.rows
                .iter()
                .position(|row| row.id == last)
                .ok_or(EditError::NodeNotFound(last))?
        };
        if end < start {
            return Err(EditError::StalePosition);
        }
        self.commit_mutation();
        self.rows.splice(start..end + 1, rows);
        self.pos1 = pos1;
        self.pos2 = pos2;
        self.render();
        self.debounce.schedule(Instant::now());
        Ok(())
    }

    // ---- Clipboard ------------------------------------------------------

    /// Observes the selected text without mutating anything.
    pub fn copy(&self) -> String {
        runes::slice_runes(&self.buffer, self.pos1.pos, self.pos2.pos).to_string()
    }

    pub fn cut(&mut self) -> Result<String, EditError> {
        if self.read_only {
            return Ok(String::new());
        }
        let data = self.copy();
        self.write("")?;
        Ok(data)
    }

    pub fn paste(&mut self, data: &str) -> Result<(), EditError> {
        self.write(data)
    }

    // ---- History --------------------------------------------------------

    /// Pushes a snapshot if the buffer actually changed since the one at
    /// the current index. Driven by the debounce timer, not per
    /// keystroke.
    pub fn push_undo(&mut self) {
        if self.history.current().buffer == self.buffer {
            return;
        }
        self.history.push(Snapshot {
            buffer: self.buffer.clone(),
            rows: self.rows.clone(),
            pos1: self.pos1,
            pos2: self.pos2,
        });
    }

    pub fn undo(&mut self) {
        if self.read_only {
            return;
        }
        self.debounce.cancel();
        self.history.reset_correction_near_bottom();
        let snapshot = self.history.step_back().clone();
        self.restore(snapshot);
    }

    /// Redo past the top of the stack is a no-op.
    pub fn redo(&mut self) {
        if self.read_only {
            return;
        }
        let Some(snapshot) = self.history.step_forward().cloned() else {
            return;
        };
        self.debounce.cancel();
        self.restore(snapshot);
    }

    /// Drives the debounced history push. Hosts call this from their
    /// event loop; firing is a no-op unless an edit armed the deadline
    /// and the pause outlasted it.
    pub fn tick(&mut self, now: Instant) {
        if self.debounce.fire(now) {
            self.push_undo();
        }
    }

    fn commit_mutation(&mut self) {
        if self.history.needs_initial_correction() {
            self.history.correct_initial_pos(self.pos1, self.pos2);
        }
        self.history.drop_redos();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.rows = snapshot.rows;
        self.buffer = snapshot.buffer;
        self.pos1 = snapshot.pos1;
        self.pos2 = snapshot.pos2;
        self.tree = parse_rows(&self.rows);
    }

    fn render(&mut self) {
        self.buffer = self
            .rows
            .iter()
            .map(|row| row.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.tree = parse_rows(&self.rows);
    }

    // ---- Dispatch boundary ----------------------------------------------

    /// Applies an operation, returning clipboard text for cut/copy.
    pub fn try_dispatch(&mut self, op: Op) -> Result<Option<String>, EditError> {
        match op {
            Op::Focus => self.focus(),
            Op::Blur => self.blur(),
            Op::ToggleReadOnly => self.toggle_read_only(),
            Op::Select { pos1, pos2 } => self.select(pos1, pos2)?,
            Op::Write(data) => self.write(&data)?,
            Op::BackspaceRune => self.backspace_rune()?,
            Op::BackspaceWord => self.backspace_word()?,
            Op::BackspaceParagraph => self.backspace_paragraph()?,
            Op::DeleteRuneForward => self.delete_rune_forward()?,
            Op::DeleteWordForward => self.delete_word_forward()?,
            Op::Tab => self.tab()?,
            Op::Enter => self.enter()?,
            Op::Copy => return Ok(Some(self.copy())),
            Op::Cut => return Ok(Some(self.cut()?)),
            Op::Paste(data) => self.paste(&data)?,
            Op::Undo => self.undo(),
            Op::Redo => self.redo(),
        }
        Ok(None)
    }

    /// The dispatch boundary: a failed operation is logged and abandoned,
    /// leaving the editor exactly as before the triggering event.
    pub fn dispatch(&mut self, op: Op) -> Option<String> {
        match self.try_dispatch(op) {
            Ok(clipboard) => clipboard,
            Err(err) => {
                log::warn!("dispatch abandoned: {err}");
                None
            }
        }
    }
}

/// The id span of rows within two rows of the selection.
fn ext_range(rows: &[Row], pos1: Pos, pos2: Pos) -> (NodeId, NodeId) {
    let y1 = pos1.y.saturating_sub(2);
    let y2 = (pos2.y + 2).min(rows.len() - 1);
    (rows[y1].id, rows[y2].id)
}
