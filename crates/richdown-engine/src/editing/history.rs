//! Edit history: a snapshot stack with a cursor index, plus the debounce
//! timer that decides when a snapshot is worth taking.

use std::time::{Duration, Instant};

use crate::model::Row;
use crate::position::Pos;

/// One history entry: the buffer, the rows that carry node identity, and
/// both cursors. Restoring rows restores the tree ids with them.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub buffer: String,
    pub rows: Vec<Row>,
    pub pos1: Pos,
    pub pos2: Pos,
}

/// An ordered snapshot stack with an index into it.
///
/// The index is always a valid stack position. Redo entries beyond the
/// index are dropped on every new edit; there is no branching history.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Snapshot>,
    index: usize,
    corrected_pos: bool,
}

impl History {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            stack: vec![initial],
            index: 0,
            corrected_pos: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of snapshots on the stack; at least one, since the initial
    /// snapshot is always present.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> &Snapshot {
        &self.stack[self.index]
    }

    /// The initial snapshot is taken before any user interaction has
    /// established a real cursor; the first mutation writes the cursor at
    /// the point of divergence into it, exactly once.
    pub fn needs_initial_correction(&self) -> bool {
        self.index == 0 && !self.corrected_pos
    }

    pub fn correct_initial_pos(&mut self, pos1: Pos, pos2: Pos) {
        self.stack[0].pos1 = pos1;
        self.stack[0].pos2 = pos2;
        self.corrected_pos = true;
    }

    /// Undoing back to the bottom re-arms the initial correction.
    pub fn reset_correction_near_bottom(&mut self) {
        if self.index <= 1 && self.corrected_pos {
            self.corrected_pos = false;
        }
    }

    pub fn drop_redos(&mut self) {
        self.stack.truncate(self.index + 1);
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.stack.push(snapshot);
        self.index += 1;
    }

    /// Moves the index one entry back, clamped at the bottom, and returns
    /// the snapshot now current.
    pub fn step_back(&mut self) -> &Snapshot {
        if self.index > 0 {
            self.index -= 1;
        }
        &self.stack[self.index]
    }

    /// Moves the index one entry forward; `None` past the top.
    pub fn step_forward(&mut self) -> Option<&Snapshot> {
        if self.index + 1 == self.stack.len() {
            return None;
        }
        self.index += 1;
        Some(&self.stack[self.index])
    }
}

/// Cancellable deadline for debounced history pushes.
///
/// Every edit re-arms the deadline; only the final pause in a burst of
/// typing yields a snapshot. Hosts drive it with explicit instants, which
/// also keeps it testable without sleeping.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(250);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the deadline at `now + delay`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns true once when the armed deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rows_from;

    fn snap(text: &str) -> Snapshot {
        Snapshot {
            buffer: text.to_string(),
            rows: rows_from(text),
            pos1: Pos::default(),
            pos2: Pos::default(),
        }
    }

    #[test]
    fn push_advances_the_index() {
        let mut history = History::new(snap("a"));
        history.push(snap("ab"));
        assert_eq!(history.index(), 1);
        assert_eq!(history.current().buffer, "ab");
    }

    #[test]
    fn step_back_clamps_at_the_bottom() {
        let mut history = History::new(snap("a"));
        history.push(snap("ab"));
        assert_eq!(history.step_back().buffer, "a");
        assert_eq!(history.step_back().buffer, "a");
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn step_forward_past_the_top_is_none() {
        let mut history = History::new(snap("a"));
        assert!(history.step_forward().is_none());
        history.push(snap("ab"));
        history.step_back();
        assert_eq!(history.step_forward().unwrap().buffer, "ab");
        assert!(history.step_forward().is_none());
    }

    #[test]
    fn drop_redos_truncates_beyond_the_index() {
        let mut history = History::new(snap("a"));
        history.push(snap("ab"));
        history.push(snap("abc"));
        history.step_back();
        history.drop_redos();
        assert_eq!(history.len(), 2);
        assert!(history.step_forward().is_none());
    }

    #[test]
    fn initial_correction_happens_once() {
        let mut history = History::new(snap("a"));
        assert!(history.needs_initial_correction());
        history.correct_initial_pos(Pos::new(0, 1, 1), Pos::new(0, 1, 1));
        assert!(!history.needs_initial_correction());
        assert_eq!(history.current().pos1, Pos::new(0, 1, 1));
    }

    #[test]
    fn undoing_to_the_bottom_rearms_the_correction() {
        let mut history = History::new(snap("a"));
        history.correct_initial_pos(Pos::default(), Pos::default());
        history.push(snap("ab"));
        history.reset_correction_near_bottom();
        assert!(!history.needs_initial_correction());
        history.step_back();
        history.reset_correction_near_bottom();
        assert!(history.needs_initial_correction());
    }

    #[test]
    fn debouncer_fires_once_after_the_delay() {
        let mut debounce = Debouncer::new(Duration::from_millis(250));
        let start = Instant::now();
        debounce.schedule(start);
        assert!(!debounce.fire(start + Duration::from_millis(100)));
        assert!(debounce.fire(start + Duration::from_millis(300)));
        assert!(!debounce.fire(start + Duration::from_millis(400)));
    }

    #[test]
    fn rescheduling_cancels_the_pending_deadline() {
        let mut debounce = Debouncer::new(Duration::from_millis(250));
        let start = Instant::now();
        debounce.schedule(start);
        debounce.schedule(start + Duration::from_millis(200));
        assert!(!debounce.fire(start + Duration::from_millis(300)));
        assert!(debounce.fire(start + Duration::from_millis(450)));
    }
}
