//! # Editing
//!
//! The edit state machine and its supporting pieces: the [`Editor`]
//! holding rows, buffer, tree, cursors, and history; rune/grapheme
//! boundary helpers; and the debounced snapshot stack.
//!
//! All mutation goes through the editor's operation set. Recoverable
//! failures (a stale selection, an unknown splice id) abort the operation
//! with the prior state intact; the [`Editor::dispatch`] boundary logs
//! them and moves on.

pub mod editor;
pub mod history;
pub mod runes;

pub use editor::Editor;
pub use history::{Debouncer, History, Snapshot};

use crate::model::NodeId;
use crate::position::{Pos, PositionError};

/// Failure taxonomy for edit operations.
///
/// Parse degradation is never an error (malformed markers fall back to
/// literal text); these cover the id- and position-lookup failures that
/// must abort a dispatch instead of corrupting the buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// An `input` splice referenced a row id absent from the tracked
    /// document.
    #[error("row {0} is not part of the document")]
    NodeNotFound(NodeId),
    /// A cursor coordinate does not address the tracked document (stale
    /// view, concurrent structural change).
    #[error("cursor references a position outside the tracked document")]
    StalePosition,
    /// An `input` splice carried no rows.
    #[error("input splice carried no rows")]
    EmptySplice,
}

impl From<PositionError> for EditError {
    fn from(_: PositionError) -> Self {
        EditError::StalePosition
    }
}

/// The semantic operation set the input adapter maps events onto.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Focus,
    Blur,
    ToggleReadOnly,
    Select { pos1: Pos, pos2: Pos },
    Write(String),
    BackspaceRune,
    BackspaceWord,
    BackspaceParagraph,
    DeleteRuneForward,
    DeleteWordForward,
    Tab,
    Enter,
    Cut,
    Copy,
    Paste(String),
    Undo,
    Redo,
}
