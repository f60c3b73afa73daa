//! # richdown-engine
//!
//! The document/cursor engine behind richdown: a flat rune buffer is
//! parsed into a typed, identified node tree; cursor positions map
//! bidirectionally between buffer offsets and view coordinates; edits
//! flow through a single state machine with debounced history; and a
//! keyed reconciler patches a live view with the minimum number of
//! mutations, preserving cursor anchors inside unchanged subtrees.

pub mod editing;
pub mod export;
pub mod io;
pub mod model;
pub mod parsing;
pub mod position;
pub mod reconcile;
pub mod view;

// Re-export key types for easier usage
pub use editing::{EditError, Editor, Op};
pub use export::{Metrics, metrics, to_html, to_json, to_plaintext};
pub use model::{Children, ListKind, Node, NodeId, NodeKind, Row, Syntax};
pub use parsing::parse;
pub use position::{Pos, PositionError, ViewPoint, point_at_pos, pos_at_point};
pub use reconcile::{PatchOp, apply, diff, reconcile};
pub use view::{RenderOptions, RenderedView, ViewNode, render, view_text};
