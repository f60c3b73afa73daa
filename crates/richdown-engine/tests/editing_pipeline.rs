//! End-to-end pipeline tests: dispatch an edit, re-render, reconcile the
//! live view, and re-derive the cursor in the patched view.

use richdown_engine::editing::Op;
use richdown_engine::position::{point_at_pos, pos_at_point};
use richdown_engine::reconcile::{PatchOp, diff, reconcile};
use richdown_engine::view::view_text;
use richdown_engine::{Editor, Pos};
use pretty_assertions::assert_eq;

#[test]
fn typing_patches_only_the_edited_row() {
    let mut editor = Editor::new("# Title\nBody\nTail");
    let mut live = editor.view();

    // Type at the end of "Body".
    editor.select_offsets(12, 12).unwrap();
    editor.dispatch(Op::Write("!".to_string()));

    let ops = diff(&live, &editor.view());
    // One in-place text patch inside the body row.
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], PatchOp::UpdateText { .. }));

    let count = reconcile(&mut live, &editor.view());
    assert_eq!(count, 1);
    assert_eq!(live, editor.view());
    assert_eq!(view_text(&live), editor.buffer());
}

#[test]
fn enter_inserts_exactly_one_row_element() {
    let mut editor = Editor::new("# Title\nBody");
    let mut live = editor.view();

    // Split at the end of "# Title".
    editor.select_offsets(7, 7).unwrap();
    editor.dispatch(Op::Enter);

    let count = reconcile(&mut live, &editor.view());
    assert_eq!(count, 1);
    assert_eq!(live, editor.view());
}

#[test]
fn cursor_survives_a_reconciled_edit() {
    let mut editor = Editor::new("alpha\nbeta\ngamma");
    let mut live = editor.view();

    editor.select_offsets(8, 8).unwrap();
    editor.dispatch(Op::Write("X".to_string()));
    reconcile(&mut live, &editor.view());

    // The committed cursor still addresses the patched view exactly.
    let point = point_at_pos(&live, editor.pos1().pos).unwrap();
    let pos = pos_at_point(&live, &point).unwrap();
    assert_eq!(pos, editor.pos1());
    assert_eq!(pos, Pos::new(1, 3, 9));
}

#[test]
fn a_burst_of_keystrokes_collapses_into_one_snapshot() {
    use std::time::{Duration, Instant};

    let mut editor = Editor::new("");
    editor.select_offsets(0, 0).unwrap();
    for c in ["h", "e", "y"] {
        editor.dispatch(Op::Write(c.to_string()));
    }
    assert_eq!(editor.history_len(), 1);

    // The pause after the burst takes exactly one snapshot.
    editor.tick(Instant::now() + Duration::from_millis(300));
    assert_eq!(editor.history_len(), 2);
    assert_eq!(editor.buffer(), "hey");

    editor.dispatch(Op::Undo);
    assert_eq!(editor.buffer(), "");
    editor.dispatch(Op::Redo);
    assert_eq!(editor.buffer(), "hey");
}

#[test]
fn cut_paste_round_trip_through_dispatch() {
    let mut editor = Editor::new("one two three");
    editor.select_offsets(4, 8).unwrap();
    let clipboard = editor.dispatch(Op::Cut).unwrap();
    assert_eq!(clipboard, "two ");
    assert_eq!(editor.buffer(), "one three");

    editor.select_offsets(0, 0).unwrap();
    editor.dispatch(Op::Paste(clipboard));
    assert_eq!(editor.buffer(), "two one three");
}

#[test]
fn read_only_view_hides_markers_but_keeps_the_buffer_text() {
    let mut editor = Editor::new("# Title\n**bold**");
    editor.dispatch(Op::ToggleReadOnly);
    let view = editor.view();
    assert_eq!(view_text(&view), editor.buffer());
    editor.dispatch(Op::Write("nope".to_string()));
    assert_eq!(editor.buffer(), "# Title\n**bold**");
}

#[test]
fn markdown_projection_round_trips_through_an_edit_session() {
    use richdown_engine::to_plaintext;

    let mut editor = Editor::new("# Doc\n- item\n> quote");
    editor.select_offsets(5, 5).unwrap();
    editor.dispatch(Op::Enter);
    editor.dispatch(Op::Write("para".to_string()));
    assert_eq!(to_plaintext(editor.tree(), true), editor.buffer());
}
