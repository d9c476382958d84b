//! Tests for the editing session.
//!
//! Tests cover: insertion over selections, undo batching, history cap,
//! cursor and word movement, edit metadata, listeners, context switches.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use quill::clock::ManualClock;
use quill::editor::command::{Command, Direction};
use quill::editor::edit::{Operation, Position, Selection};
use quill::editor::{EditMetadata, EditSession, SessionOptions};

fn session(text: &str) -> (Arc<ManualClock>, EditSession) {
    let clock = Arc::new(ManualClock::new());
    let session = EditSession::with_clock(text, clock.clone());
    (clock, session)
}

fn insert(session: &mut EditSession, text: &str) {
    session.execute_command(Command::Insert {
        text: text.to_string(),
    });
}

fn move_to(session: &mut EditSession, line: usize, column: usize, extend: bool) {
    session.execute_command(Command::MoveCursorTo {
        position: Position::new(line, column),
        extend,
    });
}

fn step(session: &mut EditSession, direction: Direction) -> Position {
    session.execute_command(Command::MoveCursor {
        direction,
        extend: false,
    });
    session.cursor()
}

/// Test typing over a selection replaces it.
#[test]
fn test_insert_replaces_selection() {
    let (_clock, mut session) = session("Hello World");
    move_to(&mut session, 1, 7, false);
    move_to(&mut session, 1, 12, true);
    insert(&mut session, "Claude");

    assert_eq!(session.content(), "Hello Claude");
    assert_eq!(session.cursor(), Position::new(1, 13));
    assert_eq!(session.selection(), None);
}

/// Test a burst within the merge window is a single undo step and a
/// pause opens a new one.
#[test]
fn test_undo_batching() {
    let (clock, mut session) = session("");
    insert(&mut session, "A");
    clock.advance_ms(299);
    insert(&mut session, "B");
    clock.advance_ms(300);
    insert(&mut session, "C");

    session.execute_command(Command::Undo);
    assert_eq!(session.content(), "AB");
    session.execute_command(Command::Undo);
    assert_eq!(session.content(), "");
    assert!(!session.can_undo());
}

/// Test the merge window follows the last mutation, not the first.
#[test]
fn test_steady_typing_stays_one_step() {
    let (clock, mut session) = session("");
    for ch in ["a", "b", "c", "d", "e"] {
        insert(&mut session, ch);
        clock.advance_ms(200);
    }
    session.execute_command(Command::Undo);
    assert_eq!(session.content(), "");
}

/// Test cursor moves between edits do not split an undo step.
#[test]
fn test_navigation_does_not_break_batch() {
    let (clock, mut session) = session("");
    insert(&mut session, "ab");
    clock.advance_ms(50);
    step(&mut session, Direction::Left);
    insert(&mut session, "X");
    assert_eq!(session.content(), "aXb");

    session.execute_command(Command::Undo);
    assert_eq!(session.content(), "");
}

/// Test undo emits a minimal diff instead of a full replacement.
#[test]
fn test_undo_emits_diff_operations() {
    let (clock, mut session) = session("keep this text");
    let seen: Arc<Mutex<Vec<Vec<Operation>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.set_on_operations(move |ops| sink.lock().unwrap().push(ops.to_vec()));

    move_to(&mut session, 1, 6, false);
    insert(&mut session, "all of ");
    clock.advance_ms(1000);
    session.execute_command(Command::Undo);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], vec![Operation::insert(5, "all of ")]);
    assert_eq!(seen[1], vec![Operation::delete(5, 7)]);
}

/// Test undo restores the selection that existed before the edit.
#[test]
fn test_undo_restores_selection() {
    let (_clock, mut session) = session("Hello World");
    move_to(&mut session, 1, 1, false);
    move_to(&mut session, 1, 6, true);
    insert(&mut session, "Bye");
    session.execute_command(Command::Undo);

    assert_eq!(session.content(), "Hello World");
    assert_eq!(
        session.selection(),
        Some(Selection::new(Position::new(1, 1), Position::new(1, 6)))
    );
}

/// Test the undo stack drops its oldest entries beyond the cap.
#[test]
fn test_history_cap() {
    let clock = Arc::new(ManualClock::new());
    let options = SessionOptions {
        merge_window: Duration::from_millis(300),
        max_undo_entries: 3,
    };
    let mut session = EditSession::with_options("", clock.clone(), options);
    for ch in ["1", "2", "3", "4", "5"] {
        insert(&mut session, ch);
        clock.advance_ms(500);
    }

    for _ in 0..10 {
        session.execute_command(Command::Undo);
    }
    assert_eq!(session.content(), "12");
}

/// Test the cursor invariant holds after clamped moves and deletions.
#[test]
fn test_cursor_is_clamped() {
    let (_clock, mut session) = session("abc\nde");
    move_to(&mut session, 9, 42, false);
    assert_eq!(session.cursor(), Position::new(2, 3));

    move_to(&mut session, 0, 0, false);
    assert_eq!(session.cursor(), Position::new(1, 1));
}

/// Test vertical movement keeps the source column only.
#[test]
fn test_vertical_movement() {
    let (_clock, mut session) = session("abcdef\nab\nabcdef");
    move_to(&mut session, 1, 6, false);
    assert_eq!(step(&mut session, Direction::Down), Position::new(2, 3));
    assert_eq!(step(&mut session, Direction::Down), Position::new(3, 3));
    assert_eq!(step(&mut session, Direction::Up), Position::new(2, 3));
}

/// Test word movement crosses line edges.
#[test]
fn test_word_movement_across_lines() {
    let (_clock, mut session) = session("let value = 1;\nnext");
    assert_eq!(step(&mut session, Direction::WordRight), Position::new(1, 4));
    assert_eq!(step(&mut session, Direction::WordRight), Position::new(1, 10));
    assert_eq!(step(&mut session, Direction::LineEnd), Position::new(1, 15));
    assert_eq!(step(&mut session, Direction::WordRight), Position::new(2, 1));
    assert_eq!(step(&mut session, Direction::WordRight), Position::new(2, 5));
    assert_eq!(step(&mut session, Direction::WordLeft), Position::new(2, 1));
    assert_eq!(step(&mut session, Direction::WordLeft), Position::new(1, 15));
}

/// Test extending a selection keeps its anchor.
#[test]
fn test_extend_selection() {
    let (_clock, mut session) = session("one two");
    session.execute_command(Command::MoveCursor {
        direction: Direction::WordRight,
        extend: true,
    });
    session.execute_command(Command::MoveCursor {
        direction: Direction::Right,
        extend: true,
    });
    assert_eq!(session.selected_text(), "one ");

    step(&mut session, Direction::Right);
    assert_eq!(session.selection(), None);
}

/// Test selecting everything on an empty document selects nothing.
#[test]
fn test_select_all() {
    let (_clock, mut empty) = session("");
    empty.execute_command(Command::SelectAll);
    assert_eq!(empty.selection(), None);

    let (_clock, mut session) = session("ab\ncd");
    session.execute_command(Command::SelectAll);
    assert_eq!(
        session.selection(),
        Some(Selection::new(Position::new(1, 1), Position::new(2, 3)))
    );
    assert_eq!(session.selected_text(), "ab\ncd");
}

/// Test paste behaves like insert.
#[test]
fn test_paste() {
    let (_clock, mut session) = session("ac");
    move_to(&mut session, 1, 2, false);
    session.execute_command(Command::Paste {
        text: "b\nb".to_string(),
    });
    assert_eq!(session.content(), "ab\nbc");
    assert_eq!(session.cursor(), Position::new(2, 2));
}

/// Test edit metadata tracks the earliest changed line.
#[test]
fn test_edit_metadata() {
    let (_clock, mut session) = session("a\nb\nc");
    assert_eq!(session.edit_metadata(), None);

    move_to(&mut session, 3, 2, false);
    insert(&mut session, "!");
    move_to(&mut session, 2, 1, false);
    insert(&mut session, "?");

    assert_eq!(
        session.edit_metadata(),
        Some(EditMetadata {
            changed_from_line: 2,
            version: 2,
        })
    );
    session.clear_edit_metadata();
    assert_eq!(session.edit_metadata(), None);
}

/// Test the change listener sees every new content.
#[test]
fn test_change_listener() {
    let (_clock, mut session) = session("");
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.set_on_change(move |content| sink.lock().unwrap().push(content.to_string()));

    insert(&mut session, "x");
    session.apply_remote_operations(&[Operation::insert(0, "y")]);
    assert_eq!(*seen.lock().unwrap(), vec!["x".to_string(), "yx".to_string()]);
}

/// Test a real document switch resets the session while echoes do not.
#[test]
fn test_sync_document() {
    let (_clock, mut session) = session("");
    assert!(session.sync_document("first"));
    move_to(&mut session, 1, 6, false);
    insert(&mut session, "!");

    // The caller echoing our own content back is not a switch.
    assert!(!session.sync_document("first!"));
    assert_eq!(session.cursor(), Position::new(1, 7));
    assert!(session.can_undo());

    assert!(session.sync_document("second"));
    assert_eq!(session.content(), "second");
    assert_eq!(session.cursor(), Position::origin());
    assert!(!session.is_dirty());
    assert!(!session.can_undo());
}

/// Test a column inside a surrogate pair snaps back, so the emitted
/// operations describe exactly what changed locally.
#[test]
fn test_edits_next_to_astral_characters() {
    let (_clock, mut session) = session("😀");
    let seen: Arc<Mutex<Vec<Vec<Operation>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.set_on_operations(move |ops| sink.lock().unwrap().push(ops.to_vec()));

    move_to(&mut session, 1, 2, false);
    assert_eq!(session.cursor(), Position::new(1, 1));
    insert(&mut session, "x");
    assert_eq!(session.content(), "x😀");
    assert_eq!(session.cursor(), Position::new(1, 2));

    move_to(&mut session, 1, 3, false);
    assert_eq!(session.cursor(), Position::new(1, 2));
    session.execute_command(Command::DeleteBackward);
    assert_eq!(session.content(), "😀");

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![
        vec![Operation::insert(0, "x")],
        vec![Operation::delete(0, 1)]
    ]);
    assert_eq!(session.version(), 2);
}

/// Test commands that change nothing leave the version alone.
#[test]
fn test_noop_commands_keep_version() {
    let (_clock, mut session) = session("a😀");
    move_to(&mut session, 1, 4, false);
    session.execute_command(Command::DeleteForward);
    session.execute_command(Command::Undo);
    session.execute_command(Command::Cut);
    move_to(&mut session, 1, 1, false);
    session.execute_command(Command::DeleteBackward);

    assert_eq!(session.content(), "a😀");
    assert_eq!(session.version(), 0);
    assert!(!session.is_dirty());
}
