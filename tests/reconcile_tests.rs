//! Tests for applying remote operations to a session.
//!
//! Tests cover: cursor and selection rebasing, sequential batches,
//! clamping of divergent operations, the wire protocol round trip.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use quill::collab::protocol::{ActorInfo, Message, PROTOCOL_VERSION, RemoteFeed, RemoteOpMessage};
use quill::collab::{OutboundBatcher, Presence, diff_to_operations};
use quill::editor::EditSession;
use quill::editor::command::Command;
use quill::editor::edit::{Operation, Position, Selection};

fn at(text: &str, line: usize, column: usize) -> EditSession {
    let mut session = EditSession::from_str(text);
    session.execute_command(Command::MoveCursorTo {
        position: Position::new(line, column),
        extend: false,
    });
    session
}

/// Test an insert before the cursor shifts it.
#[test]
fn test_insert_before_cursor() {
    let mut session = at("abc", 1, 2);
    let line = session.apply_remote_operations(&[Operation::insert(0, "Z")]);

    assert_eq!(session.content(), "Zabc");
    assert_eq!(session.cursor(), Position::new(1, 3));
    assert_eq!(line, Some(1));
}

/// Test an insert exactly at the cursor pushes it forward.
#[test]
fn test_insert_at_cursor() {
    let mut session = at("abc", 1, 2);
    session.apply_remote_operations(&[Operation::insert(1, "XY")]);
    assert_eq!(session.cursor(), Position::new(1, 4));
}

/// Test an insert after the cursor leaves it alone.
#[test]
fn test_insert_after_cursor() {
    let mut session = at("abc", 1, 2);
    session.apply_remote_operations(&[Operation::insert(3, "!")]);
    assert_eq!(session.content(), "abc!");
    assert_eq!(session.cursor(), Position::new(1, 2));
}

/// Test a delete straddling the cursor collapses it to the delete start.
#[test]
fn test_delete_around_cursor() {
    let mut session = at("abcdef", 1, 4);
    session.apply_remote_operations(&[Operation::delete(1, 4)]);
    assert_eq!(session.content(), "af");
    assert_eq!(session.cursor(), Position::new(1, 2));
}

/// Test a batch is applied sequentially, each op against the previous result.
#[test]
fn test_sequential_batch() {
    let mut session = at("hello", 1, 6);
    session.apply_remote_operations(&[
        Operation::insert(0, "oh "),
        Operation::delete(3, 1),
        Operation::insert(3, "H"),
    ]);
    assert_eq!(session.content(), "oh Hello");
    assert_eq!(session.cursor(), Position::new(1, 9));
}

/// Test the reported line is the smallest touched, measured before each op.
#[test]
fn test_min_line_across_batch() {
    let mut session = EditSession::from_str("one\ntwo\nthree");
    let line = session.apply_remote_operations(&[
        Operation::insert(8, "3"),
        Operation::delete(4, 4),
    ]);
    assert_eq!(session.content(), "one\n3three");
    assert_eq!(line, Some(2));
    assert_eq!(session.edit_metadata().map(|m| m.changed_from_line), Some(2));
}

/// Test selection endpoints follow remote edits.
#[test]
fn test_selection_is_rebased() {
    let mut session = at("abcdef", 1, 3);
    session.execute_command(Command::MoveCursorTo {
        position: Position::new(1, 5),
        extend: true,
    });
    session.apply_remote_operations(&[Operation::insert(0, "__")]);

    assert_eq!(
        session.selection(),
        Some(Selection::new(Position::new(1, 5), Position::new(1, 7)))
    );
    assert_eq!(session.selected_text(), "cd");
}

/// Test a selection swallowed by a remote delete disappears.
#[test]
fn test_selection_collapsed_by_delete() {
    let mut session = at("abcdef", 1, 3);
    session.execute_command(Command::MoveCursorTo {
        position: Position::new(1, 5),
        extend: true,
    });
    session.apply_remote_operations(&[Operation::delete(0, 6)]);
    assert_eq!(session.selection(), None);
    assert_eq!(session.cursor(), Position::origin());
}

/// Test operations past the end are clamped instead of rejected.
#[test]
fn test_divergent_operations_are_clamped() {
    let mut session = at("abc", 1, 4);
    session.apply_remote_operations(&[Operation::insert(99, "d"), Operation::delete(2, 50)]);
    assert_eq!(session.content(), "ab");
    assert_eq!(session.cursor(), Position::new(1, 3));
}

/// Test remote edits never enter the undo history.
#[test]
fn test_remote_edits_skip_history() {
    let mut session = at("abc", 1, 1);
    session.apply_remote_operations(&[Operation::insert(0, "x")]);
    assert!(session.is_dirty());
    assert!(!session.can_undo());
    session.execute_command(Command::Undo);
    assert_eq!(session.content(), "xabc");
}

/// Test an all no-op batch changes nothing.
#[test]
fn test_noop_batch() {
    let mut session = EditSession::from_str("abc");
    let version = session.version();
    let line =
        session.apply_remote_operations(&[Operation::insert(1, ""), Operation::delete(3, 4)]);
    assert_eq!(line, None);
    assert_eq!(session.version(), version);
    assert!(!session.is_dirty());
}

/// Test two sessions converge when one relays its operations to the other.
#[test]
fn test_peers_converge_through_the_wire() {
    let mut local = at("shared text", 1, 7);
    let mut remote = EditSession::from_str("shared text");
    let mut batcher = OutboundBatcher::new();

    local.execute_command(Command::Insert {
        text: "plain ".to_string(),
    });
    let ops = diff_to_operations("shared text", &local.content());
    let message = batcher
        .prepare(0, ops, Some(Presence::from_session(&local)))
        .expect("non-empty batch");
    let wire = Message::Op(message).encode().expect("encode");

    let Message::Op(received) = Message::decode(&wire).expect("decode") else {
        panic!("expected an op message");
    };
    let relayed = RemoteOpMessage {
        v: PROTOCOL_VERSION,
        version: 1,
        actor: ActorInfo {
            client_id: "local".to_string(),
            display_name: Some("Local".to_string()),
            color: "#ff0000".to_string(),
        },
        ops: received.ops,
    };
    let mut feed = RemoteFeed::new(0);
    feed.deliver(&mut remote, &relayed).expect("in order");

    assert_eq!(remote.content(), "shared plain text");
    assert_eq!(remote.content(), local.content());
    assert_eq!(feed.version(), 1);
}
