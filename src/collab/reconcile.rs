//! Rebasing local state onto remote operations.
//!
//! Operations in a batch are applied sequentially: each offset refers to
//! the buffer produced by the previous operation of the same batch.

use tracing::trace;

use crate::editor::buffer::TextBuffer;
use crate::editor::edit::{Operation, utf16_len};

/// Local offsets that must follow remote edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackedOffsets {
    /// Cursor offset.
    pub cursor: usize,
    /// Selection as `(anchor, active)` offsets.
    pub selection: Option<(usize, usize)>,
}

impl TrackedOffsets {
    fn rebase(&mut self, op: &Operation) {
        self.cursor = rebase_offset(self.cursor, op);
        if let Some((anchor, active)) = self.selection {
            self.selection = Some((rebase_offset(anchor, op), rebase_offset(active, op)));
        }
    }
}

/// Adjusts `offset` for an operation applied before it is looked at again.
#[must_use]
pub fn rebase_offset(offset: usize, op: &Operation) -> usize {
    match op {
        Operation::Insert { pos, text } if *pos <= offset => offset + utf16_len(text),
        Operation::Insert { .. } => offset,
        Operation::Delete { pos, len } if pos + len <= offset => offset - len,
        Operation::Delete { pos, .. } if *pos < offset => *pos,
        Operation::Delete { .. } => offset,
    }
}

/// Clamps an operation to the buffer it is about to be applied to.
fn clamp(op: &Operation, length: usize) -> Operation {
    match op {
        Operation::Insert { pos, text } => Operation::insert((*pos).min(length), text.as_str()),
        Operation::Delete { pos, len } => {
            let pos = (*pos).min(length);
            Operation::delete(pos, (*len).min(length - pos))
        }
    }
}

/// Applies a remote batch to `buffer`, moving `tracked` along.
///
/// Offsets inside a surrogate pair are snapped to the start of the code
/// point, and the offsets are rebased by the range the buffer really changed.
///
/// Returns the smallest line (1-indexed) touched by the batch, measured
/// before each operation is applied, or `None` if nothing changed.
pub fn apply_remote(
    buffer: &mut TextBuffer,
    tracked: &mut TrackedOffsets,
    ops: &[Operation],
) -> Option<usize> {
    let mut min_line: Option<usize> = None;

    for op in ops {
        let op = clamp(op, buffer.len_utf16());
        if op.is_noop() {
            continue;
        }

        let line = buffer.offset_to_position(op.pos()).line;
        let applied = match &op {
            Operation::Insert { pos, text } => {
                Operation::insert(buffer.insert(*pos, text), text.as_str())
            }
            Operation::Delete { pos, len } => match buffer.delete(*pos, *len) {
                Some((pos, len)) => Operation::delete(pos, len),
                None => continue,
            },
        };
        min_line = Some(min_line.map_or(line, |min| min.min(line)));
        tracked.rebase(&applied);
        trace!(op = ?applied, line, "applied remote operation");
    }

    let length = buffer.len_utf16();
    tracked.cursor = tracked.cursor.min(length);
    if let Some((anchor, active)) = tracked.selection {
        tracked.selection = Some((anchor.min(length), active.min(length)));
    }
    min_line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, cursor: usize, ops: &[Operation]) -> (String, usize, Option<usize>) {
        let mut buffer = TextBuffer::from_str(text);
        let mut tracked = TrackedOffsets {
            cursor,
            selection: None,
        };
        let line = apply_remote(&mut buffer, &mut tracked, ops);
        (buffer.text(), tracked.cursor, line)
    }

    #[test]
    fn test_insert_before_cursor_shifts() {
        assert_eq!(
            run("abc", 1, &[Operation::insert(0, "Z")]),
            ("Zabc".to_string(), 2, Some(1))
        );
    }

    #[test]
    fn test_insert_at_cursor_pushes_it() {
        assert_eq!(rebase_offset(3, &Operation::insert(3, "xy")), 5);
        assert_eq!(rebase_offset(3, &Operation::insert(4, "xy")), 3);
    }

    #[test]
    fn test_delete_rules() {
        assert_eq!(rebase_offset(10, &Operation::delete(2, 3)), 7);
        assert_eq!(rebase_offset(5, &Operation::delete(2, 3)), 2);
        assert_eq!(rebase_offset(4, &Operation::delete(2, 5)), 2);
        assert_eq!(rebase_offset(2, &Operation::delete(2, 5)), 2);
        assert_eq!(rebase_offset(1, &Operation::delete(2, 5)), 1);
    }

    #[test]
    fn test_batch_is_sequential() {
        // The second insert's offset already accounts for the first one.
        let ops = [Operation::insert(0, "ab"), Operation::insert(2, "cd")];
        assert_eq!(run("", 0, &ops).0, "abcd");
    }

    #[test]
    fn test_out_of_range_op_appends() {
        let (text, cursor, line) = run("one\ntwo", 0, &[Operation::insert(99, "!")]);
        assert_eq!(text, "one\ntwo!");
        assert_eq!(cursor, 0);
        assert_eq!(line, Some(2));
    }

    #[test]
    fn test_ops_inside_surrogate_pair_snap() {
        assert_eq!(
            run("a😀", 3, &[Operation::insert(2, "x")]),
            ("ax😀".to_string(), 4, Some(1))
        );
        assert_eq!(run("a😀", 3, &[Operation::delete(2, 1)]), ("a".to_string(), 1, Some(1)));
    }

    #[test]
    fn test_noops_report_nothing() {
        let ops = [Operation::insert(0, ""), Operation::delete(1, 0)];
        assert_eq!(run("abc", 1, &ops), ("abc".to_string(), 1, None));
    }

    #[test]
    fn test_min_line_is_tracked_across_batch() {
        let ops = [Operation::insert(8, "x"), Operation::delete(0, 1)];
        let (_, _, line) = run("aa\nbb\ncc", 0, &ops);
        assert_eq!(line, Some(1));
    }

    #[test]
    fn test_selection_follows_edits() {
        let mut buffer = TextBuffer::from_str("hello world");
        let mut tracked = TrackedOffsets {
            cursor: 11,
            selection: Some((6, 11)),
        };
        apply_remote(&mut buffer, &mut tracked, &[Operation::delete(0, 6)]);
        assert_eq!(tracked.selection, Some((0, 5)));
        assert_eq!(tracked.cursor, 5);
    }
}
