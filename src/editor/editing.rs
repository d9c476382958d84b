//! Mutating commands and undo/redo.

use tracing::{debug, trace};

use super::EditSession;
use super::edit::{Operation, utf16_len};
use super::history::HistoryEntry;
use crate::collab::diff::diff_to_operations;

impl EditSession {
    /// Captures the pre-mutation state into the history.
    fn begin_mutation(&mut self) {
        let entry = self.capture(self.clock.now());
        self.record_step(entry);
    }

    fn record_step(&mut self, entry: HistoryEntry) {
        if self.history.record(entry) {
            trace!(depth = self.history.undo_len(), "opened undo step");
        }
    }

    /// Bookkeeping shared by every local mutation.
    fn finish_mutation(&mut self, ops: &[Operation], changed_from_line: usize) {
        self.selection = None;
        self.dirty = true;
        self.version += 1;
        self.note_change(changed_from_line);
        self.emit(ops, true);
    }

    /// Inserts text at the cursor, replacing a non-empty selection.
    pub(super) fn insert_text(&mut self, text: &str) {
        let range = self.selection_offsets();
        if text.is_empty() && range.is_none() {
            return;
        }

        self.begin_mutation();
        let mut ops = Vec::with_capacity(2);
        let mut at = self.buffer.position_to_offset(self.cursor);

        if let Some((start, end)) = range {
            if let Some((pos, len)) = self.buffer.delete(start, end - start) {
                ops.push(Operation::delete(pos, len));
                at = pos;
            }
        }
        if !text.is_empty() {
            at = self.buffer.insert(at, text);
            ops.push(Operation::insert(at, text));
        }

        let changed_from_line = self.buffer.offset_to_position(at).line;
        self.cursor = self.buffer.offset_to_position(at + utf16_len(text));
        self.finish_mutation(&ops, changed_from_line);
    }

    /// Deletes the code point before the cursor, or the selection.
    pub(super) fn delete_backward(&mut self) {
        if self.selection_offsets().is_some() {
            self.delete_selection();
            return;
        }

        let at = self.buffer.position_to_offset(self.cursor);
        let width = self.buffer.unit_width_before(at);
        if width == 0 {
            return;
        }
        self.delete_range(at - width, width);
    }

    /// Deletes the code point after the cursor, or the selection.
    pub(super) fn delete_forward(&mut self) {
        if self.selection_offsets().is_some() {
            self.delete_selection();
            return;
        }

        let at = self.buffer.position_to_offset(self.cursor);
        let width = self.buffer.unit_width_at(at);
        if width == 0 {
            return;
        }
        self.delete_range(at, width);
    }

    /// Deletes a non-empty selection.
    pub(super) fn delete_selection(&mut self) {
        let Some((start, end)) = self.selection_offsets() else {
            return;
        };
        self.delete_range(start, end - start);
    }

    /// Removes `len` units at `offset` as one local edit. The emitted
    /// operation describes the range the buffer actually removed; nothing
    /// is recorded when that range is empty.
    fn delete_range(&mut self, offset: usize, len: usize) {
        let entry = self.capture(self.clock.now());
        let Some((pos, removed)) = self.buffer.delete(offset, len) else {
            return;
        };
        self.record_step(entry);
        self.cursor = self.buffer.offset_to_position(pos);
        let line = self.cursor.line;
        self.finish_mutation(&[Operation::delete(pos, removed)], line);
    }

    /// Deletes the selection and returns its text.
    pub(super) fn cut(&mut self) -> String {
        let text = self.selected_text();
        if !text.is_empty() {
            self.delete_selection();
        }
        text
    }

    /// Restores the previous undo step.
    pub(super) fn undo(&mut self) {
        let Some(entry) = self.history.pop_undo() else {
            trace!("nothing to undo");
            return;
        };
        let current = self.capture(entry.timestamp);
        self.history.push_redo(current);
        self.restore_entry(entry);
        debug!(version = self.version, "undo");
    }

    /// Re-applies the most recently undone step.
    pub(super) fn redo(&mut self) {
        let Some(entry) = self.history.pop_redo() else {
            trace!("nothing to redo");
            return;
        };
        let current = self.capture(entry.timestamp);
        self.history.push_undo(current);
        self.restore_entry(entry);
        debug!(version = self.version, "redo");
    }

    fn capture(&self, fallback: std::time::Instant) -> HistoryEntry {
        let now = self.clock.now();
        HistoryEntry {
            snapshot: self.buffer.snapshot(),
            cursor: self.cursor,
            selection: self.selection,
            timestamp: now.max(fallback),
        }
    }

    /// Swaps in a history entry and emits the content diff as operations.
    fn restore_entry(&mut self, entry: HistoryEntry) {
        let before = self.buffer.text();
        self.buffer.restore(&entry.snapshot);
        let after = self.buffer.text();
        let ops = diff_to_operations(&before, &after);

        self.cursor = self.buffer.clamp_position(entry.cursor);
        self.selection = entry.selection.and_then(|sel| {
            let anchor = self.buffer.clamp_position(sel.anchor);
            let active = self.buffer.clamp_position(sel.active);
            (anchor != active).then_some(super::edit::Selection::new(anchor, active))
        });
        self.history.break_batch();
        let Some(first) = ops.first() else {
            return;
        };
        self.dirty = true;
        self.version += 1;
        let line = self.buffer.offset_to_position(first.pos()).line;
        self.note_change(line);
        self.emit(&ops, true);
    }
}
