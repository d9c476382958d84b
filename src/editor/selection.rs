//! Selection queries and `selectAll`.

use super::EditSession;
use super::cursor::document_end;
use super::edit::{Position, Selection};

impl EditSession {
    /// Selects the whole document. No-op on an empty single-line document.
    pub(super) fn select_all(&mut self) {
        let end = document_end(&self.buffer);
        if end == Position::origin() {
            self.selection = None;
            return;
        }
        self.selection = Some(Selection::new(Position::origin(), end));
        self.cursor = end;
    }

    /// Returns the selected text, or an empty string.
    #[must_use]
    pub fn selected_text(&self) -> String {
        self.selection_offsets()
            .map(|(start, end)| self.buffer.slice(start, end))
            .unwrap_or_default()
    }

    /// Sorted UTF-16 offsets of a non-empty selection.
    pub(super) fn selection_offsets(&self) -> Option<(usize, usize)> {
        let (from, to) = self.selection?.normalized();
        let start = self.buffer.position_to_offset(from);
        let end = self.buffer.position_to_offset(to);
        (start < end).then_some((start, end))
    }
}
