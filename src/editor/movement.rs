//! Cursor movement commands.

use super::EditSession;
use super::command::Direction;
use super::cursor::move_position;
use super::edit::{Position, Selection};

impl EditSession {
    /// Moves the cursor one step in `direction`.
    pub(super) fn move_cursor(&mut self, direction: Direction, extend: bool) {
        let target = move_position(&self.buffer, self.cursor, direction);
        self.place_cursor(target, extend);
    }

    /// Moves the cursor to `position`, clamped to the document.
    pub(super) fn move_cursor_to(&mut self, position: Position, extend: bool) {
        let target = self.buffer.clamp_position(position);
        self.place_cursor(target, extend);
    }

    /// Sets the cursor, growing the selection from its anchor when extending.
    fn place_cursor(&mut self, target: Position, extend: bool) {
        if extend {
            let anchor = self.selection.map_or(self.cursor, |sel| sel.anchor);
            let selection = Selection::new(anchor, target);
            self.selection = (!selection.is_empty()).then_some(selection);
        } else {
            self.selection = None;
        }
        self.cursor = target;
    }
}
