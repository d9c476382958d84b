//! Editing commands accepted by [`EditSession::execute_command`].
//!
//! [`EditSession::execute_command`]: super::EditSession::execute_command

use serde::{Deserialize, Serialize};

use super::edit::Position;

/// Cursor movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    WordLeft,
    WordRight,
}

/// An editing command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Insert text at the cursor, replacing any selection.
    Insert { text: String },
    /// Backspace.
    DeleteBackward,
    /// Forward delete.
    DeleteForward,
    /// Delete the selection, if any.
    DeleteSelection,
    /// Move the cursor, optionally extending the selection.
    MoveCursor {
        direction: Direction,
        #[serde(default)]
        extend: bool,
    },
    /// Move the cursor to a position, optionally extending the selection.
    MoveCursorTo {
        position: Position,
        #[serde(default)]
        extend: bool,
    },
    /// Select the whole document.
    SelectAll,
    Undo,
    Redo,
    /// Same as insert.
    Paste { text: String },
    /// Delete the selection and return its text.
    Cut,
}

impl Command {
    /// Returns true if this command can change the document.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Insert { .. }
                | Self::DeleteBackward
                | Self::DeleteForward
                | Self::DeleteSelection
                | Self::Paste { .. }
                | Self::Cut
                | Self::Undo
                | Self::Redo
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json() {
        let cmd: Command =
            serde_json::from_str(r#"{"type":"moveCursor","direction":"wordRight"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::MoveCursor {
                direction: Direction::WordRight,
                extend: false
            }
        );

        let cmd: Command = serde_json::from_str(r#"{"type":"insert","text":"x"}"#).unwrap();
        assert!(cmd.is_mutation());
        assert!(Command::Undo.is_mutation());
        assert!(!Command::SelectAll.is_mutation());
    }
}
