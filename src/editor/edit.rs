//! Position, selection and operation types shared by the buffer, the
//! session and the reconciler.
//!
//! Lines and columns are 1-indexed. Columns and operation offsets count
//! UTF-16 code units.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A position in the buffer (line, column), both 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column in UTF-16 code units (1-indexed).
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The first position of any document.
    #[must_use]
    pub const fn origin() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::origin()
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

/// A selection between an anchor and the active (cursor) end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started.
    pub anchor: Position,
    /// The moving end, always equal to the cursor.
    pub active: Position,
}

impl Selection {
    /// Creates a new selection.
    #[must_use]
    pub const fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// Returns true if anchor and active coincide.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// Returns the selection as an ordered (start, end) pair.
    #[must_use]
    pub fn normalized(&self) -> (Position, Position) {
        if self.anchor <= self.active {
            (self.anchor, self.active)
        } else {
            (self.active, self.anchor)
        }
    }
}

/// A replicated edit. Offsets are UTF-16 code units into the buffer as it
/// exists when the operation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    /// Insert text at an offset.
    Insert { pos: usize, text: String },
    /// Delete `len` code units starting at an offset.
    Delete { pos: usize, len: usize },
}

impl Operation {
    /// Creates an insert operation.
    #[must_use]
    pub fn insert(pos: usize, text: impl Into<String>) -> Self {
        Self::Insert {
            pos,
            text: text.into(),
        }
    }

    /// Creates a delete operation.
    #[must_use]
    pub const fn delete(pos: usize, len: usize) -> Self {
        Self::Delete { pos, len }
    }

    /// Returns the offset this operation targets.
    #[must_use]
    pub const fn pos(&self) -> usize {
        match self {
            Self::Insert { pos, .. } | Self::Delete { pos, .. } => *pos,
        }
    }

    /// Returns true if applying this operation cannot change any buffer.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Insert { text, .. } => text.is_empty(),
            Self::Delete { len, .. } => *len == 0,
        }
    }
}

/// Length of a string in UTF-16 code units.
#[must_use]
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
