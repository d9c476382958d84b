//! Text buffer implementation using ropey.
//!
//! Offsets are UTF-16 code units, lines and columns are 1-indexed, and
//! lines are separated by `\n` only. Out-of-range input is clamped rather
//! than rejected.

use ropey::Rope;

pub use super::edit::Position;

/// A structurally shared copy of the buffer contents.
///
/// Cloning a rope only bumps reference counts, so taking one of these per
/// history entry stays cheap even with a deep undo stack.
#[derive(Debug, Clone)]
pub struct Snapshot {
    rope: Rope,
}

impl Snapshot {
    /// Returns the snapshot contents.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Returns the snapshot length in UTF-16 code units.
    #[must_use]
    pub fn len_utf16(&self) -> usize {
        self.rope.len_utf16_cu()
    }
}

/// Document text with offset and line/column addressing.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    /// The rope holding the text.
    rope: Rope,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Creates a buffer from a string.
    #[must_use]
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Returns the full text.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Returns the length in UTF-16 code units.
    #[must_use]
    pub fn len_utf16(&self) -> usize {
        self.rope.len_utf16_cu()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of lines. An empty buffer has one line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines().max(1)
    }

    /// Returns line `n` (1-indexed) without its trailing newline.
    #[must_use]
    pub fn line(&self, n: usize) -> Option<String> {
        if n == 0 || n > self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(n - 1).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Returns the UTF-16 length of line `n`, excluding the newline.
    #[must_use]
    pub fn line_len(&self, n: usize) -> usize {
        if n == 0 || n > self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(n - 1);
        let len = line.len_utf16_cu();
        let chars = line.len_chars();
        if chars > 0 && line.char(chars - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Returns line `n` as UTF-16 code units, excluding the newline.
    #[must_use]
    pub fn line_units(&self, n: usize) -> Vec<u16> {
        self.line(n)
            .map(|line| line.encode_utf16().collect())
            .unwrap_or_default()
    }

    /// Offset of the first code unit of line `n`.
    fn line_start_offset(&self, n: usize) -> usize {
        let line_idx = n.saturating_sub(1).min(self.rope.len_lines().saturating_sub(1));
        let char_idx = self.rope.line_to_char(line_idx);
        self.rope.char_to_utf16_cu(char_idx)
    }

    /// Clamps a position to valid bounds. A column inside a surrogate pair
    /// moves back to the start of the code point.
    #[must_use]
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.clamp(1, self.line_count());
        let column = pos.column.clamp(1, self.line_len(line) + 1);
        let start = self.line_start_offset(line);
        Position::new(line, self.snap_offset(start + column - 1) - start + 1)
    }

    /// Converts a position to an offset, clamping the position first.
    #[must_use]
    pub fn position_to_offset(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        self.line_start_offset(pos.line) + pos.column - 1
    }

    /// Converts an offset to a position, clamping the offset first.
    #[must_use]
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = self.snap_offset(offset);
        let char_idx = self.rope.utf16_cu_to_char(offset);
        let line = self.rope.char_to_line(char_idx) + 1;
        Position::new(line, offset - self.line_start_offset(line) + 1)
    }

    /// Clamps an offset to `[0, len]` and rounds it down to a code point
    /// boundary.
    #[must_use]
    pub fn snap_offset(&self, offset: usize) -> usize {
        self.rope.char_to_utf16_cu(self.char_index(offset))
    }

    /// Converts a clamped UTF-16 offset to a char index.
    fn char_index(&self, offset: usize) -> usize {
        self.rope.utf16_cu_to_char(offset.min(self.len_utf16()))
    }

    /// Inserts text at an offset. The offset is clamped to `[0, len]` and
    /// snapped to a code point boundary. Returns the offset actually used.
    pub fn insert(&mut self, offset: usize, text: &str) -> usize {
        let idx = self.char_index(offset);
        if !text.is_empty() {
            self.rope.insert(idx, text);
        }
        self.rope.char_to_utf16_cu(idx)
    }

    /// Deletes `len` code units at an offset. Both ends are clamped to the
    /// buffer and snapped to code point boundaries.
    ///
    /// Returns the removed range as `(offset, len)`, or `None` if nothing
    /// was removed.
    pub fn delete(&mut self, offset: usize, len: usize) -> Option<(usize, usize)> {
        let start_idx = self.char_index(offset);
        let end_idx = self.char_index(offset.saturating_add(len));
        if start_idx >= end_idx {
            return None;
        }
        let start = self.rope.char_to_utf16_cu(start_idx);
        let end = self.rope.char_to_utf16_cu(end_idx);
        self.rope.remove(start_idx..end_idx);
        Some((start, end - start))
    }

    /// Returns the text between two offsets.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> String {
        let start_idx = self.char_index(start);
        let end_idx = self.char_index(end);
        if start_idx >= end_idx {
            return String::new();
        }
        self.rope.slice(start_idx..end_idx).to_string()
    }

    /// UTF-16 width of the code point ending at `offset`, or 0 at the start.
    #[must_use]
    pub fn unit_width_before(&self, offset: usize) -> usize {
        let idx = self.char_index(offset);
        if idx == 0 {
            return 0;
        }
        self.rope.char(idx - 1).len_utf16()
    }

    /// UTF-16 width of the code point starting at `offset`, or 0 at the end.
    #[must_use]
    pub fn unit_width_at(&self, offset: usize) -> usize {
        let idx = self.char_index(offset);
        if idx >= self.rope.len_chars() {
            return 0;
        }
        self.rope.char(idx).len_utf16()
    }

    /// Takes a cheap, structurally shared snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rope: self.rope.clone(),
        }
    }

    /// Restores the contents from a snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.rope = snapshot.rope.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_new() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(1), Some(String::new()));
    }

    #[test]
    fn test_buffer_lines() {
        let buffer = TextBuffer::from_str("Hello\nWorld\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line(1), Some("Hello".to_string()));
        assert_eq!(buffer.line(2), Some("World".to_string()));
        assert_eq!(buffer.line(3), Some(String::new()));
        assert_eq!(buffer.line(4), None);
        assert_eq!(buffer.line(0), None);
    }

    #[test]
    fn test_carriage_return_is_not_a_line_break() {
        let buffer = TextBuffer::from_str("a\r\nb\rc");
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.line(1), Some("a\r".to_string()));
        assert_eq!(buffer.line(2), Some("b\rc".to_string()));
    }

    #[test]
    fn test_insert_and_delete_clamp() {
        let mut buffer = TextBuffer::from_str("abc");
        buffer.insert(99, "d");
        assert_eq!(buffer.text(), "abcd");
        buffer.delete(2, 99);
        assert_eq!(buffer.text(), "ab");
        buffer.delete(10, 1);
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn test_position_offset_mapping() {
        let buffer = TextBuffer::from_str("ab\ncde\n");
        assert_eq!(buffer.position_to_offset(Position::new(1, 1)), 0);
        assert_eq!(buffer.position_to_offset(Position::new(2, 2)), 4);
        assert_eq!(buffer.position_to_offset(Position::new(3, 1)), 7);
        assert_eq!(buffer.offset_to_position(4), Position::new(2, 2));
        assert_eq!(buffer.offset_to_position(2), Position::new(1, 3));
        assert_eq!(buffer.offset_to_position(3), Position::new(2, 1));
        assert_eq!(buffer.offset_to_position(100), Position::new(3, 1));
    }

    #[test]
    fn test_position_clamping() {
        let buffer = TextBuffer::from_str("ab\ncde");
        assert_eq!(
            buffer.clamp_position(Position::new(9, 9)),
            Position::new(2, 4)
        );
        assert_eq!(
            buffer.clamp_position(Position::new(0, 0)),
            Position::new(1, 1)
        );
        assert_eq!(buffer.position_to_offset(Position::new(1, 50)), 2);
    }

    #[test]
    fn test_utf16_offsets() {
        let mut buffer = TextBuffer::from_str("a😀b");
        assert_eq!(buffer.len_utf16(), 4);
        assert_eq!(buffer.line_len(1), 4);
        assert_eq!(buffer.unit_width_before(3), 2);
        assert_eq!(buffer.unit_width_at(1), 2);
        buffer.delete(1, 2);
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn test_offsets_snap_out_of_surrogate_pairs() {
        let mut buffer = TextBuffer::from_str("😀\nx😀");
        assert_eq!(buffer.snap_offset(1), 0);
        assert_eq!(buffer.clamp_position(Position::new(1, 2)), Position::new(1, 1));
        assert_eq!(buffer.clamp_position(Position::new(2, 3)), Position::new(2, 2));
        assert_eq!(buffer.offset_to_position(5), Position::new(2, 2));
        assert_eq!(buffer.position_to_offset(Position::new(2, 3)), 4);

        assert_eq!(buffer.delete(4, 1), None);
        assert_eq!(buffer.insert(1, "y"), 0);
        assert_eq!(buffer.text(), "y😀\nx😀");
        assert_eq!(buffer.delete(2, 3), Some((1, 4)));
        assert_eq!(buffer.text(), "y😀");
    }

    #[test]
    fn test_snapshot_restore() {
        let mut buffer = TextBuffer::from_str("one");
        let snapshot = buffer.snapshot();
        buffer.insert(3, " two");
        assert_eq!(buffer.text(), "one two");
        buffer.restore(&snapshot);
        assert_eq!(buffer.text(), "one");
        assert_eq!(snapshot.text(), "one");
    }

    #[test]
    fn test_slice() {
        let buffer = TextBuffer::from_str("Hello World");
        assert_eq!(buffer.slice(6, 11), "World");
        assert_eq!(buffer.slice(5, 2), "");
    }
}
