//! Cursor movement over a [`TextBuffer`].
//!
//! Movement is pure: it maps a position and a direction to a new position.
//! Vertical movement keeps the source column, clamped to the destination
//! line; there is no remembered "virtual" column.

use super::buffer::TextBuffer;
use super::command::Direction;
use super::edit::Position;

/// Returns true for code units in the word class `[A-Za-z0-9_]`.
#[must_use]
pub fn is_word_unit(unit: u16) -> bool {
    u8::try_from(unit).is_ok_and(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

/// Computes the position reached by moving from `pos` in `direction`.
///
/// The result never sits inside a surrogate pair, even when the source
/// column does not exist on the destination line.
#[must_use]
pub fn move_position(buffer: &TextBuffer, pos: Position, direction: Direction) -> Position {
    let pos = buffer.clamp_position(pos);
    let target = match direction {
        Direction::Left => left(buffer, pos),
        Direction::Right => right(buffer, pos),
        Direction::Up => vertical(buffer, pos, pos.line.saturating_sub(1)),
        Direction::Down => vertical(buffer, pos, pos.line + 1),
        Direction::LineStart => Position::new(pos.line, 1),
        Direction::LineEnd => Position::new(pos.line, buffer.line_len(pos.line) + 1),
        Direction::DocumentStart => Position::origin(),
        Direction::DocumentEnd => document_end(buffer),
        Direction::WordLeft => word_left(buffer, pos),
        Direction::WordRight => word_right(buffer, pos),
    };
    buffer.clamp_position(target)
}

/// Last position of the document.
#[must_use]
pub fn document_end(buffer: &TextBuffer) -> Position {
    let last = buffer.line_count();
    Position::new(last, buffer.line_len(last) + 1)
}

fn left(buffer: &TextBuffer, pos: Position) -> Position {
    if pos.column > 1 {
        let units = buffer.line_units(pos.line);
        let i = pos.column - 1;
        let step = if i >= 2 && is_low_surrogate(units[i - 1]) && is_high_surrogate(units[i - 2]) {
            2
        } else {
            1
        };
        Position::new(pos.line, pos.column - step)
    } else if pos.line > 1 {
        let line = pos.line - 1;
        Position::new(line, buffer.line_len(line) + 1)
    } else {
        pos
    }
}

fn right(buffer: &TextBuffer, pos: Position) -> Position {
    let units = buffer.line_units(pos.line);
    let i = pos.column - 1;
    if i < units.len() {
        let step = if i + 1 < units.len()
            && is_high_surrogate(units[i])
            && is_low_surrogate(units[i + 1])
        {
            2
        } else {
            1
        };
        Position::new(pos.line, pos.column + step)
    } else if pos.line < buffer.line_count() {
        Position::new(pos.line + 1, 1)
    } else {
        pos
    }
}

fn vertical(buffer: &TextBuffer, pos: Position, target: usize) -> Position {
    if target == 0 || target > buffer.line_count() {
        return pos;
    }
    let column = pos.column.min(buffer.line_len(target) + 1);
    Position::new(target, column)
}

fn word_left(buffer: &TextBuffer, pos: Position) -> Position {
    if pos.column == 1 {
        return left(buffer, pos);
    }
    let units = buffer.line_units(pos.line);
    let mut i = (pos.column - 1).min(units.len());
    while i > 0 && !is_word_unit(units[i - 1]) {
        i -= 1;
    }
    while i > 0 && is_word_unit(units[i - 1]) {
        i -= 1;
    }
    Position::new(pos.line, i + 1)
}

fn word_right(buffer: &TextBuffer, pos: Position) -> Position {
    let units = buffer.line_units(pos.line);
    let mut i = pos.column - 1;
    if i >= units.len() {
        return right(buffer, pos);
    }
    while i < units.len() && !is_word_unit(units[i]) {
        i += 1;
    }
    while i < units.len() && is_word_unit(units[i]) {
        i += 1;
    }
    Position::new(pos.line, i + 1)
}
