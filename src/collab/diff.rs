//! Longest-common-prefix/suffix diff in UTF-16 code units.

use crate::editor::buffer::TextBuffer;
use crate::editor::edit::Operation;

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

/// Returns the operations turning `before` into `after`.
///
/// At most one delete followed by one insert, both at the end of the common
/// prefix. The boundaries never fall inside a surrogate pair.
#[must_use]
pub fn diff_to_operations(before: &str, after: &str) -> Vec<Operation> {
    let old: Vec<u16> = before.encode_utf16().collect();
    let new: Vec<u16> = after.encode_utf16().collect();

    let mut prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    if prefix > 0 && is_high_surrogate(old[prefix - 1]) {
        prefix -= 1;
    }

    let max_suffix = old.len().min(new.len()) - prefix;
    let mut suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    if suffix > 0 && is_low_surrogate(old[old.len() - suffix]) {
        suffix -= 1;
    }

    let deleted = old.len() - prefix - suffix;
    let inserted = &new[prefix..new.len() - suffix];

    let mut ops = Vec::with_capacity(2);
    if deleted > 0 {
        ops.push(Operation::delete(prefix, deleted));
    }
    if !inserted.is_empty() {
        ops.push(Operation::insert(prefix, String::from_utf16_lossy(inserted)));
    }
    ops
}

/// Applies operations in order, each against the previous result.
#[must_use]
pub fn apply_operations(text: &str, ops: &[Operation]) -> String {
    let mut buffer = TextBuffer::from_str(text);
    for op in ops {
        match op {
            Operation::Insert { pos, text } => {
                buffer.insert(*pos, text);
            }
            Operation::Delete { pos, len } => {
                buffer.delete(*pos, *len);
            }
        }
    }
    buffer.text()
}
