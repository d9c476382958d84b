//! Editing session module.
//!
//! An [`EditSession`] owns a [`TextBuffer`] together with the cursor,
//! selection, dirty flag, version counter and undo history. Every entry
//! point is infallible: out-of-range input is clamped, underflow is a no-op.

pub mod buffer;
pub mod command;
pub mod cursor;
pub mod edit;
pub mod history;

mod editing;
mod movement;
mod selection;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use self::buffer::TextBuffer;
use self::command::Command;
use self::edit::{Operation, Position, Selection};
use self::history::{DEFAULT_MERGE_WINDOW_MS, History, MAX_UNDO_HISTORY};
use crate::clock::{Clock, SystemClock};
use crate::collab::reconcile::{self, TrackedOffsets};

/// Callback receiving the full content after every change.
pub type ChangeListener = Box<dyn FnMut(&str) + Send>;

/// Callback receiving the operations produced by a local change.
pub type OperationsListener = Box<dyn FnMut(&[Operation]) + Send>;

/// Where re-tokenization has to restart after the latest edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMetadata {
    /// First line (1-indexed) touched since the metadata was last cleared.
    pub changed_from_line: usize,
    /// Session version after the latest edit.
    pub version: u64,
}

/// History tuning for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Mutations closer together than this share an undo step.
    pub merge_window: Duration,
    /// Undo stack cap.
    pub max_undo_entries: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            merge_window: Duration::from_millis(DEFAULT_MERGE_WINDOW_MS),
            max_undo_entries: MAX_UNDO_HISTORY,
        }
    }
}

/// A single-writer editing session over one document.
pub struct EditSession {
    /// Text buffer.
    buffer: TextBuffer,
    /// Cursor position.
    cursor: Position,
    /// Active selection, never empty.
    selection: Option<Selection>,
    /// Modified since the last context switch or `mark_clean`.
    dirty: bool,
    /// Incremented on every content change.
    version: u64,
    /// Undo/redo stacks.
    history: History,
    /// Time source for undo batching.
    clock: Arc<dyn Clock>,
    /// Pending re-tokenization hint.
    edit_metadata: Option<EditMetadata>,
    /// Last document handed in through `sync_document`.
    external_document: Option<String>,
    on_change: Option<ChangeListener>,
    on_operations: Option<OperationsListener>,
}

impl EditSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::from_str("")
    }

    /// Creates a session over the given text.
    #[must_use]
    pub fn from_str(text: &str) -> Self {
        Self::with_clock(text, Arc::new(SystemClock))
    }

    /// Creates a session with an injected clock.
    #[must_use]
    pub fn with_clock(text: &str, clock: Arc<dyn Clock>) -> Self {
        Self::with_options(text, clock, SessionOptions::default())
    }

    /// Creates a session with an injected clock and history options.
    #[must_use]
    pub fn with_options(text: &str, clock: Arc<dyn Clock>, options: SessionOptions) -> Self {
        Self {
            buffer: TextBuffer::from_str(text),
            cursor: Position::origin(),
            selection: None,
            dirty: false,
            version: 0,
            history: History::new(options.merge_window, options.max_undo_entries),
            clock,
            edit_metadata: None,
            external_document: None,
            on_change: None,
            on_operations: None,
        }
    }

    /// Executes a command. Returns the removed text for `Cut`.
    pub fn execute_command(&mut self, command: Command) -> Option<String> {
        match command {
            Command::Insert { text } | Command::Paste { text } => self.insert_text(&text),
            Command::DeleteBackward => self.delete_backward(),
            Command::DeleteForward => self.delete_forward(),
            Command::DeleteSelection => self.delete_selection(),
            Command::MoveCursor { direction, extend } => self.move_cursor(direction, extend),
            Command::MoveCursorTo { position, extend } => self.move_cursor_to(position, extend),
            Command::SelectAll => self.select_all(),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Cut => return Some(self.cut()),
        }
        None
    }

    /// Applies a batch of remote operations, in order, each against the
    /// result of the previous one. Returns the first affected line, or
    /// `None` if the batch only held no-ops.
    ///
    /// Remote operations never touch the undo history and are not echoed
    /// to the operations listener.
    pub fn apply_remote_operations(&mut self, ops: &[Operation]) -> Option<usize> {
        let mut tracked = TrackedOffsets {
            cursor: self.buffer.position_to_offset(self.cursor),
            selection: self.selection.map(|sel| {
                (
                    self.buffer.position_to_offset(sel.anchor),
                    self.buffer.position_to_offset(sel.active),
                )
            }),
        };

        let min_line = reconcile::apply_remote(&mut self.buffer, &mut tracked, ops)?;

        self.cursor = self.buffer.offset_to_position(tracked.cursor);
        self.selection = tracked.selection.and_then(|(anchor, active)| {
            let sel = Selection::new(
                self.buffer.offset_to_position(anchor),
                self.buffer.offset_to_position(active),
            );
            (!sel.is_empty()).then_some(sel)
        });
        self.dirty = true;
        self.version += 1;
        self.note_change(min_line);
        debug!(
            ops = ops.len(),
            min_line,
            version = self.version,
            "applied remote batch"
        );
        self.emit(&[], false);
        Some(min_line)
    }

    /// Replaces the document when the caller's current document really
    /// changed to something other than the live buffer.
    ///
    /// The caller typically feeds back whatever `on_change` reported; that
    /// echo matches the buffer and is ignored. Returns true on a switch.
    pub fn sync_document(&mut self, external: &str) -> bool {
        let changed = self.external_document.as_deref() != Some(external);
        if changed {
            self.external_document = Some(external.to_string());
        }
        if !changed || external == self.buffer.text() {
            return false;
        }

        self.buffer = TextBuffer::from_str(external);
        self.cursor = Position::origin();
        self.selection = None;
        self.dirty = false;
        self.history.clear();
        self.version += 1;
        self.edit_metadata = Some(EditMetadata {
            changed_from_line: 1,
            version: self.version,
        });
        debug!(version = self.version, "document context switch");
        true
    }

    /// Returns the full content.
    #[must_use]
    pub fn content(&self) -> String {
        self.buffer.text()
    }

    /// Returns line `n` (1-indexed), or an empty string out of range.
    #[must_use]
    pub fn line(&self, n: usize) -> String {
        self.buffer.line(n).unwrap_or_default()
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// Returns the buffer.
    #[must_use]
    pub const fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns the cursor position.
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// Returns the active selection.
    #[must_use]
    pub const fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Returns the content version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns true if the document changed since it was loaded.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, e.g. after persisting.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Returns true if there is something to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there is something to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Returns the pending re-tokenization hint.
    #[must_use]
    pub const fn edit_metadata(&self) -> Option<EditMetadata> {
        self.edit_metadata
    }

    /// Clears the re-tokenization hint once the caller acted on it.
    pub fn clear_edit_metadata(&mut self) {
        self.edit_metadata = None;
    }

    /// Registers the content change listener.
    pub fn set_on_change(&mut self, listener: impl FnMut(&str) + Send + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    /// Registers the local operations listener.
    pub fn set_on_operations(&mut self, listener: impl FnMut(&[Operation]) + Send + 'static) {
        self.on_operations = Some(Box::new(listener));
    }

    /// Folds a changed line into the pending metadata.
    fn note_change(&mut self, line: usize) {
        let changed_from_line = self
            .edit_metadata
            .map_or(line, |meta| meta.changed_from_line.min(line));
        self.edit_metadata = Some(EditMetadata {
            changed_from_line,
            version: self.version,
        });
    }

    /// Notifies listeners. Operations go out only for local changes.
    fn emit(&mut self, ops: &[Operation], local: bool) {
        if let Some(listener) = self.on_change.as_mut() {
            let content = self.buffer.text();
            listener(&content);
        }
        if local && !ops.is_empty() {
            if let Some(listener) = self.on_operations.as_mut() {
                listener(ops);
            }
        }
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("cursor", &self.cursor)
            .field("selection", &self.selection)
            .field("dirty", &self.dirty)
            .field("version", &self.version)
            .field("lines", &self.buffer.line_count())
            .finish_non_exhaustive()
    }
}
