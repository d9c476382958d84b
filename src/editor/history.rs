//! Snapshot-based undo/redo history with time-window batching.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::buffer::Snapshot;
use super::edit::{Position, Selection};

/// Default window in which consecutive mutations merge into one undo step.
pub const DEFAULT_MERGE_WINDOW_MS: u64 = 300;

/// Maximum undo history size.
pub const MAX_UNDO_HISTORY: usize = 1000;

/// Session state captured before a mutation.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Buffer contents.
    pub snapshot: Snapshot,
    /// Cursor at capture time.
    pub cursor: Position,
    /// Selection at capture time.
    pub selection: Option<Selection>,
    /// When the entry was captured.
    pub timestamp: Instant,
}

/// Undo and redo stacks.
#[derive(Debug)]
pub struct History {
    /// Undo stack, oldest entry at the front.
    undo_stack: VecDeque<HistoryEntry>,
    /// Redo stack.
    redo_stack: Vec<HistoryEntry>,
    /// Time of the previous recorded mutation.
    last_mutation: Option<Instant>,
    /// Merge window.
    merge_window: Duration,
    /// Undo stack cap.
    max_entries: usize,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new(merge_window: Duration, max_entries: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            last_mutation: None,
            merge_window,
            max_entries: max_entries.max(1),
        }
    }

    /// Records that a mutation is about to happen.
    ///
    /// The captured state is pushed only when the previous mutation is at
    /// least one merge window old. Any new edit discards the redo stack.
    /// Returns true if a new undo step was opened.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        let now = entry.timestamp;
        self.redo_stack.clear();

        let opens_step = self
            .last_mutation
            .is_none_or(|last| now.saturating_duration_since(last) >= self.merge_window);

        if opens_step {
            self.push_undo(entry);
        }
        self.last_mutation = Some(now);
        opens_step
    }

    /// Pushes an entry onto the undo stack, dropping the oldest past the cap.
    pub fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
    }

    /// Pops the most recent undo entry.
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop_back()
    }

    /// Pushes an entry onto the redo stack.
    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo_stack.push(entry);
    }

    /// Pops the most recent redo entry.
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo_stack.pop()
    }

    /// Forces the next mutation to open a new undo step.
    pub fn break_batch(&mut self) {
        self.last_mutation = None;
    }

    /// Drops both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_mutation = None;
    }

    /// Returns true if there is something to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there is something to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo steps.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_MERGE_WINDOW_MS),
            MAX_UNDO_HISTORY,
        )
    }
}
