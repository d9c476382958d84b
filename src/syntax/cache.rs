//! Incremental line cache over the per-line tokenizer.
//!
//! Each pass finds the changed region between the previous and the new
//! content by scanning matching lines from both ends. Cached lines after
//! that region are shifted by the line-count delta so they keep hitting.
//! A cached line is reused only if its content and its start state both
//! match the replay; a line whose end state changed drops every cached
//! line after it.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::token::{LineState, LineToken, Token};
use super::{Language, tokenize_line};

/// A tokenized line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheEntry {
    content: String,
    tokens: Vec<Token>,
    start_state: LineState,
    end_state: LineState,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Lines currently cached.
    pub cached_lines: usize,
    /// Active language.
    pub language: Language,
    /// Lines tokenized afresh by the last pass.
    pub retokenized_lines: usize,
}

/// Incremental tokenizer for one document in one language.
#[derive(Debug, Clone, Default)]
pub struct LineCache {
    language: Language,
    /// One entry per line of the last tokenized content.
    entries: Vec<CacheEntry>,
    retokenized: usize,
}

impl LineCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            language,
            entries: Vec::new(),
            retokenized: 0,
        }
    }

    /// Returns the active language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Switches language. A real change drops every cached line.
    pub fn set_language(&mut self, language: Language) {
        if language != self.language {
            trace!(from = %self.language, to = %language, "language changed");
            self.language = language;
            self.clear();
        }
    }

    /// Drops every cached line.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.retokenized = 0;
    }

    /// Returns cache statistics.
    #[must_use]
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            cached_lines: self.entries.len(),
            language: self.language,
            retokenized_lines: self.retokenized,
        }
    }

    /// Tokenizes `content`, reusing cached lines where valid.
    ///
    /// Returned tokens carry 1-indexed line numbers.
    pub fn tokenize(&mut self, content: &str) -> Vec<LineToken> {
        let lines: Vec<&str> = content.split('\n').collect();
        let old = std::mem::take(&mut self.entries);
        let (prefix, suffix) = changed_region(&old, &lines);
        let changed_end = lines.len() - suffix;

        // Line-aligned view of the old entries.
        let old_len = old.len();
        let mut old_slots: Vec<Option<CacheEntry>> = old.into_iter().map(Some).collect();
        let mut slots: Vec<Option<CacheEntry>> = (0..lines.len())
            .map(|i| {
                if i < prefix {
                    old_slots[i].take()
                } else if i >= changed_end {
                    old_slots[old_len - (lines.len() - i)].take()
                } else {
                    None
                }
            })
            .collect();

        let mut state = self.language.initial_state();
        let mut tokens = Vec::new();
        let mut entries = Vec::with_capacity(lines.len());
        let mut retokenized = 0;

        for (i, line) in lines.iter().enumerate() {
            let in_region = (prefix..changed_end).contains(&i);
            let entry = match slots[i].take() {
                Some(entry)
                    if !in_region && entry.content == *line && entry.start_state == state =>
                {
                    entry
                }
                previous => {
                    let out = tokenize_line(self.language, line, state);
                    retokenized += 1;
                    if previous.is_some_and(|p| p.end_state != out.end_state) {
                        slots[i + 1..].iter_mut().for_each(|slot| *slot = None);
                    }
                    CacheEntry {
                        content: (*line).to_string(),
                        tokens: out.tokens,
                        start_state: state,
                        end_state: out.end_state,
                    }
                }
            };

            state = entry.end_state;
            tokens.extend(
                entry
                    .tokens
                    .iter()
                    .map(|&token| LineToken::from_token(i + 1, token)),
            );
            entries.push(entry);
        }

        trace!(
            language = %self.language,
            lines = lines.len(),
            changed_from = prefix + 1,
            retokenized,
            "tokenize pass"
        );
        self.entries = entries;
        self.retokenized = retokenized;
        tokens
    }
}

/// Lengths of the matching prefix and suffix between cached and new lines.
fn changed_region(old: &[CacheEntry], lines: &[&str]) -> (usize, usize) {
    let prefix = old
        .iter()
        .zip(lines)
        .take_while(|(entry, line)| entry.content == **line)
        .count();
    let max_suffix = old.len().min(lines.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(lines.iter().rev())
        .take(max_suffix)
        .take_while(|(entry, line)| entry.content == **line)
        .count();
    (prefix, suffix)
}
