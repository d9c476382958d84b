//! Syntax highlighting.
//!
//! - [`tokenize_line`]: pure per-line tokenizer, `(line, start state) ->
//!   (tokens, end state)`
//! - [`LineCache`]: incremental driver that re-tokenizes only what changed
//! - [`TokenizeScheduler`] and [`TokenizeWorker`]: debounced background
//!   tokenization with last-request-wins responses

pub mod cache;
pub mod debounce;
pub mod token;
pub mod worker;

mod css;
mod html;
mod javascript;
mod json;
mod markdown;
mod python;
mod scanner;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use cache::{CacheStats, LineCache};
pub use debounce::{TokenizeRequest, TokenizeResponse, TokenizeScheduler};
pub use token::{LineState, LineStateKind, LineToken, LineTokens, Token, TokenType, TripleQuote};
pub use worker::{TokenizeWorker, WorkerError};

/// A language with a registered tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Css,
    Html,
    Python,
    Markdown,
    Json,
    #[default]
    PlainText,
}

impl Language {
    /// All registered languages.
    pub const ALL: [Self; 8] = [
        Self::JavaScript,
        Self::TypeScript,
        Self::Css,
        Self::Html,
        Self::Python,
        Self::Markdown,
        Self::Json,
        Self::PlainText,
    ];

    /// Resolves a language id. Unknown ids fall back to plain text.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" | "jsx" | "mjs" => Self::JavaScript,
            "typescript" | "ts" | "tsx" => Self::TypeScript,
            "css" => Self::Css,
            "html" | "htm" => Self::Html,
            "python" | "py" => Self::Python,
            "markdown" | "md" => Self::Markdown,
            "json" => Self::Json,
            _ => Self::PlainText,
        }
    }

    /// Guesses the language from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        Self::from_id(ext)
    }

    /// The canonical language id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Css => "css",
            Self::Html => "html",
            Self::Python => "python",
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::PlainText => "plaintext",
        }
    }

    /// State of the first line of a document.
    #[must_use]
    pub const fn initial_state(self) -> LineState {
        LineState::normal()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Tokenizes one line. Never fails: malformed input degrades to
/// best-effort tokens. Plain text yields no tokens and stays normal.
#[must_use]
pub fn tokenize_line(language: Language, line: &str, state: LineState) -> LineTokens {
    let units: Vec<u16> = line.encode_utf16().collect();
    match language {
        Language::JavaScript => javascript::tokenize(&units, state, false),
        Language::TypeScript => javascript::tokenize(&units, state, true),
        Language::Css => css::tokenize(&units, state),
        Language::Html => html::tokenize(&units, state),
        Language::Python => python::tokenize(&units, state),
        Language::Markdown => markdown::tokenize(&units, state),
        Language::Json => json::tokenize(&units, state),
        Language::PlainText => LineTokens::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_ids_round_trip() {
        for language in Language::ALL {
            assert_eq!(Language::from_id(language.id()), language);
        }
        assert_eq!(Language::from_id("PY"), Language::Python);
        assert_eq!(Language::from_id("cobol"), Language::PlainText);
    }

    #[test]
    fn test_plaintext_is_inert() {
        let out = tokenize_line(Language::PlainText, "/* anything", LineState::normal());
        assert!(out.tokens.is_empty());
        assert_eq!(out.end_state, LineState::normal());
    }

    #[test]
    fn test_tokens_stay_within_line() {
        let lines = [
            "const s = `a ${b} 😀` // done",
            "x = r'\\'' + \"\"\"open",
            "a { color: #fff; } /* c */",
            "<p class=\"x\">héllo &amp;</p>",
            "# Title with `code`",
            "{\"k\": [1, 2.5e-3, null]}",
        ];
        for language in Language::ALL {
            for line in lines {
                let len = line.encode_utf16().count();
                let out = tokenize_line(language, line, LineState::normal());
                let mut prev_end = 0;
                for token in &out.tokens {
                    assert!(token.length > 0, "{language}: empty token in {line:?}");
                    assert!(token.start >= prev_end, "{language}: overlap in {line:?}");
                    assert!(token.end() <= len, "{language}: overflow in {line:?}");
                    prev_end = token.end();
                }
            }
        }
    }
}
