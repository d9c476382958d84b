//! Token and line-state types.

use serde::{Deserialize, Serialize};

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Keyword,
    Constant,
    Builtin,
    Type,
    Function,
    Property,
    Variable,
    String,
    Number,
    Comment,
    Operator,
    Punctuation,
    Regex,
    Decorator,
    Tag,
    Attribute,
    Heading,
    Emphasis,
    Strong,
    Code,
    Link,
    Selector,
    Unknown,
}

/// A token within one line. `start` and `length` are UTF-16 code units
/// relative to the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub start: usize,
    pub length: usize,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub const fn new(token_type: TokenType, start: usize, length: usize) -> Self {
        Self {
            token_type,
            start,
            length,
        }
    }

    /// End column (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.length
    }
}

/// A token tagged with its 1-indexed document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineToken {
    pub line: usize,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub start: usize,
    pub length: usize,
}

impl LineToken {
    /// Places a line-relative token on `line`.
    #[must_use]
    pub const fn from_token(line: usize, token: Token) -> Self {
        Self {
            line,
            token_type: token.token_type,
            start: token.start,
            length: token.length,
        }
    }
}

/// Quote style of an open Python triple-quoted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripleQuote {
    Double,
    Single,
}

impl TripleQuote {
    /// The quote character as a code unit.
    #[must_use]
    pub const fn unit(self) -> u16 {
        match self {
            Self::Double => b'"' as u16,
            Self::Single => b'\'' as u16,
        }
    }
}

/// Lexical construct still open at the end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineStateKind {
    #[default]
    Normal,
    /// Inside `/* */` (or `<!-- -->` for markup).
    BlockComment,
    /// Inside the text part of a template literal.
    TemplateString,
    /// Inside a triple-quoted string.
    TripleString(TripleQuote),
    /// Inside a fenced code block.
    FencedCode,
    /// Inside a markup start tag whose `>` is on a later line.
    OpenTag,
}

/// The lexical carry across a line boundary.
///
/// `template_depth` counts open `${` expressions. With kind `Normal` and a
/// non-zero depth, the line starts inside template expression code.
/// `block_depth` counts open `{` blocks for stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineState {
    pub kind: LineStateKind,
    pub template_depth: u16,
    pub block_depth: u16,
}

impl LineState {
    /// The state every document starts in.
    #[must_use]
    pub const fn normal() -> Self {
        Self {
            kind: LineStateKind::Normal,
            template_depth: 0,
            block_depth: 0,
        }
    }

    /// Same depths, different kind.
    #[must_use]
    pub const fn with_kind(self, kind: LineStateKind) -> Self {
        Self { kind, ..self }
    }
}

/// Result of tokenizing one line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTokens {
    pub tokens: Vec<Token>,
    pub end_state: LineState,
}
