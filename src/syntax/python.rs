//! Python scanner.

use super::scanner::{NumberSyntax, Scanner, byte, is_digit};
use super::token::{LineState, LineStateKind, LineTokens, TokenType, TripleQuote};

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "case", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "match", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

const CONSTANTS: &[&str] = &["True", "False", "None", "NotImplemented", "Ellipsis"];

const BUILTINS: &[&str] = &[
    "abs", "all", "any", "bool", "bytes", "cls", "dict", "enumerate", "Exception", "filter",
    "float", "getattr", "hasattr", "input", "int", "isinstance", "iter", "KeyError", "len",
    "list", "map", "max", "min", "next", "object", "open", "print", "range", "repr", "self",
    "set", "setattr", "sorted", "str", "sum", "super", "tuple", "type", "TypeError",
    "ValueError", "zip",
];

const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "->", ":=",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=", "+", "-", "*", "/", "%", "&", "|",
    "^", "~", "<", ">", "=", "@",
];

const NUMBERS: NumberSyntax = NumberSyntax {
    radix_prefixes: true,
    separators: true,
    suffixes: b"jJ",
};

fn ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn ident_part(b: u8) -> bool {
    ident_start(b) || b.is_ascii_digit()
}

fn is_string_prefix(b: u8) -> bool {
    matches!(b.to_ascii_lowercase(), b'r' | b'b' | b'u' | b'f')
}

fn quote_of(b: u8) -> Option<TripleQuote> {
    match b {
        b'"' => Some(TripleQuote::Double),
        b'\'' => Some(TripleQuote::Single),
        _ => None,
    }
}

/// Tokenizes one line of Python.
pub(crate) fn tokenize(units: &[u16], state: LineState) -> LineTokens {
    let mut s = Scanner::new(units);
    let mut kind = match state.kind {
        LineStateKind::TripleString(_) => state.kind,
        _ => LineStateKind::Normal,
    };

    loop {
        let start = s.pos();
        let more = match kind {
            LineStateKind::TripleString(quote) => triple_rest(&mut s, &mut kind, quote, start),
            _ => code(&mut s, &mut kind),
        };
        if !more {
            break;
        }
    }
    s.finish(LineState::normal().with_kind(kind))
}

/// Scans the rest of a triple-quoted string. Returns false if it stays open.
fn triple_rest(
    s: &mut Scanner<'_>,
    kind: &mut LineStateKind,
    quote: TripleQuote,
    start: usize,
) -> bool {
    let q = quote.unit();
    loop {
        match s.peek() {
            None => {
                s.emit(TokenType::String, start);
                *kind = LineStateKind::TripleString(quote);
                return false;
            }
            Some(u) if u == super::scanner::BACKSLASH => {
                s.advance(1);
                s.bump();
            }
            Some(u) if u == q && s.peek_at(1) == Some(q) && s.peek_at(2) == Some(q) => {
                s.advance(3);
                s.emit(TokenType::String, start);
                *kind = LineStateKind::Normal;
                return true;
            }
            Some(_) => s.bump(),
        }
    }
}

/// Length of a string prefix (`r`, `b`, `f`, `rb`, ...) followed by a quote.
fn string_prefix_len(s: &Scanner<'_>) -> Option<usize> {
    let mut n = 0;
    while n < 2 && s.byte_at(n).is_some_and(is_string_prefix) {
        n += 1;
    }
    s.byte_at(n).and_then(quote_of).map(|_| n)
}

fn code(s: &mut Scanner<'_>, kind: &mut LineStateKind) -> bool {
    s.skip_whitespace();
    let start = s.pos();
    let Some(unit) = s.peek() else {
        return false;
    };

    if let Some(prefix) = string_prefix_len(s) {
        let Some(quote) = s.byte_at(prefix).and_then(quote_of) else {
            return false;
        };
        let q = quote.unit();
        if s.peek_at(prefix + 1) == Some(q) && s.peek_at(prefix + 2) == Some(q) {
            s.advance(prefix + 3);
            return triple_rest(s, kind, quote, start);
        }
        s.advance(prefix + 1);
        s.scan_quoted(q);
        s.emit(TokenType::String, start);
        return true;
    }

    match byte(unit) {
        Some(b'#') => {
            s.emit_rest(TokenType::Comment, start);
            return false;
        }
        Some(b'0'..=b'9') => {
            s.scan_number(NUMBERS);
            s.emit(TokenType::Number, start);
        }
        Some(b'.') if s.peek_at(1).is_some_and(is_digit) => {
            s.scan_number(NUMBERS);
            s.emit(TokenType::Number, start);
        }
        Some(b'@') if s.last().is_none() && s.byte_at(1).is_some_and(ident_start) => {
            s.advance(1);
            while s.eat_identifier(ident_start, ident_part) {
                if !(s.byte_at(0) == Some(b'.') && s.byte_at(1).is_some_and(ident_start)) {
                    break;
                }
                s.advance(1);
            }
            s.emit(TokenType::Decorator, start);
        }
        _ if s.at_identifier(ident_start) => {
            s.eat_identifier(ident_start, ident_part);
            let word = s.text(start, s.pos());
            let token_type = classify(s, &word);
            s.emit(token_type, start);
        }
        _ => {
            if let Some(len) = s.match_operator(OPERATORS) {
                s.advance(len);
                s.emit(TokenType::Operator, start);
            } else if matches!(
                byte(unit),
                Some(b'(' | b')' | b'[' | b']' | b'{' | b'}' | b',' | b':' | b';' | b'.')
            ) {
                s.advance(1);
                s.emit(TokenType::Punctuation, start);
            } else {
                s.bump();
                s.emit(TokenType::Unknown, start);
            }
        }
    }
    true
}

fn classify(s: &Scanner<'_>, word: &str) -> TokenType {
    let called = s.next_non_space() == Some(u16::from(b'('));
    if s.last_is(TokenType::Punctuation, ".") {
        return if called {
            TokenType::Function
        } else {
            TokenType::Property
        };
    }
    if CONSTANTS.contains(&word) {
        return TokenType::Constant;
    }
    if KEYWORDS.contains(&word) {
        return TokenType::Keyword;
    }
    if s.last_is(TokenType::Keyword, "def") {
        return TokenType::Function;
    }
    if s.last_is(TokenType::Keyword, "class") {
        return TokenType::Type;
    }
    if BUILTINS.contains(&word) {
        return TokenType::Builtin;
    }
    if called {
        return TokenType::Function;
    }
    if word.starts_with(|c: char| c.is_ascii_uppercase()) {
        return TokenType::Type;
    }
    TokenType::Variable
}
