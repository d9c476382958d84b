//! Markdown scanner.
//!
//! Block structure (headings, fences, quotes, list markers, rules) is
//! decided at the start of the line; inline spans are found by searching
//! for their closing delimiter on the same line. Plain text is not emitted.

use super::scanner::{Scanner, byte, is_space};
use super::token::{LineState, LineStateKind, LineTokens, TokenType};

/// Tokenizes one line of Markdown.
pub(crate) fn tokenize(units: &[u16], state: LineState) -> LineTokens {
    let mut s = Scanner::new(units);
    s.skip_whitespace();

    if state.kind == LineStateKind::FencedCode {
        let start = s.pos();
        if fence_len(&s).is_some() {
            s.emit_rest(TokenType::Punctuation, start);
            return s.finish(LineState::normal());
        }
        s.set_pos(0);
        s.emit_rest(TokenType::Code, 0);
        return s.finish(state);
    }

    let start = s.pos();
    if let Some(len) = fence_len(&s) {
        s.advance(len);
        s.emit(TokenType::Punctuation, start);
        s.skip_whitespace();
        let info = s.pos();
        s.emit_rest(TokenType::Keyword, info);
        return s.finish(LineState::normal().with_kind(LineStateKind::FencedCode));
    }

    if is_rule(&s) {
        s.emit_rest(TokenType::Punctuation, start);
        return s.finish(LineState::normal());
    }

    let hashes = s.eat_while(|u| byte(u) == Some(b'#'));
    if (1..=6).contains(&hashes) && s.peek().is_none_or(is_space) {
        s.emit_rest(TokenType::Heading, start);
        return s.finish(LineState::normal());
    }
    s.set_pos(start);

    block_markers(&mut s);
    inline(&mut s);
    s.finish(LineState::normal())
}

/// Length of a code fence (three or more backticks or tildes) starting here.
fn fence_len(s: &Scanner<'_>) -> Option<usize> {
    let mark = s.byte_at(0).filter(|b| matches!(b, b'`' | b'~'))?;
    let mut n = 0;
    while s.byte_at(n) == Some(mark) {
        n += 1;
    }
    (n >= 3).then_some(n)
}

/// `---`, `***` or `___`, optionally spaced, and nothing else.
fn is_rule(s: &Scanner<'_>) -> bool {
    let Some(mark) = s.byte_at(0).filter(|b| matches!(b, b'-' | b'*' | b'_')) else {
        return false;
    };
    let mut count = 0;
    let mut n = 0;
    while let Some(unit) = s.peek_at(n) {
        if byte(unit) == Some(mark) {
            count += 1;
        } else if !is_space(unit) {
            return false;
        }
        n += 1;
    }
    count >= 3
}

/// Blockquote markers and one list marker.
fn block_markers(s: &mut Scanner<'_>) {
    while s.byte_at(0) == Some(b'>') {
        let start = s.pos();
        s.advance(1);
        s.emit(TokenType::Punctuation, start);
        s.skip_whitespace();
    }

    let start = s.pos();
    let bullet = matches!(s.byte_at(0), Some(b'-' | b'*' | b'+'))
        && s.peek_at(1).is_some_and(is_space);
    if bullet {
        s.advance(1);
        s.emit(TokenType::Punctuation, start);
        return;
    }

    let digits = s.eat_while(|u| byte(u).is_some_and(|b| b.is_ascii_digit()));
    let ordered = digits > 0
        && matches!(s.byte_at(0), Some(b'.' | b')'))
        && s.peek_at(1).is_none_or(is_space);
    if ordered {
        s.advance(1);
        s.emit(TokenType::Punctuation, start);
    } else {
        s.set_pos(start);
    }
}

fn inline(s: &mut Scanner<'_>) {
    while !s.at_end() {
        let start = s.pos();
        let matched = match s.byte_at(0) {
            Some(b'\\') => {
                s.advance(1);
                s.bump();
                continue;
            }
            Some(b'`') => code_span(s),
            Some(b'*' | b'_') => emphasis(s),
            Some(b'!') if s.byte_at(1) == Some(b'[') => {
                s.advance(1);
                link(s)
            }
            Some(b'[') => link(s),
            Some(b'<') if s.starts_with_at(1, "http") => autolink(s),
            _ => false,
        };
        if matched {
            let token_type = span_type(s, start);
            s.emit(token_type, start);
        } else {
            s.set_pos(start);
            s.bump();
        }
    }
}

/// The token type of the span just scanned, judged by its opening.
fn span_type(s: &Scanner<'_>, start: usize) -> TokenType {
    let text = s.text(start, start + 2);
    if text.starts_with('`') {
        TokenType::Code
    } else if text == "**" || text == "__" {
        TokenType::Strong
    } else if text.starts_with(['*', '_']) {
        TokenType::Emphasis
    } else {
        TokenType::Link
    }
}

/// A run of backticks closed by a run of the same length.
fn code_span(s: &mut Scanner<'_>) -> bool {
    let ticks = s.eat_while(|u| byte(u) == Some(b'`'));
    let fence = "`".repeat(ticks);
    while let Some(at) = s.find(&fence) {
        s.set_pos(at);
        let run = s.eat_while(|u| byte(u) == Some(b'`'));
        if run == ticks {
            return true;
        }
    }
    false
}

fn emphasis(s: &mut Scanner<'_>) -> bool {
    let Some(mark) = s.byte_at(0) else {
        return false;
    };
    let strong = s.byte_at(1) == Some(mark);
    let width = if strong { 2 } else { 1 };
    let delimiter: String = std::iter::repeat_n(char::from(mark), width).collect();
    s.advance(delimiter.len());
    if s.peek().is_none_or(is_space) {
        return false;
    }
    match s.find(&delimiter) {
        Some(end) if end > s.pos() => {
            s.set_pos(end + delimiter.len());
            true
        }
        _ => false,
    }
}

/// `[text](target)` or `[text]`.
fn link(s: &mut Scanner<'_>) -> bool {
    let Some(close) = s.find("]") else {
        return false;
    };
    s.set_pos(close + 1);
    if s.byte_at(0) == Some(b'(') {
        if let Some(end) = s.find(")") {
            s.set_pos(end + 1);
        }
    }
    true
}

fn autolink(s: &mut Scanner<'_>) -> bool {
    match s.find(">") {
        Some(end) => {
            s.set_pos(end + 1);
            true
        }
        None => false,
    }
}
