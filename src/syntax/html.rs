//! HTML scanner.
//!
//! Text content between tags produces no tokens.

use super::scanner::{Scanner, byte};
use super::token::{LineState, LineStateKind, LineTokens, TokenType};

fn name_start(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

fn name_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn attribute_part(b: u8) -> bool {
    name_part(b) || b == b'@'
}

/// Tokenizes one line of HTML.
pub(crate) fn tokenize(units: &[u16], state: LineState) -> LineTokens {
    let mut s = Scanner::new(units);
    let mut kind = match state.kind {
        LineStateKind::BlockComment | LineStateKind::OpenTag => state.kind,
        _ => LineStateKind::Normal,
    };

    loop {
        let start = s.pos();
        let more = match kind {
            LineStateKind::BlockComment => comment(&mut s, &mut kind, start),
            LineStateKind::OpenTag => attributes(&mut s, &mut kind),
            _ => content(&mut s, &mut kind),
        };
        if !more {
            break;
        }
    }
    s.finish(LineState::normal().with_kind(kind))
}

fn comment(s: &mut Scanner<'_>, kind: &mut LineStateKind, start: usize) -> bool {
    if let Some(end) = s.find("-->") {
        s.set_pos(end + 3);
        s.emit(TokenType::Comment, start);
        *kind = LineStateKind::Normal;
        true
    } else {
        s.emit_rest(TokenType::Comment, start);
        *kind = LineStateKind::BlockComment;
        false
    }
}

fn content(s: &mut Scanner<'_>, kind: &mut LineStateKind) -> bool {
    let start = s.pos();
    if s.at_end() {
        return false;
    }

    if s.starts_with("<!--") {
        s.advance(4);
        return comment(s, kind, start);
    }
    if s.starts_with("<!") {
        match s.find(">") {
            Some(end) => s.set_pos(end + 1),
            None => s.set_pos(s.len()),
        }
        s.emit(TokenType::Keyword, start);
        return true;
    }

    let opens_tag = s.byte_at(0) == Some(b'<')
        && (s.byte_at(1).is_some_and(name_start)
            || (s.byte_at(1) == Some(b'/') && s.byte_at(2).is_some_and(name_start)));
    if opens_tag {
        s.advance(1);
        s.eat("/");
        s.emit(TokenType::Punctuation, start);
        let name = s.pos();
        s.eat_identifier(name_start, name_part);
        s.emit(TokenType::Tag, name);
        *kind = LineStateKind::OpenTag;
        return true;
    }

    if s.byte_at(0) == Some(b'&') {
        let end = (1..=32).find(|&n| s.byte_at(n) == Some(b';'));
        let valid = end.is_some_and(|end| {
            (1..end).all(|n| s.byte_at(n).is_some_and(|b| b.is_ascii_alphanumeric() || b == b'#'))
        });
        if let (true, Some(end)) = (valid, end) {
            s.advance(end + 1);
            s.emit(TokenType::Constant, start);
            return true;
        }
    }

    // Plain text up to the next markup character.
    s.bump();
    s.eat_while(|u| !matches!(byte(u), Some(b'<' | b'&')));
    true
}

/// Scans attributes of an open start tag up to its `>`.
fn attributes(s: &mut Scanner<'_>, kind: &mut LineStateKind) -> bool {
    s.skip_whitespace();
    let start = s.pos();
    let Some(unit) = s.peek() else {
        return false;
    };

    match byte(unit) {
        Some(b'>') => {
            s.advance(1);
            s.emit(TokenType::Punctuation, start);
            *kind = LineStateKind::Normal;
        }
        Some(b'/') if s.byte_at(1) == Some(b'>') => {
            s.advance(2);
            s.emit(TokenType::Punctuation, start);
            *kind = LineStateKind::Normal;
        }
        Some(b'=') => {
            s.advance(1);
            s.emit(TokenType::Operator, start);
        }
        Some(b'"' | b'\'') => {
            s.advance(1);
            s.scan_quoted(unit);
            s.emit(TokenType::String, start);
        }
        _ if s.last().is_some_and(|t| t.token_type == TokenType::Operator) => {
            // Unquoted attribute value.
            s.eat_while(|u| !crate::syntax::scanner::is_space(u) && !matches!(byte(u), Some(b'>')));
            s.emit(TokenType::String, start);
        }
        _ if s.eat_identifier(|b| attribute_part(b) && b != b'.', attribute_part) => {
            s.emit(TokenType::Attribute, start);
        }
        _ => {
            s.bump();
            s.emit(TokenType::Unknown, start);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::token::Token;

    fn run(line: &str, state: LineState) -> LineTokens {
        let units: Vec<u16> = line.encode_utf16().collect();
        tokenize(&units, state)
    }

    fn types(out: &LineTokens) -> Vec<TokenType> {
        out.tokens.iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_element_with_attributes() {
        use TokenType::*;
        let out = run(r#"<a href="/x" hidden>link &amp; more</a>"#, LineState::normal());
        assert_eq!(types(&out), vec![
            Punctuation,
            Tag,
            Attribute,
            Operator,
            String,
            Attribute,
            Punctuation,
            Constant,
            Punctuation,
            Tag,
            Punctuation
        ]);
        assert_eq!(out.end_state, LineState::normal());
    }

    #[test]
    fn test_tag_spanning_lines() {
        use TokenType::*;
        let first = run("<input type=text", LineState::normal());
        assert_eq!(types(&first), vec![Punctuation, Tag, Attribute, Operator, String]);
        assert_eq!(first.end_state.kind, LineStateKind::OpenTag);

        let second = run("  disabled />", first.end_state);
        assert_eq!(types(&second), vec![Attribute, Punctuation]);
        assert_eq!(second.end_state.kind, LineStateKind::Normal);
    }

    #[test]
    fn test_comment_spanning_lines() {
        let first = run("text <!-- note", LineState::normal());
        assert_eq!(first.tokens, vec![Token::new(TokenType::Comment, 5, 9)]);
        assert_eq!(first.end_state.kind, LineStateKind::BlockComment);
        let second = run("end --><br>", first.end_state);
        assert_eq!(second.tokens[0], Token::new(TokenType::Comment, 0, 7));
        assert_eq!(second.end_state.kind, LineStateKind::Normal);
    }

    #[test]
    fn test_doctype_and_stray_ampersand() {
        let out = run("<!DOCTYPE html> a & b", LineState::normal());
        assert_eq!(out.tokens, vec![Token::new(TokenType::Keyword, 0, 15)]);
    }
}
