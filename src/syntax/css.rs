//! CSS scanner.
//!
//! Open `{` blocks are carried in [`LineState::block_depth`] so that a
//! declaration on its own line is still read as `property: value`.

use super::scanner::{NumberSyntax, Scanner, byte, is_digit};
use super::token::{LineState, LineStateKind, LineTokens, TokenType};

const NUMBERS: NumberSyntax = NumberSyntax {
    radix_prefixes: false,
    separators: false,
    suffixes: b"",
};

fn ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'-'
}

fn ident_part(b: u8) -> bool {
    ident_start(b) || b.is_ascii_digit()
}

/// Tokenizes one line of CSS.
pub(crate) fn tokenize(units: &[u16], state: LineState) -> LineTokens {
    let mut lexer = Lexer {
        s: Scanner::new(units),
        kind: match state.kind {
            LineStateKind::BlockComment => LineStateKind::BlockComment,
            _ => LineStateKind::Normal,
        },
        depth: state.block_depth,
        in_value: false,
    };

    loop {
        let start = lexer.s.pos();
        let more = match lexer.kind {
            LineStateKind::BlockComment => lexer.comment(start),
            _ => lexer.code(),
        };
        if !more {
            break;
        }
    }

    let end_state = LineState {
        kind: lexer.kind,
        template_depth: 0,
        block_depth: lexer.depth,
    };
    lexer.s.finish(end_state)
}

struct Lexer<'a> {
    s: Scanner<'a>,
    kind: LineStateKind,
    depth: u16,
    /// After a declaration's `:` and before its `;`.
    in_value: bool,
}

impl Lexer<'_> {
    fn comment(&mut self, start: usize) -> bool {
        if let Some(end) = self.s.find("*/") {
            self.s.set_pos(end + 2);
            self.s.emit(TokenType::Comment, start);
            self.kind = LineStateKind::Normal;
            true
        } else {
            self.s.emit_rest(TokenType::Comment, start);
            self.kind = LineStateKind::BlockComment;
            false
        }
    }

    /// True when the rest of the statement opens a block, i.e. it is a
    /// selector rather than a declaration.
    fn selector_ahead(&self) -> bool {
        match (self.s.find("{"), self.s.find(";")) {
            (Some(brace), Some(semi)) => brace < semi,
            (Some(_), None) => true,
            _ => false,
        }
    }

    fn code(&mut self) -> bool {
        self.s.skip_whitespace();
        let start = self.s.pos();
        let Some(unit) = self.s.peek() else {
            return false;
        };

        match byte(unit) {
            Some(b'/') if self.s.starts_with("/*") => {
                self.s.advance(2);
                return self.comment(start);
            }
            Some(b'"' | b'\'') => {
                self.s.advance(1);
                self.s.scan_quoted(unit);
                self.s.emit(TokenType::String, start);
            }
            Some(b'{') => {
                self.depth = self.depth.saturating_add(1);
                self.in_value = false;
                self.single(TokenType::Punctuation, start);
            }
            Some(b'}') => {
                self.depth = self.depth.saturating_sub(1);
                self.in_value = false;
                self.single(TokenType::Punctuation, start);
            }
            Some(b';') => {
                self.in_value = false;
                self.single(TokenType::Punctuation, start);
            }
            Some(b'@') if self.s.byte_at(1).is_some_and(ident_start) => {
                self.s.advance(1);
                self.s.eat_identifier(ident_start, ident_part);
                self.s.emit(TokenType::Keyword, start);
            }
            _ if self.depth == 0 || (!self.in_value && self.selector_ahead()) => {
                self.selector(start);
            }
            _ if self.in_value => self.value(start),
            _ => self.declaration(start),
        }
        true
    }

    fn single(&mut self, token_type: TokenType, start: usize) {
        self.s.advance(1);
        self.s.emit(token_type, start);
    }

    fn selector(&mut self, start: usize) {
        match self.s.byte_at(0) {
            Some(b'.' | b'#') if self.s.byte_at(1).is_some_and(ident_start) => {
                self.s.advance(1);
                self.s.eat_identifier(ident_start, ident_part);
                self.s.emit(TokenType::Selector, start);
            }
            Some(b':') => {
                self.s.advance(1);
                self.s.eat(":");
                self.s.eat_identifier(ident_start, ident_part);
                self.s.emit(TokenType::Selector, start);
            }
            Some(b'[') => {
                self.single(TokenType::Punctuation, start);
                self.s.skip_whitespace();
                let name = self.s.pos();
                if self.s.eat_identifier(ident_start, ident_part) {
                    self.s.emit(TokenType::Attribute, name);
                }
            }
            Some(b'*' | b'>' | b'+' | b'~' | b'=' | b'|' | b'^' | b'$') => {
                self.single(TokenType::Operator, start);
            }
            Some(b',' | b'(' | b')' | b']') => self.single(TokenType::Punctuation, start),
            Some(b'0'..=b'9') => self.number(start),
            _ if self.s.at_identifier(ident_start) => {
                self.s.eat_identifier(ident_start, ident_part);
                self.s.emit(TokenType::Tag, start);
            }
            _ => self.unknown(start),
        }
    }

    fn declaration(&mut self, start: usize) {
        match self.s.byte_at(0) {
            Some(b':') => {
                self.in_value = true;
                self.single(TokenType::Punctuation, start);
            }
            _ if self.s.at_identifier(ident_start) => {
                self.s.eat_identifier(ident_start, ident_part);
                self.s.emit(TokenType::Property, start);
            }
            _ => self.unknown(start),
        }
    }

    fn value(&mut self, start: usize) {
        match self.s.byte_at(0) {
            Some(b'#') => {
                self.s.advance(1);
                self.s.eat_while(|u| byte(u).is_some_and(|b| b.is_ascii_alphanumeric()));
                self.s.emit(TokenType::Number, start);
            }
            Some(b'!') => {
                self.s.advance(1);
                self.s.skip_whitespace();
                self.s.eat_identifier(ident_start, ident_part);
                self.s.emit(TokenType::Keyword, start);
            }
            Some(b'0'..=b'9') => self.number(start),
            Some(b'.' | b'-' | b'+') if self.s.peek_at(1).is_some_and(is_digit) => {
                self.s.advance(1);
                self.number(start);
            }
            Some(b'(' | b')' | b',') => self.single(TokenType::Punctuation, start),
            Some(b'/' | b'*' | b'+' | b'-') => self.single(TokenType::Operator, start),
            _ if self.s.at_identifier(ident_start) => {
                self.s.eat_identifier(ident_start, ident_part);
                let token_type = if self.s.byte_at(0) == Some(b'(') {
                    TokenType::Function
                } else {
                    TokenType::Constant
                };
                self.s.emit(token_type, start);
            }
            _ => self.unknown(start),
        }
    }

    /// Number plus an optional unit (`px`, `em`, `%`).
    fn number(&mut self, start: usize) {
        self.s.scan_number(NUMBERS);
        if !self.s.eat("%") {
            self.s
                .eat_while(|u| byte(u).is_some_and(|b| b.is_ascii_alphabetic()));
        }
        self.s.emit(TokenType::Number, start);
    }

    fn unknown(&mut self, start: usize) {
        self.s.bump();
        self.s.emit(TokenType::Unknown, start);
    }
}
