//! Cursor over the UTF-16 code units of one line, shared by every
//! language scanner.
//!
//! The scanner records tokens as it goes and remembers the type and text
//! of the last emitted token, which the languages use for contextual
//! classification (property after `.`, function after `def`, regex versus
//! division).

use super::token::{LineState, LineTokens, Token, TokenType};

pub(crate) const BACKSLASH: u16 = b'\\' as u16;

/// Returns the code unit as ASCII, if it is.
pub(crate) fn byte(unit: u16) -> Option<u8> {
    u8::try_from(unit).ok().filter(u8::is_ascii)
}

/// True if `unit` is `b`.
pub(crate) fn is(unit: Option<u16>, b: u8) -> bool {
    unit == Some(u16::from(b))
}

pub(crate) fn is_digit(unit: u16) -> bool {
    byte(unit).is_some_and(|b| b.is_ascii_digit())
}

fn is_octal(b: &u8) -> bool {
    (b'0'..=b'7').contains(b)
}

fn is_binary(b: &u8) -> bool {
    matches!(b, b'0' | b'1')
}

pub(crate) fn is_space(unit: u16) -> bool {
    matches!(byte(unit), Some(b' ' | b'\t' | b'\r' | 0x0b | 0x0c)) || unit == 0xA0
}

/// Copy of the last emitted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LastToken {
    pub token_type: TokenType,
    pub text: String,
}

/// Digit syntax accepted by [`Scanner::scan_number`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct NumberSyntax {
    /// `0x`, `0o` and `0b` prefixes.
    pub radix_prefixes: bool,
    /// `_` between digits.
    pub separators: bool,
    /// Single-letter suffixes such as `n` or `j`.
    pub suffixes: &'static [u8],
}

pub(crate) struct Scanner<'a> {
    units: &'a [u16],
    pos: usize,
    tokens: Vec<Token>,
    last: Option<LastToken>,
}

impl<'a> Scanner<'a> {
    pub fn new(units: &'a [u16]) -> Self {
        Self {
            units,
            pos: 0,
            tokens: Vec::new(),
            last: None,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.units.len()
    }

    pub fn peek(&self) -> Option<u16> {
        self.peek_at(0)
    }

    pub fn peek_at(&self, n: usize) -> Option<u16> {
        self.units.get(self.pos + n).copied()
    }

    /// ASCII byte at `pos + n`.
    pub fn byte_at(&self, n: usize) -> Option<u8> {
        self.peek_at(n).and_then(byte)
    }

    /// The code point at the current position.
    pub fn peek_char(&self) -> Option<char> {
        let end = (self.pos + 2).min(self.units.len());
        char::decode_utf16(self.units[self.pos.min(end)..end].iter().copied())
            .next()
            .and_then(Result::ok)
    }

    /// Moves past `n` code units, stopping at the end of the line.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.units.len());
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.units.len());
    }

    /// Moves past one code point.
    pub fn bump(&mut self) {
        let width = match self.peek_char() {
            Some(c) => c.len_utf16(),
            None => 1,
        };
        self.advance(width);
    }

    /// True if the line continues with the ASCII literal `s`.
    pub fn starts_with(&self, s: &str) -> bool {
        self.starts_with_at(0, s)
    }

    pub fn starts_with_at(&self, n: usize, s: &str) -> bool {
        let from = self.pos + n;
        s.bytes()
            .enumerate()
            .all(|(i, b)| self.units.get(from + i) == Some(&u16::from(b)))
    }

    /// Consumes `s` if present.
    pub fn eat(&mut self, s: &str) -> bool {
        let found = self.starts_with(s);
        if found {
            self.advance(s.len());
        }
        found
    }

    /// Consumes code units while `pred` holds. Returns how many.
    pub fn eat_while(&mut self, pred: impl Fn(u16) -> bool) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    pub fn skip_whitespace(&mut self) -> usize {
        self.eat_while(is_space)
    }

    /// Offset of the next occurrence of `s` at or after the current position.
    pub fn find(&self, s: &str) -> Option<usize> {
        (self.pos..self.units.len()).find(|&i| self.starts_with_at(i - self.pos, s))
    }

    /// First non-whitespace unit after the current position.
    pub fn next_non_space(&self) -> Option<u16> {
        self.units[self.pos..].iter().copied().find(|&u| !is_space(u))
    }

    pub fn text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.units.len());
        String::from_utf16_lossy(&self.units[start.min(end)..end])
    }

    /// Records `start..pos` as a token. Empty spans are dropped.
    pub fn emit(&mut self, token_type: TokenType, start: usize) {
        if self.pos <= start {
            return;
        }
        self.tokens
            .push(Token::new(token_type, start, self.pos - start));
        self.last = Some(LastToken {
            token_type,
            text: self.text(start, self.pos),
        });
    }

    /// Records everything from `start` to the end of the line.
    pub fn emit_rest(&mut self, token_type: TokenType, start: usize) {
        self.pos = self.units.len();
        self.emit(token_type, start);
    }

    pub fn last(&self) -> Option<&LastToken> {
        self.last.as_ref()
    }

    /// True if the last token has this type and text.
    pub fn last_is(&self, token_type: TokenType, text: &str) -> bool {
        self.last
            .as_ref()
            .is_some_and(|t| t.token_type == token_type && t.text == text)
    }

    pub fn finish(self, end_state: LineState) -> LineTokens {
        LineTokens {
            tokens: self.tokens,
            end_state,
        }
    }

    /// Consumes an identifier whose first code point satisfies `start` and
    /// the rest `part`. Non-ASCII letters count as both.
    pub fn eat_identifier(&mut self, start: fn(u8) -> bool, part: fn(u8) -> bool) -> bool {
        if !self.ident_char(start) {
            return false;
        }
        self.bump();
        while self.ident_char(part) {
            self.bump();
        }
        true
    }

    fn ident_char(&self, class: fn(u8) -> bool) -> bool {
        match self.peek() {
            Some(unit) => match byte(unit) {
                Some(b) => class(b),
                None => self.peek_char().is_some_and(char::is_alphanumeric),
            },
            None => false,
        }
    }

    /// True if an identifier of the given class starts here.
    pub fn at_identifier(&self, start: fn(u8) -> bool) -> bool {
        self.ident_char(start)
    }

    /// Consumes the body of a quoted string whose opening quote was already
    /// consumed. Returns false if the line ended first.
    pub fn scan_quoted(&mut self, quote: u16) -> bool {
        while let Some(unit) = self.peek() {
            if unit == BACKSLASH {
                self.advance(1);
                self.bump();
            } else if unit == quote {
                self.advance(1);
                return true;
            } else {
                self.bump();
            }
        }
        false
    }

    /// Consumes a numeric literal starting here.
    pub fn scan_number(&mut self, syntax: NumberSyntax) {
        let digit_or_sep = |b: u8, radix_digit: fn(&u8) -> bool| {
            radix_digit(&b) || (syntax.separators && b == b'_')
        };

        if syntax.radix_prefixes && self.byte_at(0) == Some(b'0') {
            let radix: Option<fn(&u8) -> bool> = match self.byte_at(1) {
                Some(b'x' | b'X') => Some(u8::is_ascii_hexdigit),
                Some(b'o' | b'O') => Some(is_octal),
                Some(b'b' | b'B') => Some(is_binary),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance(2);
                self.eat_while(|u| byte(u).is_some_and(|b| digit_or_sep(b, radix)));
                self.eat_suffix(syntax);
                return;
            }
        }

        let decimal = |u: u16| byte(u).is_some_and(|b| digit_or_sep(b, u8::is_ascii_digit));
        self.eat_while(decimal);
        if self.byte_at(0) == Some(b'.') && self.byte_at(1) != Some(b'.') {
            self.advance(1);
            self.eat_while(decimal);
        }
        if matches!(self.byte_at(0), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.byte_at(1), Some(b'+' | b'-')));
            if self.peek_at(1 + sign).is_some_and(is_digit) {
                self.advance(1 + sign);
                self.eat_while(decimal);
            }
        }
        self.eat_suffix(syntax);
    }

    fn eat_suffix(&mut self, syntax: NumberSyntax) {
        if self.byte_at(0).is_some_and(|b| syntax.suffixes.contains(&b)) {
            self.advance(1);
        }
    }

    /// Length of the longest operator in `ops` starting here.
    pub fn match_operator(&self, ops: &[&str]) -> Option<usize> {
        ops.iter()
            .filter(|op| self.starts_with(op))
            .map(|op| op.len())
            .max()
    }
}
