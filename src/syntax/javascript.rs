//! JavaScript and TypeScript scanner.
//!
//! Template literals nest: `${` opens an expression inside the template and
//! a backtick inside that expression opens another template. The number of
//! open expressions is carried in [`LineState::template_depth`]; brace
//! counts inside each expression are tracked per line only.

use super::scanner::{NumberSyntax, Scanner, byte, is_digit};
use super::token::{LineState, LineStateKind, LineTokens, TokenType};

const KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "finally", "for", "from", "function",
    "get", "if", "import", "in", "instanceof", "let", "new", "of", "return", "set", "static",
    "super", "switch", "this", "throw", "try", "typeof", "var", "void", "while", "with", "yield",
];

const TS_KEYWORDS: &[&str] = &[
    "abstract", "as", "declare", "enum", "implements", "infer", "interface", "is", "keyof",
    "module", "namespace", "private", "protected", "public", "readonly", "satisfies", "type",
];

const TS_TYPES: &[&str] = &[
    "any", "bigint", "boolean", "never", "number", "object", "string", "symbol", "unknown",
];

const CONSTANTS: &[&str] = &["true", "false", "null", "undefined", "NaN", "Infinity"];

const BUILTINS: &[&str] = &[
    "Array", "BigInt", "Boolean", "Date", "Error", "JSON", "Map", "Math", "Number", "Object",
    "Promise", "Proxy", "Reflect", "RegExp", "Set", "String", "Symbol", "WeakMap", "WeakSet",
    "console", "document", "globalThis", "parseFloat", "parseInt", "require", "window",
];

/// Keywords after which a `/` starts a regex literal.
const REGEX_AFTER: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

const OPERATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "+", "-", "*", "/", "%", "=", "<", ">", "!", "~", "&", "|",
    "^", "?",
];

const NUMBERS: NumberSyntax = NumberSyntax {
    radix_prefixes: true,
    separators: true,
    suffixes: b"n",
};

fn ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn ident_part(b: u8) -> bool {
    ident_start(b) || b.is_ascii_digit()
}

/// Tokenizes one line of JavaScript, or TypeScript when `typescript` is set.
pub(crate) fn tokenize(units: &[u16], state: LineState, typescript: bool) -> LineTokens {
    // States produced by other languages restart as plain code.
    let kind = match state.kind {
        LineStateKind::BlockComment | LineStateKind::TemplateString => state.kind,
        _ => LineStateKind::Normal,
    };
    let lexer = Lexer {
        s: Scanner::new(units),
        kind,
        braces: vec![0; usize::from(state.template_depth)],
        typescript,
    };
    lexer.run()
}

struct Lexer<'a> {
    s: Scanner<'a>,
    kind: LineStateKind,
    /// Open `{` count inside each enclosing `${` expression.
    braces: Vec<u16>,
    typescript: bool,
}

impl Lexer<'_> {
    fn run(mut self) -> LineTokens {
        loop {
            let start = self.s.pos();
            let more = match self.kind {
                LineStateKind::BlockComment => self.block_comment(start),
                LineStateKind::TemplateString => self.template_text(start),
                _ => self.code(),
            };
            if !more {
                break;
            }
        }
        let end_state = LineState {
            kind: self.kind,
            template_depth: u16::try_from(self.braces.len()).unwrap_or(u16::MAX),
            block_depth: 0,
        };
        self.s.finish(end_state)
    }

    /// Scans to `*/`, emitting one comment token from `start`.
    fn block_comment(&mut self, start: usize) -> bool {
        match self.s.find("*/") {
            Some(end) => {
                self.s.set_pos(end + 2);
                self.s.emit(TokenType::Comment, start);
                self.kind = LineStateKind::Normal;
                true
            }
            None => {
                self.s.emit_rest(TokenType::Comment, start);
                self.kind = LineStateKind::BlockComment;
                false
            }
        }
    }

    /// Scans template text up to the closing backtick or the next `${`.
    fn template_text(&mut self, start: usize) -> bool {
        loop {
            if self.s.at_end() {
                self.s.emit(TokenType::String, start);
                self.kind = LineStateKind::TemplateString;
                return false;
            }
            match self.s.byte_at(0) {
                Some(b'\\') => {
                    self.s.advance(1);
                    self.s.bump();
                }
                Some(b'`') => {
                    self.s.advance(1);
                    self.s.emit(TokenType::String, start);
                    self.kind = LineStateKind::Normal;
                    return true;
                }
                Some(b'$') if self.s.byte_at(1) == Some(b'{') => {
                    self.s.emit(TokenType::String, start);
                    let open = self.s.pos();
                    self.s.advance(2);
                    self.s.emit(TokenType::Punctuation, open);
                    self.braces.push(0);
                    self.kind = LineStateKind::Normal;
                    return true;
                }
                _ => self.s.bump(),
            }
        }
    }

    /// Scans one token of code. Returns false at the end of the line.
    fn code(&mut self) -> bool {
        self.s.skip_whitespace();
        let start = self.s.pos();
        let Some(unit) = self.s.peek() else {
            return false;
        };

        match byte(unit) {
            Some(b'/') if self.s.starts_with("//") => {
                self.s.emit_rest(TokenType::Comment, start);
                return false;
            }
            Some(b'/') if self.s.starts_with("/*") => {
                self.s.advance(2);
                return self.block_comment(start);
            }
            Some(b'`') => {
                self.s.advance(1);
                return self.template_text(start);
            }
            Some(b'"' | b'\'') => {
                self.s.advance(1);
                self.s.scan_quoted(unit);
                self.s.emit(TokenType::String, start);
            }
            Some(b'}') if self.braces.last() == Some(&0) => {
                self.s.advance(1);
                self.s.emit(TokenType::Punctuation, start);
                self.braces.pop();
                self.kind = LineStateKind::TemplateString;
            }
            Some(b'{') => {
                if let Some(open) = self.braces.last_mut() {
                    *open += 1;
                }
                self.punctuation(start);
            }
            Some(b'}') => {
                if let Some(open) = self.braces.last_mut() {
                    *open = open.saturating_sub(1);
                }
                self.punctuation(start);
            }
            Some(b'0'..=b'9') => self.number(start),
            Some(b'.') if self.s.peek_at(1).is_some_and(is_digit) => self.number(start),
            Some(b'@') if self.at_identifier_after(1) => {
                self.s.advance(1);
                self.s.eat_identifier(ident_start, ident_part);
                self.s.emit(TokenType::Decorator, start);
            }
            Some(b'#') if self.at_identifier_after(1) => {
                self.s.advance(1);
                self.s.eat_identifier(ident_start, ident_part);
                self.s.emit(TokenType::Property, start);
            }
            Some(b'/') if self.regex_allowed() && self.scan_regex() => {
                self.s.emit(TokenType::Regex, start);
            }
            _ if self.s.at_identifier(ident_start) => self.identifier(start),
            _ => self.operator_or_punctuation(start),
        }
        true
    }

    fn at_identifier_after(&self, n: usize) -> bool {
        self.s.byte_at(n).is_some_and(ident_start)
    }

    fn number(&mut self, start: usize) {
        self.s.scan_number(NUMBERS);
        self.s.emit(TokenType::Number, start);
    }

    fn punctuation(&mut self, start: usize) {
        self.s.advance(1);
        self.s.emit(TokenType::Punctuation, start);
    }

    fn operator_or_punctuation(&mut self, start: usize) {
        if let Some(len) = self.s.match_operator(OPERATORS) {
            self.s.advance(len);
            self.s.emit(TokenType::Operator, start);
        } else if matches!(
            self.s.byte_at(0),
            Some(b'(' | b')' | b'[' | b']' | b';' | b',' | b'.' | b':')
        ) {
            self.punctuation(start);
        } else {
            self.s.bump();
            self.s.emit(TokenType::Unknown, start);
        }
    }

    fn identifier(&mut self, start: usize) {
        self.s.eat_identifier(ident_start, ident_part);
        let text = self.s.text(start, self.s.pos());
        let token_type = self.classify(&text);
        self.s.emit(token_type, start);
    }

    fn classify(&self, word: &str) -> TokenType {
        let called = self.s.next_non_space() == Some(u16::from(b'('));
        let after_dot = self.s.last().is_some_and(|t| t.text == "." || t.text == "?.");
        if after_dot {
            return if called {
                TokenType::Function
            } else {
                TokenType::Property
            };
        }

        if CONSTANTS.contains(&word) {
            return TokenType::Constant;
        }
        if KEYWORDS.contains(&word) || (self.typescript && TS_KEYWORDS.contains(&word)) {
            return TokenType::Keyword;
        }
        if self.typescript && TS_TYPES.contains(&word) {
            return TokenType::Type;
        }

        let after_keyword = |kw: &[&str]| {
            self.s.last().is_some_and(|t| {
                t.token_type == TokenType::Keyword && kw.contains(&t.text.as_str())
            })
        };
        if after_keyword(&["function"]) {
            return TokenType::Function;
        }
        if after_keyword(&["class", "extends", "implements", "interface", "type", "enum", "new"]) {
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

    fn regex_allowed(&self) -> bool {
        match self.s.last() {
            None => true,
            Some(last) => match last.token_type {
                TokenType::Operator => true,
                TokenType::Punctuation => !matches!(last.text.as_str(), ")" | "]" | "}"),
                TokenType::Keyword => REGEX_AFTER.contains(&last.text.as_str()),
                _ => false,
            },
        }
    }

    /// Consumes a regex literal if one closes on this line.
    fn scan_regex(&mut self) -> bool {
        let start = self.s.pos();
        self.s.advance(1);
        let mut in_class = false;
        loop {
            match self.s.byte_at(0) {
                _ if self.s.at_end() => {
                    self.s.set_pos(start);
                    return false;
                }
                Some(b'\\') => {
                    self.s.advance(1);
                    self.s.bump();
                }
                Some(b'[') => {
                    in_class = true;
                    self.s.advance(1);
                }
                Some(b']') => {
                    in_class = false;
                    self.s.advance(1);
                }
                Some(b'/') if !in_class => {
                    self.s.advance(1);
                    self.s.eat_while(|u| byte(u).is_some_and(|b| b.is_ascii_alphabetic()));
                    return true;
                }
                _ => self.s.bump(),
            }
        }
    }
}
