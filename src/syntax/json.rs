//! JSON scanner. JSON has no multi-line constructs, so every line ends in
//! the normal state.

use super::scanner::{NumberSyntax, Scanner, byte};
use super::token::{LineState, LineTokens, TokenType};

const NUMBERS: NumberSyntax = NumberSyntax {
    radix_prefixes: false,
    separators: false,
    suffixes: b"",
};

/// Tokenizes one line of JSON.
pub(crate) fn tokenize(units: &[u16], _state: LineState) -> LineTokens {
    let mut s = Scanner::new(units);

    loop {
        s.skip_whitespace();
        let start = s.pos();
        let Some(unit) = s.peek() else {
            break;
        };

        match byte(unit) {
            Some(b'"') => {
                s.advance(1);
                s.scan_quoted(unit);
                let token_type = if s.next_non_space() == Some(u16::from(b':')) {
                    TokenType::Property
                } else {
                    TokenType::String
                };
                s.emit(token_type, start);
            }
            Some(b'-' | b'0'..=b'9') => {
                s.eat("-");
                s.scan_number(NUMBERS);
                s.emit(TokenType::Number, start);
            }
            Some(b'{' | b'}' | b'[' | b']' | b':' | b',') => {
                s.advance(1);
                s.emit(TokenType::Punctuation, start);
            }
            Some(b) if b.is_ascii_alphabetic() => {
                s.eat_while(|u| byte(u).is_some_and(|b| b.is_ascii_alphanumeric()));
                let word = s.text(start, s.pos());
                let token_type = if matches!(word.as_str(), "true" | "false" | "null") {
                    TokenType::Constant
                } else {
                    TokenType::Unknown
                };
                s.emit(token_type, start);
            }
            _ => {
                s.bump();
                s.emit(TokenType::Unknown, start);
            }
        }
    }
    s.finish(LineState::normal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::token::Token;

    fn run(line: &str) -> Vec<Token> {
        let units: Vec<u16> = line.encode_utf16().collect();
        tokenize(&units, LineState::normal()).tokens
    }

    #[test]
    fn test_keys_and_values() {
        use TokenType::*;
        let kinds: Vec<TokenType> = run(r#"{"name": "quill", "n": -1.5e3, "ok": true}"#)
            .iter()
            .map(|t| t.token_type)
            .collect();
        assert_eq!(kinds, vec![
            Punctuation,
            Property,
            Punctuation,
            String,
            Punctuation,
            Property,
            Punctuation,
            Number,
            Punctuation,
            Property,
            Punctuation,
            Constant,
            Punctuation
        ]);
    }

    #[test]
    fn test_garbage_degrades_to_unknown() {
        assert_eq!(run("nope ;"), vec![
            Token::new(TokenType::Unknown, 0, 4),
            Token::new(TokenType::Unknown, 5, 1),
        ]);
    }
}
