//! Hand-written scanner turning schema and query text into tokens.
//!
//! Lexing never fails: malformed input becomes a [`TokenKind::Error`] token
//! and the parser reports it with the token's span.

use super::{Keyword, Span, Token, TokenKind};

/// Scans SQL text one token at a time.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
    /// Byte offset where the token being scanned began.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the start of `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn first(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.first()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes `expected` if it is the next character.
    fn eat(&mut self, expected: char) -> bool {
        let matched = self.first() == Some(expected);
        if matched {
            self.pos += expected.len_utf8();
        }
        matched
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.first().is_some_and(&pred) {
            self.bump();
        }
    }

    fn lexeme(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    const fn token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    fn error(&self, message: impl Into<String>) -> Token {
        self.token(TokenKind::Error(message.into()))
    }

    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            if self.rest().starts_with("--") {
                self.eat_while(|c| c != '\n');
            } else if self.rest().starts_with("/*") {
                // An unterminated block comment runs to the end of input.
                self.pos = self.rest()[2..]
                    .find("*/")
                    .map_or(self.input.len(), |at| self.pos + 2 + at + 2);
            } else {
                return;
            }
        }
    }

    /// Reads up to the closing `quote`, where a doubled quote stands for one.
    /// Returns `None` when the input ends first.
    fn delimited(&mut self, quote: char) -> Option<String> {
        let mut text = String::new();
        loop {
            match self.bump()? {
                c if c == quote && !self.eat(quote) => return Some(text),
                c => text.push(c),
            }
        }
    }

    fn word(&mut self) -> Token {
        self.eat_while(|c| c.is_alphanumeric() || c == '_');
        let text = self.lexeme();
        match Keyword::from_str(text) {
            Some(keyword) => self.token(TokenKind::Keyword(keyword)),
            None => self.token(TokenKind::Identifier(text.to_string())),
        }
    }

    fn number(&mut self) -> Token {
        self.eat_while(|c| c.is_ascii_digit());
        let mut float = false;
        if self.first() == Some('.') && self.second().is_some_and(|c| c.is_ascii_digit()) {
            float = true;
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.first(), Some('e' | 'E')) {
            float = true;
            self.bump();
            if !self.eat('+') {
                self.eat('-');
            }
            self.eat_while(|c| c.is_ascii_digit());
        }

        let text = self.lexeme();
        if float {
            text.parse::<f64>().map_or_else(
                |e| self.error(format!("Invalid float: {e}")),
                |f| self.token(TokenKind::Float(f)),
            )
        } else {
            text.parse::<i64>().map_or_else(
                |e| self.error(format!("Invalid integer: {e}")),
                |i| self.token(TokenKind::Integer(i)),
            )
        }
    }

    /// `X'48656C6C6F'`; the `X` is already consumed.
    fn blob(&mut self) -> Token {
        self.bump();
        let Some(body) = self.delimited('\'') else {
            return self.error("Unterminated blob literal");
        };
        let digits: Vec<u8> = body.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if !digits.iter().all(u8::is_ascii_hexdigit) {
            return self.error("Invalid character in blob literal");
        }
        if digits.len() % 2 == 1 {
            return self.error("Odd number of hex digits in blob literal");
        }
        let bytes = digits
            .chunks(2)
            .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
            .collect();
        self.token(TokenKind::Blob(bytes))
    }

    /// Operators and punctuation starting with `c`, which is consumed.
    fn symbol(&mut self, c: char) -> Token {
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '~' => TokenKind::BitNot,
            '&' => TokenKind::BitAnd,
            '?' => TokenKind::Question,
            '@' => TokenKind::At,
            '=' => TokenKind::Eq,
            '-' if self.eat('>') => {
                if self.eat('>') {
                    TokenKind::LongArrow
                } else {
                    TokenKind::Arrow
                }
            }
            '-' => TokenKind::Minus,
            ':' if self.eat(':') => TokenKind::DoubleColon,
            ':' => TokenKind::Colon,
            '|' if self.eat('|') => TokenKind::Concat,
            '|' => TokenKind::BitOr,
            '!' if self.eat('=') => TokenKind::NotEq,
            '<' if self.eat('=') => TokenKind::LtEq,
            '<' if self.eat('>') => TokenKind::NotEq,
            '<' if self.eat('<') => TokenKind::LeftShift,
            '<' => TokenKind::Lt,
            '>' if self.eat('=') => TokenKind::GtEq,
            '>' if self.eat('>') => TokenKind::RightShift,
            '>' => TokenKind::Gt,
            other => return self.error(format!("Unexpected character: {other}")),
        };
        self.token(kind)
    }

    /// Scans the next token; at the end of input this is always
    /// [`TokenKind::Eof`].
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        self.start = self.pos;
        let Some(c) = self.bump() else {
            return self.token(TokenKind::Eof);
        };
        match c {
            '\'' => match self.delimited('\'') {
                Some(text) => self.token(TokenKind::String(text)),
                None => self.error("Unterminated string literal"),
            },
            // Quoted names are never keywords.
            '"' | '`' => match self.delimited(c) {
                Some(name) => self.token(TokenKind::Identifier(name)),
                None => self.error("Unterminated quoted identifier"),
            },
            'X' | 'x' if self.first() == Some('\'') => self.blob(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.word(),
            c => self.symbol(c),
        }
    }

    /// Scans the whole input; the last token is [`TokenKind::Eof`].
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(String::from(name))
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(token_kinds("   \n\t  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            token_kinds("SELECT -- comment\n/* block */ FROM"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_type_names_lex_as_identifiers() {
        assert_eq!(
            token_kinds("a TINYINT(1) NOT NULL"),
            vec![
                ident("a"),
                ident("TINYINT"),
                TokenKind::LeftParen,
                TokenKind::Integer(1),
                TokenKind::RightParen,
                TokenKind::Keyword(Keyword::Not),
                TokenKind::Keyword(Keyword::Null),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_identifiers_are_never_keywords() {
        assert_eq!(
            token_kinds("\"select\" `first`"),
            vec![ident("select"), ident("first"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            token_kinds("42 3.5 1e3"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Float(3.5),
                TokenKind::Float(1e3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_with_escaped_quote() {
        assert_eq!(
            token_kinds("'it''s'"),
            vec![TokenKind::String(String::from("it's")), TokenKind::Eof]
        );
    }

    #[test]
    fn test_blob() {
        let kinds = token_kinds("X'48454C4C4F'");
        assert!(matches!(&kinds[0], TokenKind::Blob(b) if b == b"HELLO"));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("- -> ->> <> != || << >="),
            vec![
                TokenKind::Minus,
                TokenKind::Arrow,
                TokenKind::LongArrow,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Concat,
                TokenKind::LeftShift,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_span_tracking() {
        let tokens = Lexer::new("ALTER TABLE t").tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 5));
        assert_eq!(tokens[2].span, Span::new(12, 13));
    }

    #[test]
    fn test_parameter_placeholders() {
        assert_eq!(
            token_kinds("? ?1 :name"),
            vec![
                TokenKind::Question,
                TokenKind::Question,
                TokenKind::Integer(1),
                TokenKind::Colon,
                ident("name"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_literals() {
        assert!(matches!(
            &token_kinds("'open")[0],
            TokenKind::Error(msg) if msg == "Unterminated string literal"
        ));
        assert!(matches!(
            &token_kinds("X'ABC'")[0],
            TokenKind::Error(msg) if msg == "Odd number of hex digits in blob literal"
        ));
        assert_eq!(token_kinds("a /* never closed"), vec![ident("a"), TokenKind::Eof]);
    }

    #[test]
    fn test_cast_operator() {
        assert_eq!(
            token_kinds("x::int"),
            vec![ident("x"), TokenKind::DoubleColon, ident("int"), TokenKind::Eof]
        );
    }
}
