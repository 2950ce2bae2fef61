use crate::json::types::{Span, Token, TokenKind};
use crate::ParserError;

pub struct Lexer<'a> {
    source: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.position += 1;
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.position;
        self.position += 1;
        Token {
            kind,
            span: Span::new(start, self.position),
        }
    }

    /// Returns the next token. Once the source is exhausted every call returns [`TokenKind::Eof`]
    /// with an empty span at the end of the source.
    pub fn next(&mut self) -> Result<Token, ParserError> {
        self.skip_whitespace();

        let Some(byte) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(self.source.len(), self.source.len()),
            });
        };

        let token = match byte {
            b'{' => self.single(TokenKind::LeftBrace),
            b'}' => self.single(TokenKind::RightBrace),
            b'[' => self.single(TokenKind::LeftBracket),
            b']' => self.single(TokenKind::RightBracket),
            b':' => self.single(TokenKind::Colon),
            b',' => self.single(TokenKind::Comma),
            b'"' => self.string()?,
            b'0'..=b'9' | b'-' | b'+' => self.number(),
            b if b.is_ascii_alphabetic() || b == b'_' => self.word(),
            _ => self.single(TokenKind::Unhandled),
        };
        Ok(token)
    }

    fn string(&mut self) -> Result<Token, ParserError> {
        let opening = self.position;
        self.position += 1;
        let start = self.position;

        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(ParserError::UnterminatedString { offset: opening }),
                // the escaped byte can never close the string
                Some(b'\\') => match self.source.get(self.position + 1) {
                    None | Some(b'\n') => return Err(ParserError::UnterminatedString { offset: opening }),
                    Some(_) => self.position += 2,
                },
                Some(b'"') => break,
                Some(_) => self.position += 1,
            }
        }

        let end = self.position;
        self.position += 1;
        Ok(Token {
            kind: TokenKind::String,
            span: Span::new(start, end),
        })
    }

    fn number(&mut self) -> Token {
        let start = self.position;
        while let Some(b'0'..=b'9' | b'.' | b'-' | b'+' | b'e' | b'E') = self.peek() {
            self.position += 1;
        }
        Token {
            kind: TokenKind::Number,
            span: Span::new(start, self.position),
        }
    }

    fn word(&mut self) -> Token {
        let start = self.position;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.position += 1;
        }

        let kind = match &self.source[start..self.position] {
            b"true" => TokenKind::True,
            b"false" => TokenKind::False,
            b"null" => TokenKind::Null,
            _ => TokenKind::Ident,
        };
        Token {
            kind,
            span: Span::new(start, self.position),
        }
    }
}
