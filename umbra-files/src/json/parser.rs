use crate::json::lexer::Lexer;
use crate::json::types::{JsonMember, JsonValue, Token, TokenKind};
use crate::ParserError;

/// Objects and arrays nested deeper than this are rejected instead of exhausting the stack.
pub const MAX_DEPTH: usize = 256;

/// Recursive descent parser over a [`Lexer`], holding the current token and one token of lookahead.
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    lookahead: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParserError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next()?;
        let lookahead = lexer.next()?;
        Ok(Self {
            source,
            lexer,
            current,
            lookahead,
            depth: 0,
        })
    }

    /// Parses the whole document. The root must be an object or an array and must be followed by
    /// nothing but whitespace.
    pub fn parse(mut self) -> Result<JsonValue, ParserError> {
        let root = match self.current.kind {
            TokenKind::LeftBrace => self.parse_object()?,
            TokenKind::LeftBracket => self.parse_array()?,
            TokenKind::Eof => return Err(ParserError::EmptySource),
            _ => return Err(self.unexpected(self.current, "'{' or '['")),
        };

        if self.current.kind != TokenKind::Eof {
            return Err(self.unexpected(self.current, "end of input"));
        }
        Ok(root)
    }

    fn advance(&mut self) -> Result<Token, ParserError> {
        let token = self.current;
        self.current = self.lookahead;
        self.lookahead = self.lexer.next()?;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParserError> {
        if self.current.kind != kind {
            return Err(self.unexpected(self.current, expected));
        }
        self.advance()
    }

    fn unexpected(&self, token: Token, expected: &'static str) -> ParserError {
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            // an unhandled token is a single byte and may split a multi-byte character
            kind => format!(
                "{:?} {:?}",
                kind,
                String::from_utf8_lossy(&self.source.as_bytes()[token.span.start..token.span.end])
            ),
        };
        ParserError::UnexpectedToken {
            expected,
            found,
            offset: token.span.start,
        }
    }

    fn enter(&mut self) -> Result<(), ParserError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParserError::NestingTooDeep {
                offset: self.current.span.start,
            });
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<JsonValue, ParserError> {
        match self.current.kind {
            TokenKind::LeftBrace => self.parse_object(),
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::String | TokenKind::Ident => Ok(JsonValue::String(self.advance()?.span)),
            TokenKind::Number => {
                let token = self.advance()?;
                self.parse_number(token)
            }
            TokenKind::True => {
                self.advance()?;
                Ok(JsonValue::Bool(true))
            }
            TokenKind::False => {
                self.advance()?;
                Ok(JsonValue::Bool(false))
            }
            TokenKind::Null => {
                self.advance()?;
                Ok(JsonValue::Null)
            }
            _ => Err(self.unexpected(self.current, "a value")),
        }
    }

    fn parse_object(&mut self) -> Result<JsonValue, ParserError> {
        self.expect(TokenKind::LeftBrace, "'{'")?;
        self.enter()?;

        let mut members = Vec::new();
        while matches!(self.current.kind, TokenKind::String | TokenKind::Ident) {
            if self.lookahead.kind != TokenKind::Colon {
                return Err(self.unexpected(self.lookahead, "':'"));
            }
            let key = self.advance()?.span;
            self.advance()?;

            let value = self.parse_value()?;
            members.push(JsonMember { key, value });

            if self.current.kind != TokenKind::Comma {
                break;
            }
            self.advance()?;
        }

        self.expect(TokenKind::RightBrace, "'}' or an object key")?;
        self.depth -= 1;
        Ok(JsonValue::Object(members))
    }

    fn parse_array(&mut self) -> Result<JsonValue, ParserError> {
        self.expect(TokenKind::LeftBracket, "'['")?;
        self.enter()?;

        let mut elements = Vec::new();
        while self.current.kind != TokenKind::RightBracket {
            elements.push(self.parse_value()?);

            if self.current.kind != TokenKind::Comma {
                break;
            }
            self.advance()?;
        }

        self.expect(TokenKind::RightBracket, "']' or ','")?;
        self.depth -= 1;
        Ok(JsonValue::Array(elements))
    }

    fn parse_number(&self, token: Token) -> Result<JsonValue, ParserError> {
        let literal = &self.source[token.span.start..token.span.end];
        let invalid = || ParserError::InvalidNumber {
            literal: literal.to_string(),
            offset: token.span.start,
        };

        if literal.contains(&['.', 'e', 'E'][..]) {
            return literal.parse::<f64>().map(JsonValue::Double).map_err(|_| invalid());
        }

        match literal.parse::<i64>() {
            Ok(value) => Ok(JsonValue::Long(value)),
            // integers beyond 64 bit still are valid JSON numbers
            Err(_) => literal
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(JsonValue::Double)
                .ok_or_else(invalid),
        }
    }
}
