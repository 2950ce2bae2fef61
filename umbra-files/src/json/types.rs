use std::fmt::{Debug, Formatter};

use crate::json::parser::Parser;
use crate::ParserError;

/// A byte range into the source text of a [`JsonDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    /// A quote delimited string, the span excludes the quotes.
    String,
    /// A bare word that is not one of the keywords, e.g. an unquoted key.
    Ident,
    Number,
    True,
    False,
    Null,
    Eof,
    Unhandled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    String(Span),
    Long(i64),
    Double(f64),
    Bool(bool),
    Array(Vec<JsonValue>),
    Object(Vec<JsonMember>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonMember {
    pub key: Span,
    pub value: JsonValue,
}

impl JsonValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::String(_) => "string",
            JsonValue::Long(_) => "integer",
            JsonValue::Double(_) => "number",
            JsonValue::Bool(_) => "bool",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }
}

/// Owns the source text and the tree parsed from it.
pub struct JsonDocument {
    source: String,
    root: JsonValue,
}

impl Debug for JsonDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsonDocument {{ source: [{}], ", self.source.len())?;
        write!(f, "root: {} }}", self.root.type_name())
    }
}

impl JsonDocument {
    pub fn parse(source: impl Into<String>) -> Result<Self, ParserError> {
        let source = source.into();
        let root = Parser::new(&source)?.parse()?;
        Ok(Self { source, root })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ParserError> {
        let source = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
        Self::parse(source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self, span: Span) -> &str {
        &self.source[span.start..span.end]
    }

    pub fn root(&self) -> JsonRef<'_> {
        JsonRef {
            document: self,
            value: &self.root,
        }
    }
}

/// A borrowed cursor into a [`JsonDocument`], resolving spans on access.
#[derive(Clone, Copy)]
pub struct JsonRef<'d> {
    document: &'d JsonDocument,
    value: &'d JsonValue,
}

impl Debug for JsonRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl<'d> JsonRef<'d> {
    fn wrap(&self, value: &'d JsonValue) -> JsonRef<'d> {
        JsonRef {
            document: self.document,
            value,
        }
    }

    pub fn value(&self) -> &'d JsonValue {
        self.value
    }

    pub fn document(&self) -> &'d JsonDocument {
        self.document
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, JsonValue::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self.value, JsonValue::Object(_))
    }

    /// The member named `key`, if this is an object that has one.
    pub fn get(&self, key: &str) -> Option<JsonRef<'d>> {
        match self.value {
            JsonValue::Object(members) => members
                .iter()
                .find(|member| self.document.text(member.key) == key)
                .map(|member| self.wrap(&member.value)),
            _ => None,
        }
    }

    /// Object members in source order. Empty for anything but objects.
    pub fn members(&self) -> impl Iterator<Item = (&'d str, JsonRef<'d>)> + 'd {
        let this = *self;
        let members: &'d [JsonMember] = match self.value {
            JsonValue::Object(members) => members,
            _ => &[],
        };
        members
            .iter()
            .map(move |member| (this.document.text(member.key), this.wrap(&member.value)))
    }

    /// Array elements in source order. Empty for anything but arrays.
    pub fn elements(&self) -> impl Iterator<Item = JsonRef<'d>> + 'd {
        let this = *self;
        let elements: &'d [JsonValue] = match self.value {
            JsonValue::Array(elements) => elements,
            _ => &[],
        };
        elements.iter().map(move |value| this.wrap(value))
    }

    /// Number of elements or members, 0 for scalars.
    pub fn len(&self) -> usize {
        match self.value {
            JsonValue::Array(elements) => elements.len(),
            JsonValue::Object(members) => members.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw string contents, escape sequences are not resolved. See [`crate::json::unescape`].
    pub fn as_str(&self) -> Option<&'d str> {
        match self.value {
            JsonValue::String(span) => Some(self.document.text(*span)),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            JsonValue::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|value| u64::try_from(value).ok())
    }

    /// Integers and reals alike.
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            JsonValue::Long(value) => Some(*value as f64),
            JsonValue::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            JsonValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}
