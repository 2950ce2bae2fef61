use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected {expected} at byte {offset}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("Unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },

    #[error("Invalid numeric literal {literal:?} at byte {offset}")]
    InvalidNumber { literal: String, offset: usize },

    #[error("Nesting exceeds the maximum depth at byte {offset}")]
    NestingTooDeep { offset: usize },

    #[error("Missing mandatory field {field} in {section}")]
    MissingField {
        field: &'static str,
        section: &'static str,
    },

    #[error("Field {field} has an unexpected type")]
    InvalidFieldType { field: &'static str },

    #[error("Unknown accessor type {0:?}")]
    UnknownAccessorType(String),

    #[error("Unknown value {value} for {field}")]
    UnknownEnumValue { field: &'static str, value: u64 },

    #[error("{kind} index {index} is out of bounds (len {len})")]
    DanglingReference {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Accessor {accessor} reads past the end of its buffer view")]
    AccessorOutOfBounds { accessor: usize },

    #[error("Buffer view {buffer_view} reaches past the end of its buffer")]
    BufferViewOutOfBounds { buffer_view: usize },

    #[error("The file's magic value does not match the expectation {magic:#06x}")]
    InvalidMagicValue { magic: u32 },

    #[error("The file is violating the expected format, because: {reason}")]
    FormatError { reason: &'static str },

    /// Represents an empty source, e.g. an empty OBJ file or a JSON document without any token.
    #[error("Source contains no data")]
    EmptySource,

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    UTF8ConversationError(#[from] std::str::Utf8Error),
}

pub mod bmp;
pub mod common;
pub mod gltf;
pub mod json;
pub mod obj;
