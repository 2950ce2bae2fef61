//! A zero-copy JSON reader: the [`lexer::Lexer`] turns the source into tokens, the [`parser::Parser`]
//! builds a [`types::JsonValue`] tree whose strings and keys are spans into the source text, and
//! [`types::JsonDocument`] keeps the source and the tree together so the spans stay valid.
pub mod escape;
pub mod lexer;
pub mod parser;
pub mod types;
pub mod writer;


pub use escape::unescape;
pub use types::{JsonDocument, JsonMember, JsonRef, JsonValue, Span};
