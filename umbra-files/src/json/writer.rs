use std::fmt::{Display, Formatter, Write};

use crate::json::types::{JsonDocument, JsonRef, JsonValue};

/// Compact serialization. Strings are written back verbatim, so escape sequences survive unchanged.
impl Display for JsonRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_value(f, self.document(), self.value())
    }
}

impl JsonDocument {
    pub fn to_json_string(&self) -> String {
        self.root().to_string()
    }
}

fn write_value<W: Write>(out: &mut W, document: &JsonDocument, value: &JsonValue) -> std::fmt::Result {
    match value {
        JsonValue::Null => out.write_str("null"),
        JsonValue::String(span) => write!(out, "\"{}\"", document.text(*span)),
        JsonValue::Long(value) => write!(out, "{}", value),
        // Debug keeps the fractional part (1.0 instead of 1), so the value reads back as a double
        JsonValue::Double(value) if value.is_finite() => write!(out, "{:?}", value),
        JsonValue::Double(_) => out.write_str("null"),
        JsonValue::Bool(value) => write!(out, "{}", value),
        JsonValue::Array(elements) => {
            out.write_char('[')?;
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_value(out, document, element)?;
            }
            out.write_char(']')
        }
        JsonValue::Object(members) => {
            out.write_char('{')?;
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write!(out, "\"{}\":", document.text(member.key))?;
                write_value(out, document, &member.value)?;
            }
            out.write_char('}')
        }
    }
}
