use std::borrow::Cow;
use std::str::Chars;

use crate::ParserError;

fn invalid_escape() -> ParserError {
    ParserError::FormatError {
        reason: "Invalid escape sequence in a string",
    }
}

fn hex4(chars: &mut Chars) -> Result<u32, ParserError> {
    let mut code = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(invalid_escape)?;
        code = code * 16 + digit;
    }
    Ok(code)
}

/// Resolves the escape sequences of a raw string span, borrowing when there are none. `\u`
/// surrogate pairs are combined, lone surrogates are an error.
pub fn unescape(raw: &str) -> Result<Cow<'_, str>, ParserError> {
    if !raw.contains('\\') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let resolved = match chars.next() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => {
                let high = hex4(&mut chars)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(invalid_escape());
                    }
                    let low = hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(invalid_escape());
                    }
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                char::from_u32(code).ok_or_else(invalid_escape)?
            }
            _ => return Err(invalid_escape()),
        };
        out.push(resolved);
    }
    Ok(Cow::Owned(out))
}
