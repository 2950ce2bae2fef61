use std::str::FromStr;

use crate::common::reader::Parseable;
use crate::ParserError;

/// A set of bytes that end a word.
#[derive(Clone, Copy)]
pub struct SeparatorSet([bool; 256]);

impl SeparatorSet {
    pub const fn new(separators: &[u8]) -> Self {
        let mut table = [false; 256];
        let mut i = 0;
        while i < separators.len() {
            table[separators[i] as usize] = true;
            i += 1;
        }
        Self(table)
    }

    /// Space, tab, carriage return and newline.
    pub const WHITESPACE: SeparatorSet = SeparatorSet::new(b" \t\r\n");

    /// No separators at all, for purely binary reads.
    pub const NONE: SeparatorSet = SeparatorSet::new(b"");

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.0[byte as usize]
    }
}

/// Splits a byte buffer into words, either freely or bounded by the current line, and offers typed
/// little endian reads for binary formats at the current position.
pub struct WordTokenizer<'a> {
    data: &'a [u8],
    position: usize,
    separators: SeparatorSet,
}

impl<'a> WordTokenizer<'a> {
    pub fn new(data: &'a [u8], separators: SeparatorSet) -> Self {
        Self {
            data,
            position: 0,
            separators,
        }
    }

    pub fn binary(data: &'a [u8]) -> Self {
        Self::new(data, SeparatorSet::NONE)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn seek(&mut self, position: usize) -> Result<(), ParserError> {
        if position > self.data.len() {
            return Err(ParserError::FormatError {
                reason: "Seek past the end of the buffer",
            });
        }
        self.position = position;
        Ok(())
    }

    /// The next word, skipping any leading separators (newlines included).
    pub fn next_word(&mut self) -> Option<&'a [u8]> {
        while !self.is_eof() && self.separators.contains(self.data[self.position]) {
            self.position += 1;
        }
        self.take_word()
    }

    /// The next word on the current line, or `None` once the line (or the buffer) ends. The newline
    /// itself is not consumed.
    pub fn next_word_on_line(&mut self) -> Option<&'a [u8]> {
        while !self.is_eof() {
            let byte = self.data[self.position];
            if byte == b'\n' || !self.separators.contains(byte) {
                break;
            }
            self.position += 1;
        }

        if self.is_eof() || self.data[self.position] == b'\n' {
            return None;
        }
        self.take_word()
    }

    fn take_word(&mut self) -> Option<&'a [u8]> {
        let start = self.position;
        while !self.is_eof() && !self.separators.contains(self.data[self.position]) {
            self.position += 1;
        }

        let data = self.data;
        (self.position > start).then(|| &data[start..self.position])
    }

    /// The remainder of the current line with surrounding blanks trimmed. Consumes the newline.
    pub fn rest_of_line(&mut self) -> &'a [u8] {
        let start = self.position;
        while !self.is_eof() && self.data[self.position] != b'\n' {
            self.position += 1;
        }
        let data = self.data;
        let line = &data[start..self.position];
        self.skip_line();
        line.trim_ascii()
    }

    /// Skips to the beginning of the next line.
    pub fn skip_line(&mut self) {
        while !self.is_eof() {
            let byte = self.data[self.position];
            self.position += 1;
            if byte == b'\n' {
                break;
            }
        }
    }

    /// Reads the next word on the current line and parses it as `T`.
    pub fn next_value<T: FromStr>(&mut self) -> Result<T, ParserError> {
        let offset = self.position;
        let word = self.next_word_on_line().ok_or(ParserError::FormatError {
            reason: "Line ended before all values were read",
        })?;
        let literal = std::str::from_utf8(word)?;
        literal.parse::<T>().map_err(|_| ParserError::InvalidNumber {
            literal: literal.to_string(),
            offset,
        })
    }

    /// Typed binary read at the current position, advancing past the consumed bytes.
    pub fn read<T: Parseable<T>>(&mut self) -> Result<T, ParserError> {
        let mut remaining = &self.data[self.position.min(self.data.len())..];
        let available = remaining.len();
        let value = T::parse(&mut remaining)?;
        self.position += available - remaining.len();
        Ok(value)
    }

    pub fn read_at<T: Parseable<T>>(&mut self, position: usize) -> Result<T, ParserError> {
        self.seek(position)?;
        self.read()
    }
}
