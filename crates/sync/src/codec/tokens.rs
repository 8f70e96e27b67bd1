use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::FieldError;

/// Terminates every scalar token.
pub const FIELD_SEPARATOR: char = ';';
/// Terminates every record of a frame.
pub const RECORD_SEPARATOR: char = ':';

/// Appends FIELD-terminated tokens to an owned frame buffer.
#[derive(Debug, Clone)]
pub struct TokenWriter {
    out: String,
    precision: usize,
}

impl TokenWriter {
    pub fn new(precision: usize) -> Self {
        Self {
            out: String::new(),
            precision,
        }
    }

    /// Writes `value` rounded to the writer's fractional precision.
    pub fn float(&mut self, value: f64) {
        let _ = write!(self.out, "{:.*}", self.precision, value);
        self.out.push(FIELD_SEPARATOR);
    }

    pub fn uint(&mut self, value: impl Into<u64>) {
        let _ = write!(self.out, "{}", value.into());
        self.out.push(FIELD_SEPARATOR);
    }

    pub fn count(&mut self, len: usize) {
        let _ = write!(self.out, "{len}");
        self.out.push(FIELD_SEPARATOR);
    }

    pub fn flag(&mut self, value: bool) {
        self.out.push(if value { '1' } else { '0' });
        self.out.push(FIELD_SEPARATOR);
    }

    pub fn end_record(&mut self) {
        self.out.push(RECORD_SEPARATOR);
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Cursor over the tokens of a single record.
#[derive(Debug, Clone)]
pub struct TokenReader<'a> {
    rest: &'a str,
    field: usize,
    /// Complete tokens left in `rest`, counted once at construction.
    remaining: usize,
}

impl<'a> TokenReader<'a> {
    pub fn new(record: &'a str) -> Self {
        Self {
            rest: record,
            field: 0,
            remaining: record.bytes().filter(|b| *b == FIELD_SEPARATOR as u8).count(),
        }
    }

    /// Index of the next token to be read.
    pub fn field(&self) -> usize {
        self.field
    }

    /// Number of complete tokens left in the record.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn take(&mut self) -> Result<(usize, &'a str), FieldError> {
        let Some(end) = self.rest.find(FIELD_SEPARATOR) else {
            return Err(FieldError::Truncated { field: self.field });
        };
        let token = &self.rest[..end];
        self.rest = &self.rest[end + 1..];
        self.remaining -= 1;
        let field = self.field;
        self.field += 1;
        Ok((field, token))
    }

    pub fn parse<T: FromStr>(&mut self, expected: &'static str) -> Result<T, FieldError> {
        let (field, token) = self.take()?;
        token.parse().map_err(|_| FieldError::Malformed {
            field,
            expected,
            token: token.to_owned(),
        })
    }

    pub fn float(&mut self) -> Result<f64, FieldError> {
        self.parse("a number")
    }

    pub fn u32(&mut self) -> Result<u32, FieldError> {
        self.parse("an unsigned integer")
    }

    pub fn flag(&mut self) -> Result<bool, FieldError> {
        let (field, token) = self.take()?;
        match token {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(FieldError::Malformed {
                field,
                expected: "0 or 1",
                token: token.to_owned(),
            }),
        }
    }

    /// Reads a collection count whose items take at least `min_tokens` each.
    ///
    /// A count that cannot fit in what is left of the record is reported as
    /// truncation here, before anything is allocated for it.
    pub fn count(&mut self, min_tokens: usize) -> Result<usize, FieldError> {
        let count: usize = self.parse("an element count")?;
        let remaining = self.remaining();
        if count.saturating_mul(min_tokens) > remaining {
            return Err(FieldError::Truncated {
                field: self.field + remaining,
            });
        }
        Ok(count)
    }

    /// Succeeds only if every token of the record has been consumed.
    pub fn finish(&self) -> Result<(), FieldError> {
        if self.rest.is_empty() {
            return Ok(());
        }
        let token = self
            .rest
            .split(FIELD_SEPARATOR)
            .next()
            .unwrap_or_default();
        Err(FieldError::Malformed {
            field: self.field,
            expected: "end of record",
            token: token.to_owned(),
        })
    }
}

/// One RECORD-delimited slice of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub index: usize,
    pub body: &'a str,
    /// False for a trailing slice that never saw its RECORD separator.
    pub terminated: bool,
}

impl<'a> RawRecord<'a> {
    pub fn reader(&self) -> TokenReader<'a> {
        TokenReader::new(self.body)
    }

    /// Field index at which an unterminated record was cut off.
    pub fn truncation_field(&self) -> usize {
        TokenReader::new(self.body).remaining()
    }
}

/// Splits a frame into its records.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    rest: &'a str,
    index: usize,
}

impl<'a> Records<'a> {
    pub fn new(frame: &'a str) -> Self {
        Self {
            rest: frame,
            index: 0,
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let index = self.index;
        self.index += 1;

        match self.rest.find(RECORD_SEPARATOR) {
            Some(end) => {
                let body = &self.rest[..end];
                self.rest = &self.rest[end + 1..];
                Some(RawRecord {
                    index,
                    body,
                    terminated: true,
                })
            }
            None => {
                let body = self.rest;
                self.rest = "";
                Some(RawRecord {
                    index,
                    body,
                    terminated: false,
                })
            }
        }
    }
}
