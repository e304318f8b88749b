//! Quoting-aware line tokenizer.
//!
//! Splits a single physical line into raw field strings with an explicit
//! four-state machine. Quoted fields may contain the delimiter and escape a
//! quote by doubling it; a quote inside an unquoted field is literal text.
//!
//! Two behaviors differ from a naive `split`:
//!
//! - a trailing delimiter does not produce a trailing empty field
//!   (`"a;b;"` yields two fields), and
//! - a quoted field is emitted when its closing quote is followed by the
//!   delimiter; a line that ends right after a closing quote drops it.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ImportError, ImportResult};

pub const DEFAULT_DELIMITER: char = ',';
const QUOTE: char = '"';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartOfField,
    InField,
    InQuotedField,
    AfterQuote,
}

/// Reusable tokenizer bound to one delimiter.
///
/// Keeps its field buffer between calls so tokenizing a stream of lines does
/// not allocate a fresh scratch string per field.
#[derive(Debug, Clone)]
pub struct LineTokenizer {
    delimiter: char,
    field: String,
}

impl Default for LineTokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl LineTokenizer {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            field: String::with_capacity(40),
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: char) {
        self.delimiter = delimiter;
    }

    pub fn tokenize(&mut self, line: &str) -> ImportResult<Vec<String>> {
        let mut fields = Vec::with_capacity(10);
        self.tokenize_into(line, &mut fields)?;
        Ok(fields)
    }

    /// Tokenizes `line` into `fields`, replacing its previous contents.
    ///
    /// On error `fields` holds whatever was emitted before the failure and
    /// must be discarded by the caller.
    pub fn tokenize_into(&mut self, line: &str, fields: &mut Vec<String>) -> ImportResult<()> {
        fields.clear();
        self.field.clear();
        let mut state = State::StartOfField;
        let mut chars: Peekable<Chars<'_>> = line.chars().peekable();
        let mut column = 0usize;

        while let Some(ch) = chars.next() {
            column += 1;
            state = match state {
                State::StartOfField => {
                    if ch == QUOTE {
                        State::InQuotedField
                    } else if ch == self.delimiter {
                        fields.push(String::new());
                        State::StartOfField
                    } else {
                        self.field.push(ch);
                        State::InField
                    }
                }
                State::InField => {
                    if ch == self.delimiter {
                        fields.push(self.take_field());
                        State::StartOfField
                    } else {
                        self.field.push(ch);
                        State::InField
                    }
                }
                State::InQuotedField => {
                    if ch == QUOTE {
                        if chars.next_if_eq(&QUOTE).is_some() {
                            column += 1;
                            self.field.push(QUOTE);
                            State::InQuotedField
                        } else {
                            State::AfterQuote
                        }
                    } else {
                        self.field.push(ch);
                        State::InQuotedField
                    }
                }
                State::AfterQuote => {
                    if ch != self.delimiter {
                        return Err(ImportError::WrongCharacter {
                            column,
                            delimiter: self.delimiter,
                        });
                    }
                    fields.push(self.take_field());
                    State::StartOfField
                }
            };
        }

        match state {
            State::InField => {
                fields.push(self.take_field());
                Ok(())
            }
            State::StartOfField | State::AfterQuote => Ok(()),
            State::InQuotedField => Err(ImportError::InvalidLineEnd),
        }
    }

    fn take_field(&mut self) -> String {
        let value = self.field.clone();
        self.field.clear();
        value
    }
}

/// Tokenizes a single line with a throwaway [`LineTokenizer`].
pub fn tokenize(line: &str, delimiter: char) -> ImportResult<Vec<String>> {
    LineTokenizer::new(delimiter).tokenize(line)
}
