//! Forward-only row cursor over delimited text.
//!
//! [`CsvCursor`] pulls one physical line per [`CsvCursor::advance()`] call,
//! tokenizes it and reconciles it with the registered columns: short rows are
//! right-padded with empty strings and long rows are truncated. The current
//! row is overwritten in place on every advance; [`CsvCursor::row()`] hands out
//! a borrow, [`CsvCursor::row_owned()`] a copy that outlives the next advance.
//!
//! A blank or whitespace-only line ends the stream even when more data
//! follows it. Reading after the end (or after [`CsvCursor::close()`]) fails
//! with [`ImportError::ClosedStream`].

use std::io::{BufRead, Read};
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    columns::{ColumnDefinition, ColumnRef, ColumnRegistry},
    converters::SharedConverter,
    data::{SemanticType, Value},
    error::{ImportError, ImportResult},
    io_utils::{CloseHandle, LineSource},
    locale::NumberLocale,
    tokenizer::LineTokenizer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Unopened,
    HeaderPending,
    Ready,
    Closed,
}

/// Result of a successful [`CsvCursor::advance()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ReadOutcome {
    RowAvailable,
    EndOfStream,
}

impl ReadOutcome {
    pub fn is_row(self) -> bool {
        matches!(self, ReadOutcome::RowAvailable)
    }
}

pub struct CsvCursor {
    source: LineSource,
    tokenizer: LineTokenizer,
    registry: ColumnRegistry,
    has_header: bool,
    closed: bool,
    row: Vec<String>,
    has_row: bool,
}

impl CsvCursor {
    pub fn new(source: LineSource) -> Self {
        Self::with_locale(source, NumberLocale::invariant())
    }

    /// Builds a cursor whose delimiter defaults to the locale's list separator.
    pub fn with_locale(source: LineSource, locale: NumberLocale) -> Self {
        Self {
            source,
            tokenizer: LineTokenizer::new(locale.list_separator()),
            registry: ColumnRegistry::new(locale),
            has_header: false,
            closed: false,
            row: Vec::new(),
            has_row: false,
        }
    }

    pub fn from_buf_read<R>(reader: R) -> Self
    where
        R: BufRead + 'static,
    {
        Self::new(LineSource::from_buf_read(reader))
    }

    pub fn from_reader<R>(reader: R, encoding: &'static Encoding) -> Self
    where
        R: Read + 'static,
    {
        Self::new(LineSource::decoding(reader, encoding))
    }

    pub fn from_path(path: &Path) -> ImportResult<Self> {
        Self::open(path, UTF_8, NumberLocale::invariant())
    }

    /// Opens `path` (or stdin for `-`) decoding from `encoding`.
    pub fn open(
        path: &Path,
        encoding: &'static Encoding,
        locale: NumberLocale,
    ) -> ImportResult<Self> {
        Ok(Self::with_locale(LineSource::open(path, encoding)?, locale))
    }

    pub fn set_header(&mut self, has_header: bool) -> &mut Self {
        self.has_header = has_header;
        self
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn set_delimiter(&mut self, delimiter: char) -> &mut Self {
        self.tokenizer.set_delimiter(delimiter);
        self
    }

    pub fn delimiter(&self) -> char {
        self.tokenizer.delimiter()
    }

    pub fn set_locale(&mut self, locale: NumberLocale) -> &mut Self {
        self.registry.set_locale(locale);
        self
    }

    pub fn locale(&self) -> &NumberLocale {
        self.registry.locale()
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.source.close_handle()
    }

    pub fn state(&self) -> CursorState {
        if self.is_closed() {
            CursorState::Closed
        } else if !self.registry.is_empty() {
            CursorState::Ready
        } else if self.has_header {
            CursorState::HeaderPending
        } else {
            CursorState::Unopened
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed || !self.source.is_readable()
    }

    pub fn field_count(&self) -> usize {
        self.registry.len()
    }

    pub fn column_definitions(&self) -> &[ColumnDefinition] {
        self.registry.definitions()
    }

    pub fn column_definition(&self, ordinal: usize) -> Option<&ColumnDefinition> {
        self.registry.get(ordinal)
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn add_column_definition(
        &mut self,
        name: &str,
        target: SemanticType,
    ) -> ImportResult<&ColumnDefinition> {
        self.registry.add_column_definition(name, target)
    }

    pub fn add_column_definition_with(
        &mut self,
        name: &str,
        target: SemanticType,
        converter: SharedConverter,
    ) -> ImportResult<&ColumnDefinition> {
        self.registry
            .add_column_definition_with(name, target, converter)
    }

    pub fn set_default_converter(&mut self, target: SemanticType, converter: SharedConverter) {
        self.registry.set_default_converter(target, converter);
    }

    pub fn set_data_type<'a>(
        &mut self,
        column: impl Into<ColumnRef<'a>>,
        converter: SharedConverter,
    ) -> ImportResult<&ColumnDefinition> {
        self.registry.set_data_type(column, converter)
    }

    pub fn map_column(&mut self, name: &str, input_column: &str) -> ImportResult<()> {
        self.registry.map_column(name, input_column)
    }

    pub fn get_ordinal(&self, name: &str) -> ImportResult<usize> {
        self.registry.ordinal_of(name)
    }

    /// Reads the header line now instead of on the first [`advance()`](Self::advance).
    pub fn setup_columns(&mut self) -> ImportResult<()> {
        if self.has_header && self.registry.is_empty() {
            self.read_header()?;
        }
        Ok(())
    }

    pub fn advance(&mut self) -> ImportResult<ReadOutcome> {
        self.has_row = false;
        if self.is_closed() {
            return Err(ImportError::ClosedStream);
        }
        if self.registry.is_empty() {
            if !self.has_header {
                return Err(ImportError::ColumnsNotDefined);
            }
            self.read_header()?;
        }

        let field_count = self.registry.len();
        let line = match self.source.read_line()? {
            Some(line) if !line.trim().is_empty() => line,
            _ => {
                self.close();
                return Ok(ReadOutcome::EndOfStream);
            }
        };
        self.tokenizer.tokenize_into(line, &mut self.row)?;
        self.row.resize(field_count, String::new());
        self.has_row = true;
        Ok(ReadOutcome::RowAvailable)
    }

    /// Tokenized header fields, trimmed. Consumes one line.
    pub(crate) fn read_header_fields(&mut self) -> ImportResult<Option<Vec<String>>> {
        if self.is_closed() {
            return Err(ImportError::ClosedStream);
        }
        let line = match self.source.read_line()? {
            Some(line) if !line.trim().is_empty() => line,
            _ => return Ok(None),
        };
        let fields = self.tokenizer.tokenize(line)?;
        Ok(Some(fields.iter().map(|field| field.trim().to_string()).collect()))
    }

    fn read_header(&mut self) -> ImportResult<()> {
        let fields = self
            .read_header_fields()?
            .ok_or(ImportError::HeaderUnreadable)?;
        if fields.iter().any(String::is_empty) {
            return Err(ImportError::EmptyColumnName);
        }
        for field in &fields {
            self.registry
                .add_column_definition(field, SemanticType::String)?;
        }
        debug!("Discovered {} header column(s)", fields.len());
        Ok(())
    }

    /// Current row, valid until the next advance.
    pub fn row(&self) -> Option<&[String]> {
        self.has_row.then_some(self.row.as_slice())
    }

    pub fn row_owned(&self) -> Option<Vec<String>> {
        self.row().map(<[String]>::to_vec)
    }

    pub fn raw_value(&self, ordinal: usize) -> ImportResult<&str> {
        let row = self.row().ok_or(ImportError::NoData)?;
        row.get(ordinal)
            .map(String::as_str)
            .ok_or(ImportError::OutOfRange {
                ordinal,
                field_count: row.len(),
            })
    }

    /// Converted value at `ordinal` using that column's converter.
    pub fn get_value(&self, ordinal: usize) -> ImportResult<Value> {
        let raw = self.raw_value(ordinal)?;
        self.registry.convert(ordinal, raw)
    }

    pub fn get_value_by_name(&self, name: &str) -> ImportResult<Value> {
        self.get_value(self.get_ordinal(name)?)
    }

    /// Fills `values` with as many converted fields as fit.
    pub fn get_values(&self, values: &mut [Value]) -> ImportResult<usize> {
        let count = self.field_count().min(values.len());
        for (ordinal, slot) in values.iter_mut().enumerate().take(count) {
            *slot = self.get_value(ordinal)?;
        }
        Ok(count)
    }

    pub fn is_null(&self, ordinal: usize) -> ImportResult<bool> {
        Ok(self.get_value(ordinal)?.is_null())
    }

    pub fn close(&mut self) {
        if !self.closed {
            debug!("Closing cursor after {} line(s)", self.source.lines_read());
        }
        self.closed = true;
        self.has_row = false;
        self.source.close();
    }
}
