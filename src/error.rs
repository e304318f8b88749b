//! Error taxonomy for the import engine.
//!
//! Every failure surfaced by the tokenizer, the column registry, the cursor
//! and the record mapper is an [`ImportError`]. Callers that only care about
//! the category use [`ImportError::kind()`]; the display strings of the
//! variants are stable and match what existing callers compare against.

use std::io;

use thiserror::Error;

pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Coarse classification of an [`ImportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller misuse: unmapped types, missing columns, unknown fields.
    Configuration,
    /// Malformed quoting or a delimiter mismatch on the current line.
    Parse,
    /// Read after close or value access without a current row.
    StreamState,
    /// A raw field could not be converted to its column type.
    Conversion,
    /// Ordinal outside the registered field count.
    OutOfRange,
    Io,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cannot map the following type to ColumnDefinition: {0}")]
    UnmappedType(String),
    #[error("Column does not exist")]
    ColumnDoesNotExist(String),
    #[error("Column name must contain a value")]
    EmptyColumnName,
    #[error("Column name '{0}' is ambiguous")]
    AmbiguousColumn(String),
    #[error("Cannot start reading if columns are not defined until now.")]
    ColumnsNotDefined,
    #[error("Cannot read header line")]
    HeaderUnreadable,
    #[error("Could not determine headers")]
    HeadersUndetermined,
    #[error("Cannot find field {0}")]
    FieldNotFound(String),
    #[error("The type {0} does not contain any bindable field")]
    NoBindableFields(&'static str),
    #[error("Unknown number locale '{0}'")]
    UnknownLocale(String),
    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),
    #[error("Invalid line end")]
    InvalidLineEnd,
    #[error("Wrong character at column {column}, expected '{delimiter}'")]
    WrongCharacter { column: usize, delimiter: char },
    #[error("Cannot read from closed stream")]
    ClosedStream,
    #[error("No data available")]
    NoData,
    #[error("Ordinal {ordinal} is out of range for {field_count} field(s)")]
    OutOfRange { ordinal: usize, field_count: usize },
    #[error("Failed to convert '{value}' to {target}: {reason}")]
    Conversion {
        value: String,
        target: String,
        reason: String,
    },
    #[error("Field '{field}' expects {expected}, got {actual}")]
    FieldTypeMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::UnmappedType(_)
            | ImportError::ColumnDoesNotExist(_)
            | ImportError::EmptyColumnName
            | ImportError::AmbiguousColumn(_)
            | ImportError::ColumnsNotDefined
            | ImportError::HeaderUnreadable
            | ImportError::HeadersUndetermined
            | ImportError::FieldNotFound(_)
            | ImportError::NoBindableFields(_)
            | ImportError::UnknownLocale(_)
            | ImportError::UnknownEncoding(_) => ErrorKind::Configuration,
            ImportError::InvalidLineEnd | ImportError::WrongCharacter { .. } => ErrorKind::Parse,
            ImportError::ClosedStream | ImportError::NoData => ErrorKind::StreamState,
            ImportError::OutOfRange { .. } => ErrorKind::OutOfRange,
            ImportError::Conversion { .. } | ImportError::FieldTypeMismatch { .. } => {
                ErrorKind::Conversion
            }
            ImportError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn conversion(value: &str, target: impl ToString, reason: impl ToString) -> Self {
        ImportError::Conversion {
            value: value.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_messages_are_stable() {
        assert_eq!(
            ImportError::WrongCharacter {
                column: 13,
                delimiter: ';'
            }
            .to_string(),
            "Wrong character at column 13, expected ';'"
        );
        assert_eq!(
            ImportError::UnmappedType("Boolean".into()).to_string(),
            "Cannot map the following type to ColumnDefinition: Boolean"
        );
        assert_eq!(
            ImportError::ColumnDoesNotExist("x".into()).to_string(),
            "Column does not exist"
        );
        assert_eq!(
            ImportError::FieldNotFound("Missing".into()).to_string(),
            "Cannot find field Missing"
        );
    }

    #[test]
    fn kinds_group_variants() {
        assert_eq!(ImportError::ClosedStream.kind(), ErrorKind::StreamState);
        assert_eq!(ImportError::NoData.kind(), ErrorKind::StreamState);
        assert_eq!(ImportError::InvalidLineEnd.kind(), ErrorKind::Parse);
        assert_eq!(ImportError::ColumnsNotDefined.kind(), ErrorKind::Configuration);
        assert_eq!(
            ImportError::OutOfRange {
                ordinal: 3,
                field_count: 3
            }
            .kind(),
            ErrorKind::OutOfRange
        );
    }
}
