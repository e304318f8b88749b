//! Typed projection of cursor rows onto a caller-supplied record type.
//!
//! A record type describes its fields once through [`Record::bindings()`]
//! (usually generated with the [`record!`](crate::record) macro). At
//! [`RecordCursor::setup_columns()`] the header line, or the field list when
//! there is no header, is resolved against those bindings into a table of
//! ordinal -> field slot. Every successful advance then converts the row and
//! writes it into a single retained instance of the record.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::{
    columns::ColumnDefinition,
    converters::{IgnoredConverter, SharedConverter},
    cursor::{CsvCursor, ReadOutcome},
    data::{FieldValue, SemanticType, Value},
    error::{ImportError, ImportResult},
};

type Setter<T> = Box<dyn Fn(&mut T, Value) -> ImportResult<()>>;
type Getter<T> = Box<dyn Fn(&T) -> Value>;

/// A named, typed, settable field of `T`.
pub struct FieldBinding<T> {
    name: &'static str,
    target: SemanticType,
    set: Setter<T>,
    get: Getter<T>,
}

impl<T: 'static> FieldBinding<T> {
    pub fn new<V>(name: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self
    where
        V: FieldValue + 'static,
    {
        Self {
            name,
            target: V::SEMANTIC_TYPE,
            set: Box::new(move |record, value| {
                let actual = value.semantic_type();
                let typed = V::from_value(value).ok_or_else(|| ImportError::FieldTypeMismatch {
                    field: name,
                    expected: V::SEMANTIC_TYPE.to_string(),
                    actual: actual.to_string(),
                })?;
                *get_mut(record) = typed;
                Ok(())
            }),
            get: Box::new(move |record| get(record).to_value()),
        }
    }
}

impl<T> FieldBinding<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn target(&self) -> SemanticType {
        self.target
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish()
    }
}

/// Record types the mapper can populate.
pub trait Record: Default + Sized + 'static {
    /// Bindable fields in declaration order.
    fn bindings() -> Vec<FieldBinding<Self>>;
}

/// Implements [`Record`] for a struct by listing its fields.
///
/// ```
/// use rust_decimal::Decimal;
///
/// #[derive(Debug, Default)]
/// struct Order {
///     id: i32,
///     customer: String,
///     total: Decimal,
/// }
///
/// stream_importer::record!(Order { id, customer, total });
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::mapper::Record for $ty {
            fn bindings() -> ::std::vec::Vec<$crate::mapper::FieldBinding<Self>> {
                ::std::vec![
                    $(
                        $crate::mapper::FieldBinding::new(
                            stringify!($field),
                            |record: &Self| &record.$field,
                            |record: &mut Self| &mut record.$field,
                        )
                    ),+
                ]
            }
        }
    };
}

type HeaderMap = Box<dyn Fn(&str) -> Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setup {
    Pending,
    Bound,
    /// The header line was consumed but could not be bound.
    Failed,
}

pub struct RecordCursor<T: Record> {
    cursor: CsvCursor,
    bindings: Vec<FieldBinding<T>>,
    slots: Vec<Option<usize>>,
    map_header: HeaderMap,
    setup: Setup,
    value: T,
    has_value: bool,
}

impl<T: Record> RecordCursor<T> {
    pub fn new(cursor: CsvCursor) -> Self {
        Self {
            cursor,
            bindings: T::bindings(),
            slots: Vec::new(),
            map_header: Box::new(|header| Some(header.to_string())),
            setup: Setup::Pending,
            value: T::default(),
            has_value: false,
        }
    }

    /// Installs the header -> field name mapping. Returning `None` ignores
    /// the column.
    pub fn set_map_header<F>(&mut self, map: F) -> &mut Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.map_header = Box::new(map);
        self
    }

    pub fn cursor(&self) -> &CsvCursor {
        &self.cursor
    }

    /// Cursor configuration (delimiter, header flag, converters).
    pub fn cursor_mut(&mut self) -> &mut CsvCursor {
        &mut self.cursor
    }

    pub fn column_definitions(&self) -> &[ColumnDefinition] {
        self.cursor.column_definitions()
    }

    pub fn field_count(&self) -> usize {
        self.cursor.field_count()
    }

    pub fn is_closed(&self) -> bool {
        self.cursor.is_closed()
    }

    /// Binds columns to fields. Once a header line has been consumed this
    /// never reads from the source again: later calls succeed if binding
    /// did, and fail with [`ImportError::ColumnsNotDefined`] if it did not.
    pub fn setup_columns(&mut self) -> ImportResult<()> {
        match self.setup {
            Setup::Bound => return Ok(()),
            Setup::Failed => return Err(ImportError::ColumnsNotDefined),
            Setup::Pending => {}
        }
        if self.bindings.is_empty() {
            return Err(ImportError::NoBindableFields(type_name::<T>()));
        }
        let consumes_header = self.cursor.has_header();
        let result = self.bind_columns();
        self.setup = match (&result, consumes_header) {
            (Ok(()), _) => Setup::Bound,
            (Err(_), true) => Setup::Failed,
            (Err(_), false) => Setup::Pending,
        };
        result
    }

    fn bind_columns(&mut self) -> ImportResult<()> {
        if self.cursor.has_header() {
            let headers = self
                .cursor
                .read_header_fields()?
                .ok_or(ImportError::HeadersUndetermined)?;
            for header in &headers {
                match (self.map_header)(header).filter(|name| !name.is_empty()) {
                    None => {
                        let ignored: SharedConverter = Arc::new(IgnoredConverter);
                        self.cursor.add_column_definition_with(
                            header,
                            SemanticType::Ignored,
                            ignored,
                        )?;
                    }
                    Some(field) => {
                        let binding = self.binding_index(&field)?;
                        let (name, target) =
                            (self.bindings[binding].name, self.bindings[binding].target);
                        self.cursor.add_column_definition(name, target)?;
                        self.cursor.map_column(name, header)?;
                    }
                }
            }
        } else {
            for idx in 0..self.bindings.len() {
                let (name, target) = (self.bindings[idx].name, self.bindings[idx].target);
                self.cursor.add_column_definition(name, target)?;
                if let Some(alias) = (self.map_header)(name) {
                    self.cursor.map_column(name, &alias)?;
                }
            }
        }
        self.slots = self
            .cursor
            .column_definitions()
            .iter()
            .map(|definition| {
                if definition.is_ignored() {
                    None
                } else {
                    self.bindings.iter().position(|b| b.name == definition.name())
                }
            })
            .collect();
        debug!(
            "Bound {} of {} column(s) to {}",
            self.slots.iter().flatten().count(),
            self.slots.len(),
            type_name::<T>()
        );
        Ok(())
    }

    fn binding_index(&self, field: &str) -> ImportResult<usize> {
        let mut matches = self
            .bindings
            .iter()
            .enumerate()
            .filter(|(_, binding)| binding.name == field);
        match (matches.next(), matches.next()) {
            (Some((idx, _)), None) => Ok(idx),
            _ => Err(ImportError::FieldNotFound(field.to_string())),
        }
    }

    /// Advances the cursor and materializes the row into the retained record.
    ///
    /// Every column is converted and type-checked before any field is
    /// written, so a failing row leaves the previous record contents
    /// untouched.
    pub fn advance(&mut self) -> ImportResult<ReadOutcome> {
        self.has_value = false;
        if self.setup != Setup::Bound && !self.cursor.is_closed() {
            self.setup_columns()?;
        }
        let outcome = self.cursor.advance()?;
        if !outcome.is_row() {
            return Ok(outcome);
        }
        let row = self.cursor.row().ok_or(ImportError::NoData)?;
        let mut converted = Vec::with_capacity(self.slots.len());
        for (definition, slot) in self.cursor.column_definitions().iter().zip(&self.slots) {
            let Some(binding) = slot else {
                continue;
            };
            let raw = row.get(definition.ordinal()).map(String::as_str).unwrap_or("");
            let value = definition.convert(raw, self.cursor.locale())?;
            let field = &self.bindings[*binding];
            if value.semantic_type() != field.target {
                return Err(ImportError::FieldTypeMismatch {
                    field: field.name,
                    expected: field.target.to_string(),
                    actual: value.semantic_type().to_string(),
                });
            }
            converted.push((*binding, value));
        }
        for (binding, value) in converted {
            (self.bindings[binding].set)(&mut self.value, value)?;
        }
        self.has_value = true;
        Ok(ReadOutcome::RowAvailable)
    }

    /// The retained record, valid until the next advance.
    pub fn record(&self) -> Option<&T> {
        self.has_value.then_some(&self.value)
    }

    pub fn record_owned(&self) -> Option<T>
    where
        T: Clone,
    {
        self.record().cloned()
    }

    /// Current value of the field bound to `ordinal`; ignored columns yield
    /// [`Value::Null`].
    pub fn get_value(&self, ordinal: usize) -> ImportResult<Value> {
        if !self.has_value {
            return Err(ImportError::NoData);
        }
        let slot = self.slots.get(ordinal).ok_or(ImportError::OutOfRange {
            ordinal,
            field_count: self.slots.len(),
        })?;
        Ok(match slot {
            Some(binding) => (self.bindings[*binding].get)(&self.value),
            None => Value::Null,
        })
    }

    pub fn get_value_by_name(&self, name: &str) -> ImportResult<Value> {
        self.get_value(self.cursor.get_ordinal(name)?)
    }

    pub fn close(&mut self) {
        self.has_value = false;
        self.cursor.close();
    }
}

/// Header mapping that converts headers like `"Order Id"` to `order_id`.
pub fn snake_case_headers(header: &str) -> Option<String> {
    use heck::ToSnakeCase;

    let converted = header.to_snake_case();
    (!converted.is_empty()).then_some(converted)
}
