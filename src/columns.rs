//! Column definition registry.
//!
//! Holds the ordered [`ColumnDefinition`]s of a cursor. Ordinals are dense and
//! follow insertion order; re-adding an existing name updates that definition
//! in place. Each registry owns its converter table and number locale, so two
//! cursors never observe each other's overrides.

use std::fmt;

use log::debug;

use crate::{
    converters::{ConverterTable, SharedConverter},
    data::{SemanticType, Value},
    error::{ImportError, ImportResult},
    locale::NumberLocale,
};

#[derive(Clone)]
pub struct ColumnDefinition {
    name: String,
    input_column: String,
    ordinal: usize,
    target: SemanticType,
    converter: SharedConverter,
}

impl ColumnDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source column this definition reads from (the header text).
    pub fn input_column(&self) -> &str {
        &self.input_column
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn target(&self) -> SemanticType {
        self.target
    }

    pub fn is_ignored(&self) -> bool {
        self.target.is_ignored()
    }

    pub fn converter(&self) -> &SharedConverter {
        &self.converter
    }

    pub fn convert(&self, raw: &str, locale: &NumberLocale) -> ImportResult<Value> {
        self.converter.convert(raw, locale)
    }
}

impl fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("name", &self.name)
            .field("input_column", &self.input_column)
            .field("ordinal", &self.ordinal)
            .field("target", &self.target)
            .finish()
    }
}

/// Column addressed either by ordinal or by name.
#[derive(Debug, Clone, Copy)]
pub enum ColumnRef<'a> {
    Ordinal(usize),
    Name(&'a str),
}

impl From<usize> for ColumnRef<'_> {
    fn from(value: usize) -> Self {
        ColumnRef::Ordinal(value)
    }
}

impl<'a> From<&'a str> for ColumnRef<'a> {
    fn from(value: &'a str) -> Self {
        ColumnRef::Name(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    definitions: Vec<ColumnDefinition>,
    converters: ConverterTable,
    locale: NumberLocale,
}

impl ColumnRegistry {
    pub fn new(locale: NumberLocale) -> Self {
        Self {
            definitions: Vec::new(),
            converters: ConverterTable::default(),
            locale,
        }
    }

    pub fn locale(&self) -> &NumberLocale {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: NumberLocale) {
        self.locale = locale;
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> &[ColumnDefinition] {
        &self.definitions
    }

    pub fn get(&self, ordinal: usize) -> Option<&ColumnDefinition> {
        self.definitions.get(ordinal)
    }

    /// Adds a column using the registry's default converter for `target`.
    pub fn add_column_definition(
        &mut self,
        name: &str,
        target: SemanticType,
    ) -> ImportResult<&ColumnDefinition> {
        let converter = self.converters.resolve(target)?;
        self.add_column_definition_with(name, target, converter)
    }

    /// Adds a column with an explicit converter, bypassing the default table.
    pub fn add_column_definition_with(
        &mut self,
        name: &str,
        target: SemanticType,
        converter: SharedConverter,
    ) -> ImportResult<&ColumnDefinition> {
        if name.is_empty() {
            return Err(ImportError::EmptyColumnName);
        }
        let position = match self.position_of(name)? {
            Some(position) => {
                let definition = &mut self.definitions[position];
                definition.input_column = name.to_string();
                definition.target = target;
                definition.converter = converter;
                position
            }
            None => {
                let ordinal = self.definitions.len();
                self.definitions.push(ColumnDefinition {
                    name: name.to_string(),
                    input_column: name.to_string(),
                    ordinal,
                    target,
                    converter,
                });
                debug!("Registered column '{name}' as {target} at ordinal {ordinal}");
                ordinal
            }
        };
        Ok(&self.definitions[position])
    }

    pub fn set_default_converter(&mut self, target: SemanticType, converter: SharedConverter) {
        self.converters.set(target, converter);
    }

    /// Swaps the converter of an existing column, keeping its name, input
    /// alias and ordinal. The column's target type follows the converter.
    pub fn set_data_type<'a>(
        &mut self,
        column: impl Into<ColumnRef<'a>>,
        converter: SharedConverter,
    ) -> ImportResult<&ColumnDefinition> {
        let ordinal = self.resolve(column.into())?;
        let definition = &mut self.definitions[ordinal];
        definition.target = converter.target();
        definition.converter = converter;
        Ok(&*definition)
    }

    pub fn map_column(&mut self, name: &str, input_column: &str) -> ImportResult<()> {
        let position = self
            .position_of(name)?
            .ok_or_else(|| ImportError::ColumnDoesNotExist(name.to_string()))?;
        self.definitions[position].input_column = input_column.to_string();
        Ok(())
    }

    pub fn ordinal_of(&self, name: &str) -> ImportResult<usize> {
        self.position_of(name)?
            .ok_or_else(|| ImportError::ColumnDoesNotExist(name.to_string()))
    }

    pub fn resolve(&self, column: ColumnRef<'_>) -> ImportResult<usize> {
        match column {
            ColumnRef::Ordinal(ordinal) if ordinal < self.definitions.len() => Ok(ordinal),
            ColumnRef::Ordinal(ordinal) => Err(ImportError::OutOfRange {
                ordinal,
                field_count: self.definitions.len(),
            }),
            ColumnRef::Name(name) => self.ordinal_of(name),
        }
    }

    /// Converts the raw field at `ordinal` with that column's converter.
    pub fn convert(&self, ordinal: usize, raw: &str) -> ImportResult<Value> {
        let definition = self.definitions.get(ordinal).ok_or(ImportError::OutOfRange {
            ordinal,
            field_count: self.definitions.len(),
        })?;
        definition.convert(raw, &self.locale)
    }

    fn position_of(&self, name: &str) -> ImportResult<Option<usize>> {
        let mut matches = self
            .definitions
            .iter()
            .enumerate()
            .filter(|(_, definition)| definition.name == name)
            .map(|(idx, _)| idx);
        let first = matches.next();
        if matches.next().is_some() {
            return Err(ImportError::AmbiguousColumn(name.to_string()));
        }
        Ok(first)
    }
}
