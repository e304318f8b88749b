//! Raw-text to [`Value`] converters.
//!
//! A converter is a pure function of the raw field text and the registry's
//! [`NumberLocale`]. Built-in converters exist for every [`SemanticType`];
//! callers plug in their own by implementing [`Converter`].
//!
//! Blank input never fails for numeric and boolean converters: it yields the
//! type's zero value. Dates and GUIDs have no meaningful zero and reject blank
//! input like any other unparsable literal.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    data::{SemanticType, Value, parse_naive_date, parse_naive_datetime},
    error::{ImportError, ImportResult},
    locale::NumberLocale,
};

pub trait Converter: fmt::Debug + Send + Sync {
    /// Semantic type of every value this converter produces.
    fn target(&self) -> SemanticType;

    fn convert(&self, raw: &str, locale: &NumberLocale) -> ImportResult<Value>;
}

pub type SharedConverter = Arc<dyn Converter>;

#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn target(&self) -> SemanticType {
        SemanticType::String
    }

    fn convert(&self, raw: &str, _locale: &NumberLocale) -> ImportResult<Value> {
        Ok(Value::String(raw.to_string()))
    }
}

macro_rules! integer_converter {
    ($name:ident, $ty:ty, $variant:ident) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Converter for $name {
            fn target(&self) -> SemanticType {
                SemanticType::$variant
            }

            fn convert(&self, raw: &str, locale: &NumberLocale) -> ImportResult<Value> {
                if raw.trim().is_empty() {
                    return Ok(Value::$variant(0));
                }
                let normalized = locale.normalize_integer(raw);
                normalized
                    .parse::<$ty>()
                    .map(Value::$variant)
                    .map_err(|err| ImportError::conversion(raw, SemanticType::$variant, err))
            }
        }
    };
}

integer_converter!(Int16Converter, i16, Int16);
integer_converter!(Int32Converter, i32, Int32);
integer_converter!(Int64Converter, i64, Int64);

#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalConverter;

impl Converter for DecimalConverter {
    fn target(&self) -> SemanticType {
        SemanticType::Decimal
    }

    fn convert(&self, raw: &str, locale: &NumberLocale) -> ImportResult<Value> {
        if raw.trim().is_empty() {
            return Ok(Value::Decimal(Decimal::ZERO));
        }
        parse_decimal(raw, &locale.normalize_decimal(raw)).map(Value::Decimal)
    }
}

fn parse_decimal(raw: &str, normalized: &str) -> ImportResult<Decimal> {
    Decimal::from_str(normalized)
        .or_else(|_| Decimal::from_scientific(normalized))
        .map_err(|err| ImportError::conversion(raw, SemanticType::Decimal, err))
}

macro_rules! float_converter {
    ($name:ident, $ty:ty, $variant:ident) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Converter for $name {
            fn target(&self) -> SemanticType {
                SemanticType::$variant
            }

            fn convert(&self, raw: &str, locale: &NumberLocale) -> ImportResult<Value> {
                if raw.trim().is_empty() {
                    return Ok(Value::$variant(0.0));
                }
                locale
                    .normalize_decimal(raw)
                    .parse::<$ty>()
                    .map(Value::$variant)
                    .map_err(|err| ImportError::conversion(raw, SemanticType::$variant, err))
            }
        }
    };
}

float_converter!(SingleConverter, f32, Single);
float_converter!(DoubleConverter, f64, Double);

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn target(&self) -> SemanticType {
        SemanticType::Boolean
    }

    fn convert(&self, raw: &str, _locale: &NumberLocale) -> ImportResult<Value> {
        let lowered = raw.trim().to_ascii_lowercase();
        let parsed = match lowered.as_str() {
            "" => false,
            "true" | "t" | "yes" | "y" | "1" => true,
            "false" | "f" | "no" | "n" | "0" => false,
            _ => {
                return Err(ImportError::conversion(
                    raw,
                    SemanticType::Boolean,
                    "expected true/false",
                ));
            }
        };
        Ok(Value::Boolean(parsed))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateConverter;

impl Converter for DateConverter {
    fn target(&self) -> SemanticType {
        SemanticType::Date
    }

    fn convert(&self, raw: &str, _locale: &NumberLocale) -> ImportResult<Value> {
        parse_naive_date(raw.trim()).map(Value::Date)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeConverter;

impl Converter for DateTimeConverter {
    fn target(&self) -> SemanticType {
        SemanticType::DateTime
    }

    fn convert(&self, raw: &str, _locale: &NumberLocale) -> ImportResult<Value> {
        parse_naive_datetime(raw.trim()).map(Value::DateTime)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GuidConverter;

impl Converter for GuidConverter {
    fn target(&self) -> SemanticType {
        SemanticType::Guid
    }

    fn convert(&self, raw: &str, _locale: &NumberLocale) -> ImportResult<Value> {
        let trimmed = raw.trim().trim_matches(|c| matches!(c, '{' | '}'));
        Uuid::parse_str(trimmed)
            .map(Value::Guid)
            .map_err(|err| ImportError::conversion(raw, SemanticType::Guid, err))
    }
}

/// Discards its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoredConverter;

impl Converter for IgnoredConverter {
    fn target(&self) -> SemanticType {
        SemanticType::Ignored
    }

    fn convert(&self, _raw: &str, _locale: &NumberLocale) -> ImportResult<Value> {
        Ok(Value::Null)
    }
}

/// Decimal converter that guesses the separator convention per value.
///
/// Accepts `1.5`, `1,5`, `1,234.5`, `1.234,5` and Swiss `1'234.5` regardless
/// of the configured locale. A single separator followed by exactly three
/// digits is ambiguous (`100,000`) and is resolved with the locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientDecimalConverter;

impl Converter for LenientDecimalConverter {
    fn target(&self) -> SemanticType {
        SemanticType::Decimal
    }

    fn convert(&self, raw: &str, locale: &NumberLocale) -> ImportResult<Value> {
        let stripped: String = raw.trim().chars().filter(|c| *c != '\'').collect();
        if stripped.is_empty() {
            return Ok(Value::Decimal(Decimal::ZERO));
        }
        let has_dot = stripped.contains('.');
        let has_comma = stripped.contains(',');
        let normalized = match (has_dot, has_comma) {
            (true, true) => {
                let last_dot = stripped.rfind('.').unwrap_or_default();
                let last_comma = stripped.rfind(',').unwrap_or_default();
                let (group, decimal) = if last_comma > last_dot {
                    ('.', ',')
                } else {
                    (',', '.')
                };
                stripped
                    .chars()
                    .filter(|c| *c != group)
                    .map(|c| if c == decimal { '.' } else { c })
                    .collect::<String>()
            }
            (true, false) | (false, true) => {
                let separator = if has_dot { '.' } else { ',' };
                let occurrences = stripped.matches(separator).count();
                let position = stripped.rfind(separator).unwrap_or_default();
                let digits_after = stripped.len() - position - 1;
                if occurrences == 1 && digits_after == 3 {
                    locale.normalize_decimal(&stripped).into_owned()
                } else if occurrences > 1 {
                    stripped.replace(separator, "")
                } else {
                    stripped.replace(separator, ".")
                }
            }
            (false, false) => stripped,
        };
        parse_decimal(raw, &normalized).map(Value::Decimal)
    }
}

/// Built-in converter for a semantic type.
pub fn builtin(target: SemanticType) -> SharedConverter {
    match target {
        SemanticType::String => Arc::new(StringConverter),
        SemanticType::Int16 => Arc::new(Int16Converter),
        SemanticType::Int32 => Arc::new(Int32Converter),
        SemanticType::Int64 => Arc::new(Int64Converter),
        SemanticType::Decimal => Arc::new(DecimalConverter),
        SemanticType::Single => Arc::new(SingleConverter),
        SemanticType::Double => Arc::new(DoubleConverter),
        SemanticType::Boolean => Arc::new(BooleanConverter),
        SemanticType::Date => Arc::new(DateConverter),
        SemanticType::DateTime => Arc::new(DateTimeConverter),
        SemanticType::Guid => Arc::new(GuidConverter),
        SemanticType::Ignored => Arc::new(IgnoredConverter),
    }
}

/// Per-registry table of which converter backs a semantic type by default.
#[derive(Debug, Clone)]
pub struct ConverterTable {
    entries: BTreeMap<SemanticType, SharedConverter>,
}

impl Default for ConverterTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        for target in [
            SemanticType::String,
            SemanticType::Int32,
            SemanticType::Decimal,
            SemanticType::Int16,
        ] {
            entries.insert(target, builtin(target));
        }
        Self { entries }
    }
}

impl ConverterTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn resolve(&self, target: SemanticType) -> ImportResult<SharedConverter> {
        self.entries
            .get(&target)
            .cloned()
            .ok_or_else(|| ImportError::UnmappedType(target.to_string()))
    }

    pub fn set(&mut self, target: SemanticType, converter: SharedConverter) {
        self.entries.insert(target, converter);
    }

    pub fn contains(&self, target: SemanticType) -> bool {
        self.entries.contains_key(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invariant() -> NumberLocale {
        NumberLocale::invariant()
    }

    #[test]
    fn blank_numeric_input_yields_zero() {
        assert_eq!(Int32Converter.convert("", &invariant()).unwrap(), Value::Int32(0));
        assert_eq!(Int16Converter.convert("  ", &invariant()).unwrap(), Value::Int16(0));
        assert_eq!(
            DecimalConverter.convert("", &invariant()).unwrap(),
            Value::Decimal(Decimal::ZERO)
        );
        assert_eq!(DoubleConverter.convert("", &invariant()).unwrap(), Value::Double(0.0));
        assert_eq!(
            BooleanConverter.convert("", &invariant()).unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn string_passes_through_unchanged() {
        assert_eq!(
            StringConverter.convert("  padded ", &invariant()).unwrap(),
            Value::String("  padded ".to_string())
        );
    }

    #[test]
    fn ignored_discards_input() {
        assert_eq!(IgnoredConverter.convert("anything", &invariant()).unwrap(), Value::Null);
    }

    #[test]
    fn decimal_honors_locale() {
        assert_eq!(
            DecimalConverter.convert("2,43", &NumberLocale::de_de()).unwrap(),
            Value::Decimal(Decimal::new(243, 2))
        );
        assert_eq!(
            DecimalConverter.convert("2.43", &invariant()).unwrap(),
            Value::Decimal(Decimal::new(243, 2))
        );
        assert_eq!(
            DecimalConverter.convert("1'000.5", &NumberLocale::de_ch()).unwrap(),
            Value::Decimal(Decimal::new(10005, 1))
        );
    }

    #[test]
    fn integer_rejects_garbage_and_overflow() {
        let err = Int32Converter.convert("twelve", &invariant()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conversion);
        assert!(Int16Converter.convert("70000", &invariant()).is_err());
        assert_eq!(
            Int32Converter.convert("1,200", &invariant()).unwrap(),
            Value::Int32(1200)
        );
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        assert_eq!(BooleanConverter.convert("True", &invariant()).unwrap(), Value::Boolean(true));
        assert_eq!(BooleanConverter.convert("no", &invariant()).unwrap(), Value::Boolean(false));
        assert!(BooleanConverter.convert("maybe", &invariant()).is_err());
    }

    #[test]
    fn lenient_decimal_accepts_either_convention() {
        let locale = invariant();
        let expected = Value::Decimal(Decimal::new(12345, 1));
        assert_eq!(LenientDecimalConverter.convert("1,234.5", &locale).unwrap(), expected);
        assert_eq!(LenientDecimalConverter.convert("1.234,5", &locale).unwrap(), expected);
        assert_eq!(LenientDecimalConverter.convert("1'234.5", &locale).unwrap(), expected);
        assert_eq!(
            LenientDecimalConverter.convert("12,5", &locale).unwrap(),
            Value::Decimal(Decimal::new(125, 1))
        );
        assert_eq!(
            LenientDecimalConverter.convert("100,000", &locale).unwrap(),
            Value::Decimal(Decimal::new(100000, 0))
        );
        assert_eq!(
            LenientDecimalConverter
                .convert("100,000", &NumberLocale::de_de())
                .unwrap(),
            Value::Decimal(Decimal::new(100, 0))
        );
    }

    #[test]
    fn default_table_maps_core_types_only() {
        let table = ConverterTable::default();
        assert!(table.contains(SemanticType::Decimal));
        let err = table.resolve(SemanticType::Boolean).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot map the following type to ColumnDefinition: Boolean"
        );
    }

    #[test]
    fn builtin_targets_match_requested_type() {
        for name in SemanticType::variants() {
            let target: SemanticType = name.parse().unwrap();
            assert_eq!(builtin(target).target(), target);
        }
    }
}
