use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use uuid::Uuid;

use crate::error::{ImportError, ImportResult};

/// Target type of a column, independent of how the raw text is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemanticType {
    String,
    Int16,
    Int32,
    Int64,
    Decimal,
    Single,
    Double,
    Boolean,
    Date,
    DateTime,
    Guid,
    /// Sentinel for columns whose input is discarded.
    Ignored,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::String => "String",
            SemanticType::Int16 => "Int16",
            SemanticType::Int32 => "Int32",
            SemanticType::Int64 => "Int64",
            SemanticType::Decimal => "Decimal",
            SemanticType::Single => "Single",
            SemanticType::Double => "Double",
            SemanticType::Boolean => "Boolean",
            SemanticType::Date => "Date",
            SemanticType::DateTime => "DateTime",
            SemanticType::Guid => "Guid",
            SemanticType::Ignored => "Ignored",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &[
            "string", "int16", "int32", "int64", "decimal", "single", "double", "boolean", "date",
            "datetime", "guid", "ignored",
        ]
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, SemanticType::Ignored)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = ImportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "string" | "text" => Ok(SemanticType::String),
            "int16" | "short" => Ok(SemanticType::Int16),
            "int32" | "int" | "integer" => Ok(SemanticType::Int32),
            "int64" | "long" => Ok(SemanticType::Int64),
            "decimal" => Ok(SemanticType::Decimal),
            "single" | "float" => Ok(SemanticType::Single),
            "double" => Ok(SemanticType::Double),
            "boolean" | "bool" => Ok(SemanticType::Boolean),
            "date" => Ok(SemanticType::Date),
            "datetime" | "timestamp" => Ok(SemanticType::DateTime),
            "guid" | "uuid" => Ok(SemanticType::Guid),
            "ignored" | "ignore" | "skip" => Ok(SemanticType::Ignored),
            _ => Err(ImportError::UnmappedType(value.to_string())),
        }
    }
}

impl Serialize for SemanticType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_str().to_ascii_lowercase())
    }
}

impl<'de> Deserialize<'de> for SemanticType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        SemanticType::from_str(&token).map_err(|err| de::Error::custom(err.to_string()))
    }
}

/// A converted field value.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No value: produced by ignored columns.
    #[default]
    Null,
    String(String),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Decimal(Decimal),
    Single(f32),
    Double(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Guid(Uuid),
}

impl Value {
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Value::Null => SemanticType::Ignored,
            Value::String(_) => SemanticType::String,
            Value::Int16(_) => SemanticType::Int16,
            Value::Int32(_) => SemanticType::Int32,
            Value::Int64(_) => SemanticType::Int64,
            Value::Decimal(_) => SemanticType::Decimal,
            Value::Single(_) => SemanticType::Single,
            Value::Double(_) => SemanticType::Double,
            Value::Boolean(_) => SemanticType::Boolean,
            Value::Date(_) => SemanticType::Date,
            Value::DateTime(_) => SemanticType::DateTime,
            Value::Guid(_) => SemanticType::Guid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Int16(i) => i.to_string(),
            Value::Int32(i) => i.to_string(),
            Value::Int64(i) => i.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Single(f) => f.to_string(),
            Value::Double(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Guid(g) => g.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

/// Rust types that can back a record field.
///
/// `SEMANTIC_TYPE` selects the converter used for the column; `from_value`
/// unpacks the converted [`Value`] and `to_value` reads the field back.
pub trait FieldValue: Sized {
    const SEMANTIC_TYPE: SemanticType;

    fn from_value(value: Value) -> Option<Self>;

    fn to_value(&self) -> Value;
}

macro_rules! field_value {
    ($ty:ty, $variant:ident) => {
        impl FieldValue for $ty {
            const SEMANTIC_TYPE: SemanticType = SemanticType::$variant;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }
    };
}

field_value!(String, String);
field_value!(i16, Int16);
field_value!(i32, Int32);
field_value!(i64, Int64);
field_value!(Decimal, Decimal);
field_value!(f32, Single);
field_value!(f64, Double);
field_value!(bool, Boolean);
field_value!(NaiveDate, Date);
field_value!(NaiveDateTime, DateTime);
field_value!(Uuid, Guid);

pub fn parse_naive_date(value: &str) -> ImportResult<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(ImportError::conversion(value, SemanticType::Date, "unrecognized date format"))
}

pub fn parse_naive_datetime(value: &str) -> ImportResult<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d.%m.%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(ImportError::conversion(
        value,
        SemanticType::DateTime,
        "unrecognized datetime format",
    ))
}
