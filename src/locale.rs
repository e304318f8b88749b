//! Number formatting conventions used by the numeric converters.
//!
//! A [`NumberLocale`] is owned by each column registry; nothing here is
//! process-global. The list separator doubles as the default field delimiter
//! for cursors constructed from a locale.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ImportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLocale {
    name: String,
    decimal_separator: char,
    group_separator: Option<char>,
    list_separator: char,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::invariant()
    }
}

impl NumberLocale {
    pub fn new(
        name: impl Into<String>,
        decimal_separator: char,
        group_separator: Option<char>,
        list_separator: char,
    ) -> Self {
        Self {
            name: name.into(),
            decimal_separator,
            group_separator,
            list_separator,
        }
    }

    pub fn invariant() -> Self {
        Self::new("invariant", '.', Some(','), ',')
    }

    pub fn en_us() -> Self {
        Self::new("en-US", '.', Some(','), ',')
    }

    pub fn de_de() -> Self {
        Self::new("de-DE", ',', Some('.'), ';')
    }

    pub fn de_ch() -> Self {
        Self::new("de-CH", '.', Some('\''), ';')
    }

    pub fn fr_fr() -> Self {
        Self::new("fr-FR", ',', Some('\u{202f}'), ';')
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn group_separator(&self) -> Option<char> {
        self.group_separator
    }

    pub fn list_separator(&self) -> char {
        self.list_separator
    }

    pub fn with_list_separator(mut self, separator: char) -> Self {
        self.list_separator = separator;
        self
    }

    /// Rewrites a localized decimal literal into the `.`-separated form the
    /// standard parsers accept. Group separators are removed, as are plain
    /// and no-break spaces when the locale groups with a space.
    pub fn normalize_decimal<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let trimmed = value.trim();
        let needs_rewrite = trimmed
            .chars()
            .any(|ch| ch == self.decimal_separator || self.is_group_char(ch));
        if !needs_rewrite || (self.decimal_separator == '.' && !self.has_group_char(trimmed)) {
            return Cow::Borrowed(trimmed);
        }
        let mut normalized = String::with_capacity(trimmed.len());
        for ch in trimmed.chars() {
            if self.is_group_char(ch) {
                continue;
            }
            if ch == self.decimal_separator {
                normalized.push('.');
            } else {
                normalized.push(ch);
            }
        }
        Cow::Owned(normalized)
    }

    /// Integers accept group separators but no decimal separator.
    pub fn normalize_integer<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let trimmed = value.trim();
        if !self.has_group_char(trimmed) {
            return Cow::Borrowed(trimmed);
        }
        Cow::Owned(trimmed.chars().filter(|ch| !self.is_group_char(*ch)).collect())
    }

    fn has_group_char(&self, value: &str) -> bool {
        value.chars().any(|ch| self.is_group_char(ch))
    }

    fn is_group_char(&self, ch: char) -> bool {
        match self.group_separator {
            Some(sep) if sep == ch => true,
            Some(sep) if sep.is_whitespace() => ch.is_whitespace(),
            _ => false,
        }
    }
}

impl fmt::Display for NumberLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for NumberLocale {
    type Err = ImportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "" | "invariant" | "c" => Ok(Self::invariant()),
            "en" | "en-us" | "en-gb" => Ok(Self::en_us()),
            "de" | "de-de" | "de-at" => Ok(Self::de_de()),
            "de-ch" => Ok(Self::de_ch()),
            "fr" | "fr-fr" => Ok(Self::fr_fr()),
            _ => Err(ImportError::UnknownLocale(value.to_string())),
        }
    }
}

impl Serialize for NumberLocale {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for NumberLocale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
