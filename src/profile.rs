//! YAML import profiles.
//!
//! A profile captures everything needed to read one kind of file: delimiter,
//! header flag, input encoding, number locale and the typed column list.
//! Applying a profile to a [`CsvCursor`] registers its columns. With a header
//! line, each header is matched against the profile's `input` (or `name`);
//! headers the profile does not mention become ignored columns.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    converters::{self, IgnoredConverter},
    cursor::CsvCursor,
    data::SemanticType,
    error::{ImportError, ImportResult},
    io_utils,
    locale::NumberLocale,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    #[serde(rename = "type", default = "ColumnProfile::default_type")]
    pub target: SemanticType,
    /// Header text to read from when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl ColumnProfile {
    pub fn new(name: impl Into<String>, target: SemanticType) -> Self {
        Self {
            name: name.into(),
            target,
            input: None,
        }
    }

    pub fn input_column(&self) -> &str {
        self.input.as_deref().unwrap_or(&self.name)
    }

    fn default_type() -> SemanticType {
        SemanticType::String
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(default = "ImportProfile::default_header")]
    pub header: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default)]
    pub locale: NumberLocale,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnProfile>,
}

impl Default for ImportProfile {
    fn default() -> Self {
        Self {
            delimiter: None,
            header: Self::default_header(),
            encoding: None,
            locale: NumberLocale::default(),
            columns: Vec::new(),
        }
    }
}

impl ImportProfile {
    fn default_header() -> bool {
        true
    }

    /// Skeleton profile with one string column per header.
    pub fn from_headers(headers: &[String], delimiter: char, locale: NumberLocale) -> Self {
        Self {
            delimiter: Some(delimiter),
            header: true,
            encoding: None,
            locale,
            columns: headers
                .iter()
                .filter(|header| !header.is_empty())
                .map(|header| ColumnProfile::new(header.as_str(), SemanticType::String))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening profile {path:?}"))?;
        let profile: ImportProfile = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing profile {path:?}"))?;
        Ok(profile)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating profile {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing profile YAML")
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing profile to YAML string")
    }

    pub fn resolve_encoding(&self) -> ImportResult<&'static Encoding> {
        io_utils::resolve_encoding(self.encoding.as_deref())
    }

    /// Configures `cursor` and registers the profile's columns.
    ///
    /// With `header: true` and a non-empty column list this consumes the
    /// header line. Every header must resolve to a distinct column name;
    /// unclaimed headers keep their text as the name of an ignored column.
    pub fn apply(&self, cursor: &mut CsvCursor) -> ImportResult<()> {
        if let Some(delimiter) = self.delimiter {
            cursor.set_delimiter(delimiter);
        }
        cursor.set_header(self.header).set_locale(self.locale.clone());
        if self.columns.is_empty() {
            return Ok(());
        }

        if self.header {
            let headers = cursor
                .read_header_fields()?
                .ok_or(ImportError::HeaderUnreadable)?;
            if let Some(missing) = self
                .columns
                .iter()
                .find(|column| !headers.iter().any(|h| h == column.input_column()))
            {
                return Err(ImportError::ColumnDoesNotExist(
                    missing.input_column().to_string(),
                ));
            }
            let claims: Vec<Option<&ColumnProfile>> = headers
                .iter()
                .map(|header| {
                    self.columns
                        .iter()
                        .find(|c| c.input_column() == header.as_str())
                })
                .collect();
            let mut seen = HashSet::new();
            for (header, claim) in headers.iter().zip(&claims) {
                let name = claim.map_or(header.as_str(), |column| column.name.as_str());
                if !seen.insert(name) {
                    return Err(ImportError::AmbiguousColumn(name.to_string()));
                }
            }
            for (header, claim) in headers.iter().zip(claims) {
                match claim {
                    Some(column) => {
                        self.register(cursor, column)?;
                        cursor.map_column(&column.name, header)?;
                    }
                    None => {
                        cursor.add_column_definition_with(
                            header,
                            SemanticType::Ignored,
                            Arc::new(IgnoredConverter),
                        )?;
                    }
                }
            }
        } else {
            for column in &self.columns {
                self.register(cursor, column)?;
                if let Some(input) = &column.input {
                    cursor.map_column(&column.name, input)?;
                }
            }
        }
        debug!(
            "Applied profile with {} column(s), locale {}",
            self.columns.len(),
            self.locale
        );
        Ok(())
    }

    fn register(&self, cursor: &mut CsvCursor, column: &ColumnProfile) -> ImportResult<()> {
        cursor.add_column_definition_with(
            &column.name,
            column.target,
            converters::builtin(column.target),
        )?;
        Ok(())
    }
}
