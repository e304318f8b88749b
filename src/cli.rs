use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;

use crate::{
    cursor::CsvCursor,
    io_utils,
    locale::NumberLocale,
    profile::ImportProfile,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Stream typed rows out of delimited text files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Preview the first few rows of a file in a formatted table
    Preview(PreviewArgs),
    /// List the column definitions a file resolves to
    Columns(ColumnsArgs),
    /// Convert rows to JSON lines using the column types
    Convert(ConvertArgs),
    /// Write an import profile skeleton derived from the header line
    Profile(ProfileArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input file to read (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Field delimiter (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,
    /// Treat the first line as data; columns then come from the profile
    #[arg(long = "no-header", requires = "profile")]
    pub no_header: bool,
    /// YAML import profile describing delimiter, locale and typed columns
    #[arg(short = 'p', long)]
    pub profile: Option<PathBuf>,
    /// Number locale for numeric columns (invariant, en-US, de-DE, de-CH, fr-FR)
    #[arg(long, value_parser = parse_locale)]
    pub locale: Option<NumberLocale>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output JSON lines file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Limit number of rows emitted
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Destination profile (.yaml)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

impl InputArgs {
    /// Profile from `--profile` with command-line overrides folded in.
    pub fn effective_profile(&self) -> Result<ImportProfile> {
        let mut profile = match &self.profile {
            Some(path) => ImportProfile::load(path)?,
            None => ImportProfile::default(),
        };
        if let Some(locale) = &self.locale {
            profile.locale = locale.clone();
        }
        if self.input_encoding.is_some() {
            profile.encoding = self.input_encoding.clone();
        }
        if self.no_header {
            profile.header = false;
        }
        profile.delimiter = Some(io_utils::resolve_input_delimiter(
            &self.input,
            self.delimiter.or(profile.delimiter),
            &profile.locale,
        ));
        Ok(profile)
    }

    /// Opens the input and configures a cursor with its columns resolved.
    pub fn open_cursor(&self) -> Result<CsvCursor> {
        let profile = self.effective_profile()?;
        self.open_with(&profile)
    }

    pub fn open_with(&self, profile: &ImportProfile) -> Result<CsvCursor> {
        let encoding = profile.resolve_encoding()?;
        let mut cursor = CsvCursor::open(&self.input, encoding, profile.locale.clone())
            .with_context(|| format!("Opening input {:?}", self.input))?;
        profile
            .apply(&mut cursor)
            .with_context(|| format!("Applying profile to {:?}", self.input))?;
        cursor
            .setup_columns()
            .with_context(|| format!("Reading header from {:?}", self.input))?;
        debug!(
            "Opened {:?} with delimiter '{}' and {} column(s)",
            self.input,
            printable_delimiter(cursor.delimiter()),
            cursor.field_count()
        );
        Ok(cursor)
    }
}

pub fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\t" => Ok('\t'),
        "comma" | "," => Ok(','),
        "|" | "pipe" => Ok('|'),
        ";" | "semicolon" => Ok(';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if first == '"' || first == '\r' || first == '\n' {
                return Err("Delimiter cannot be a quote or line break".to_string());
            }
            Ok(first)
        }
    }
}

pub fn parse_locale(value: &str) -> Result<NumberLocale, String> {
    value.parse().map_err(|err: crate::error::ImportError| err.to_string())
}

pub fn printable_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_aliases() {
        assert_eq!(parse_delimiter("tab").unwrap(), '\t');
        assert_eq!(parse_delimiter("semicolon").unwrap(), ';');
        assert_eq!(parse_delimiter("#").unwrap(), '#');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("\"").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn command_line_overrides_profile_defaults() {
        let cli = Cli::try_parse_from([
            "stream-importer",
            "preview",
            "-i",
            "data.tsv",
            "--locale",
            "de-DE",
        ])
        .unwrap();
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        let profile = args.input.effective_profile().unwrap();
        assert_eq!(profile.delimiter, Some('\t'));
        assert_eq!(profile.locale, NumberLocale::de_de());
        assert!(profile.header);
    }

    #[test]
    fn no_header_requires_profile() {
        let err = Cli::try_parse_from(["stream-importer", "columns", "-i", "x.csv", "--no-header"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
