//! Streaming reader for delimited text with typed columns.
//!
//! The engine reads one physical line at a time ([`io_utils::LineSource`]),
//! splits it with a quote-aware state machine ([`tokenizer`]), and exposes the
//! fields through a forward-only [`CsvCursor`]. Columns carry a semantic type
//! and a converter; [`mapper::RecordCursor`] projects each row onto a plain
//! struct declared with the [`record!`] macro.

pub mod cli;
pub mod columns;
pub mod columns_cmd;
pub mod convert;
pub mod converters;
pub mod cursor;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod locale;
pub mod mapper;
pub mod preview;
pub mod profile;
pub mod profile_cmd;
pub mod table;
pub mod tokenizer;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

pub use crate::{
    columns::{ColumnDefinition, ColumnRef},
    converters::{Converter, SharedConverter},
    cursor::{CsvCursor, CursorState, ReadOutcome},
    data::{SemanticType, Value},
    error::{ErrorKind, ImportError, ImportResult},
    io_utils::CloseHandle,
    locale::NumberLocale,
    mapper::{FieldBinding, Record, RecordCursor},
    profile::ImportProfile,
};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("stream_importer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => preview::execute(&args),
        Commands::Columns(args) => columns_cmd::execute(&args),
        Commands::Convert(args) => convert::execute(&args),
        Commands::Profile(args) => profile_cmd::execute(&args),
    }
}
