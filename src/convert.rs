//! JSON lines export of typed rows.
//!
//! Each data row becomes one JSON object keyed by column name in ordinal
//! order. Ignored columns are left out.

use std::io::Write;

use anyhow::{Context, Result};
use log::info;
use serde_json::{Map, Value as JsonValue};

use crate::{cli::ConvertArgs, cursor::CsvCursor, io_utils};

pub fn execute(args: &ConvertArgs) -> Result<()> {
    let mut cursor = args.input.open_cursor()?;
    let mut writer = io_utils::open_output(args.output.as_deref())
        .with_context(|| format!("Opening output {:?}", args.output))?;
    let written = write_json_lines(&mut cursor, &mut writer, args.limit)?;
    writer.flush().context("Flushing JSON output")?;
    info!(
        "Converted {written} row(s) from {:?} to {}",
        args.input.input,
        args.output
            .as_ref()
            .map(|path| format!("{path:?}"))
            .unwrap_or_else(|| "stdout".to_string())
    );
    Ok(())
}

/// Streams rows from `cursor` into `writer`; returns the number written.
pub fn write_json_lines<W: Write>(
    cursor: &mut CsvCursor,
    writer: &mut W,
    limit: Option<usize>,
) -> Result<usize> {
    let columns = cursor
        .column_definitions()
        .iter()
        .filter(|d| !d.is_ignored())
        .map(|d| (d.ordinal(), d.name().to_string()))
        .collect::<Vec<_>>();
    let mut written = 0usize;
    while limit.is_none_or(|limit| written < limit) {
        let line = written + 1;
        if !cursor
            .advance()
            .with_context(|| format!("Reading data row {line}"))?
            .is_row()
        {
            break;
        }
        let mut object = Map::with_capacity(columns.len());
        for (ordinal, name) in &columns {
            let value = cursor
                .get_value(*ordinal)
                .with_context(|| format!("Converting column '{name}' in row {line}"))?;
            object.insert(name.clone(), serde_json::to_value(&value)?);
        }
        serde_json::to_writer(&mut *writer, &JsonValue::Object(object))?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    cursor.close();
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::data::SemanticType;

    #[test]
    fn writes_one_object_per_row() {
        let mut cursor = CsvCursor::from_buf_read(Cursor::new("Data1;12;12.5\nData2;;\n"));
        cursor.set_delimiter(';');
        cursor.add_column_definition("name", SemanticType::String).unwrap();
        cursor.add_column_definition("count", SemanticType::Int32).unwrap();
        cursor.add_column_definition("amount", SemanticType::Decimal).unwrap();
        let mut out = Vec::new();
        let written = write_json_lines(&mut cursor, &mut out, None).unwrap();
        assert_eq!(written, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#"{"name":"Data1","count":12,"amount":"12.5"}"#);
        assert_eq!(lines[1], r#"{"name":"Data2","count":0,"amount":"0"}"#);
    }

    #[test]
    fn limit_stops_early() {
        let mut cursor = CsvCursor::from_buf_read(Cursor::new("a\nb\nc\n"));
        cursor.add_column_definition("v", SemanticType::String).unwrap();
        let mut out = Vec::new();
        assert_eq!(write_json_lines(&mut cursor, &mut out, Some(2)).unwrap(), 2);
        assert!(cursor.is_closed());
    }
}
