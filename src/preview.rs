use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::PreviewArgs,
    table::{Alignment, Table},
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let mut cursor = args.input.open_cursor()?;
    let definitions = cursor.column_definitions().to_vec();
    let headers = definitions.iter().map(|d| d.name().to_string()).collect();
    let alignments = definitions
        .iter()
        .map(|d| Alignment::for_type(d.target()))
        .collect();
    let mut table = Table::new(headers).with_alignments(alignments);

    while table.row_count() < args.rows {
        let line = table.row_count() + 1;
        if !cursor
            .advance()
            .with_context(|| format!("Reading data row {line}"))?
            .is_row()
        {
            break;
        }
        let mut cells = Vec::with_capacity(definitions.len());
        for definition in &definitions {
            let value = cursor.get_value(definition.ordinal()).with_context(|| {
                format!("Converting column '{}' in row {line}", definition.name())
            })?;
            cells.push(value.as_display());
        }
        table.push_row(cells);
    }
    cursor.close();

    table.print();
    info!("Displayed {} row(s) from {:?}", table.row_count(), args.input.input);
    Ok(())
}
