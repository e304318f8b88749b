use anyhow::Result;
use log::info;

use crate::{cli::ColumnsArgs, columns::ColumnDefinition, table::Table};

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let mut cursor = args.input.open_cursor()?;
    let table = describe(cursor.column_definitions());
    cursor.close();
    table.print();
    info!("Listed {} column(s) from {:?}", table.row_count(), args.input.input);
    Ok(())
}

pub fn describe(definitions: &[ColumnDefinition]) -> Table {
    let headers = ["#", "name", "input", "type"]
        .into_iter()
        .map(String::from)
        .collect();
    let mut table = Table::new(headers);
    for definition in definitions {
        table.push_row(vec![
            (definition.ordinal() + 1).to_string(),
            definition.name().to_string(),
            definition.input_column().to_string(),
            definition.target().to_string(),
        ]);
    }
    table
}
