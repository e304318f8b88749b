//! Plain-text table rendering for the preview and columns commands.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::data::SemanticType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

impl Alignment {
    /// Numbers read better right-aligned.
    pub fn for_type(target: SemanticType) -> Self {
        match target {
            SemanticType::Int16
            | SemanticType::Int32
            | SemanticType::Int64
            | SemanticType::Decimal
            | SemanticType::Single
            | SemanticType::Double => Alignment::Right,
            _ => Alignment::Left,
        }
    }
}

#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    alignments: Vec<Alignment>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        let alignments = vec![Alignment::Left; headers.len()];
        Self {
            headers,
            alignments,
            rows: Vec::new(),
        }
    }

    pub fn with_alignments(mut self, alignments: Vec<Alignment>) -> Self {
        self.alignments = alignments;
        self.alignments.resize(self.headers.len(), Alignment::Left);
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut output = String::new();

        let _ = writeln!(output, "{}", self.format_line(&self.headers, &widths, false));
        let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
        let _ = writeln!(output, "{}", self.format_line(&separator, &widths, false));
        for row in &self.rows {
            let _ = writeln!(output, "{}", self.format_line(row, &widths, true));
        }
        output
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = self
            .headers
            .iter()
            .map(|h| display_width(h).max(3))
            .collect::<Vec<_>>();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(display_width(&sanitize_cell(cell)));
            }
        }
        widths
    }

    fn format_line(&self, cells: &[String], widths: &[usize], aligned: bool) -> String {
        let mut line = String::new();
        for (idx, width) in widths.iter().enumerate() {
            if idx > 0 {
                line.push_str("  ");
            }
            let cell = cells.get(idx).map(|c| sanitize_cell(c)).unwrap_or_default();
            let padding = " ".repeat(width.saturating_sub(display_width(&cell)));
            match (aligned, self.alignments.get(idx)) {
                (true, Some(Alignment::Right)) => {
                    line.push_str(&padding);
                    line.push_str(&cell);
                }
                _ => {
                    line.push_str(&cell);
                    line.push_str(&padding);
                }
            }
        }
        line.truncate(line.trim_end().len());
        line
    }
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_columns_and_right_aligns_numbers() {
        let mut table = Table::new(vec!["name".into(), "qty".into()])
            .with_alignments(vec![Alignment::Left, Alignment::for_type(SemanticType::Int32)]);
        table.push_row(vec!["apple".into(), "7".into()]);
        table.push_row(vec!["kiwi".into(), "1200".into()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "name   qty");
        assert_eq!(lines[1], "-----  ----");
        assert_eq!(lines[2], "apple     7");
        assert_eq!(lines[3], "kiwi   1200");
    }

    #[test]
    fn short_rows_render_blank_cells() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec!["x".into()]);
        let rendered = table.render();
        assert_eq!(rendered.lines().nth(2), Some("x"));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn control_characters_are_flattened() {
        let mut table = Table::new(vec!["note".into()]);
        table.push_row(vec!["line\tbreak".into()]);
        assert!(table.render().contains("line break"));
    }
}
