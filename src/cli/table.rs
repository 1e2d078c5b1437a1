//! Column-aligned text tables

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

const GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone)]
struct Column {
    header: String,
    min_width: usize,
    align: Align,
}

/// A titled table with a bold header row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    title: Option<String>,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn column(mut self, header: impl Into<String>, min_width: usize, align: Align) -> Self {
        self.columns.push(Column {
            header: header.into(),
            min_width,
            align,
        });
        self
    }

    /// Add a row; missing cells render empty, extra cells are dropped.
    pub fn add_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.columns.len(), String::new());
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .map(|row| width(&row[i]))
                    .chain([width(&col.header), col.min_width])
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let total = widths.iter().sum::<usize>() + GAP.len() * widths.len().saturating_sub(1);
        let mut out = String::new();

        if let Some(title) = &self.title {
            let padded = pad(title, total, Align::Center);
            out.push_str(&format!("{}\n", padded.trim_end().bold()));
        }

        let header = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| pad(&col.header, *w, col.align).bold().magenta().to_string())
            .collect::<Vec<_>>()
            .join(GAP);
        out.push_str(header.trim_end());
        out.push('\n');
        out.push_str(&"─".repeat(total));
        out.push('\n');

        for row in &self.rows {
            let line = row
                .iter()
                .zip(self.columns.iter().zip(&widths))
                .map(|(cell, (col, w))| pad(cell, *w, col.align))
                .collect::<Vec<_>>()
                .join(GAP);
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Terminal cells taken by `s`; CJK and most emoji take two.
fn width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn pad(s: &str, width_: usize, align: Align) -> String {
    let fill = width_.saturating_sub(width(s));
    match align {
        Align::Left => format!("{}{}", s, " ".repeat(fill)),
        Align::Right => format!("{}{}", " ".repeat(fill), s),
        Align::Center => {
            let left = fill / 2;
            format!("{}{}{}", " ".repeat(left), s, " ".repeat(fill - left))
        }
    }
}
