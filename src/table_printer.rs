// table_printer.rs
//! Plain-text table rendering.
//!
//! Every column is as wide as its widest cell or label. Numbers, and strings
//! made only of digits, are right-aligned; everything else is left-aligned.
//! Widths are worked out again on every [`TablePrinter::render`] call.

use crate::dsv_value::Value;
use crate::error::{Error, Result};

pub const DEFAULT_MARGIN: usize = 4;

#[derive(Debug, Clone)]
pub struct TablePrinter {
    header: Vec<Value>,
    rows: Vec<Vec<Value>>,
    title: Option<String>,
    margin: usize,
}

impl TablePrinter {
    pub fn new<H, S>(header: H, rows: Vec<Vec<Value>>) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(|label| Value::Str(label.into())).collect(),
            rows,
            title: None,
            margin: DEFAULT_MARGIN,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_margin(mut self, margin: usize) -> Self {
        self.margin = margin;
        self
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Column widths: the longest of the label and every cell in the column.
    pub fn column_widths(&self) -> Result<Vec<usize>> {
        let mut widths: Vec<usize> = self.header.iter().map(cell_width).collect();
        for row in &self.rows {
            if row.len() != widths.len() {
                return Err(Error::Shape {
                    expected: widths.len(),
                    found: row.len(),
                });
            }
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell_width(cell));
            }
        }
        Ok(widths)
    }

    pub fn render(&self) -> Result<String> {
        let widths = self.column_widths()?;
        let divider = widths
            .iter()
            .map(|&width| "=".repeat(width))
            .collect::<Vec<_>>()
            .join(&"=".repeat(self.margin));

        let mut out = String::new();
        if let Some(title) = &self.title {
            let total = divider.chars().count();
            out.push_str(&format!("{title:^total$}\n"));
        }
        out.push_str(&self.format_row(&self.header, &widths));
        out.push('\n');
        out.push_str(&divider);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.format_row(row, &widths));
            out.push('\n');
        }
        Ok(out)
    }

    fn format_row(&self, row: &[Value], widths: &[usize]) -> String {
        let mut line = String::new();
        for (idx, (cell, &width)) in row.iter().zip(widths).enumerate() {
            if idx > 0 {
                line.push_str(&" ".repeat(self.margin));
            }
            let text = cell.to_string();
            if cell.is_right_aligned() {
                line.push_str(&format!("{text:>width$}"));
            } else {
                line.push_str(&format!("{text:<width$}"));
            }
        }
        line
    }
}

fn cell_width(cell: &Value) -> usize {
    cell.to_string().chars().count()
}
