// output.rs
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::info;

use crate::dsv_value::{Record, Value};
use crate::dsv_writer::{check_records, DsvWriterBuilder};
use crate::error::{CliResult, Result};
use crate::settings::FilterField;
use crate::table_printer::TablePrinter;

pub const TEXT_FILE_FORMAT: &str = "%Y-%m-%d_%H_%M_%6f.txt";
pub const TEXT_FILE_DELIMITER: char = '\t';
pub const EXCEL_FILE_FORMAT: &str = "%Y-%m-%d_%H_%M_%6f.xlsx";
pub const EXCEL_SHEET_NAME: &str = "filteredMeteoriteData";

/// Where filtered records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    Terminal,
    TextFile,
    ExcelFile,
}

impl OutputTarget {
    pub const ALL: [OutputTarget; 3] = [
        OutputTarget::Terminal,
        OutputTarget::TextFile,
        OutputTarget::ExcelFile,
    ];

    pub fn menu_desc(self) -> &'static str {
        match self {
            OutputTarget::Terminal => "Display on screen",
            OutputTarget::TextFile => "Save to a text (.txt) file",
            OutputTarget::ExcelFile => "Save to an Excel (.xlsx) file",
        }
    }
}

/// Table of `(row number, name, filtered value)` for each record.
pub fn terminal_table(
    records: &[Record],
    filter: &FilterField,
    name_field: &str,
    margin: usize,
) -> TablePrinter {
    let rows = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let cell = |field: &str| record.get(field).cloned().unwrap_or(Value::Absent);
            vec![Value::from(idx + 1), cell(name_field), cell(&filter.field)]
        })
        .collect();
    TablePrinter::new(["", "NAME", filter.header.as_str()], rows).with_margin(margin)
}

pub fn print_table<W: Write>(out: &mut W, table: &TablePrinter) -> CliResult<()> {
    let text = table.render()?;
    writeln!(out)?;
    writeln!(out, "{text}")?;
    Ok(())
}

/// `<dir>/<timestamp>.txt` for the given moment.
pub fn text_file_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(now.format(TEXT_FILE_FORMAT).to_string())
}

pub fn excel_file_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(now.format(EXCEL_FILE_FORMAT).to_string())
}

/// Writes a header of `fieldnames` and then every record. Returns the new file's path.
///
/// Records that do not fit `fieldnames` fail the call before any file exists.
pub fn write_text_file(
    records: &[Record],
    fieldnames: &[String],
    dir: &Path,
    delimiter: char,
) -> Result<PathBuf> {
    check_records(fieldnames, records)?;
    let path = text_file_path(dir, Local::now());
    let mut writer = DsvWriterBuilder::new()
        .delimiter(delimiter)
        .from_path(&path)?
        .into_dict(fieldnames.to_vec())?;
    writer.write_header()?;
    writer.write_records(records)?;
    writer.close()?;
    info!(path = %path.display(), records = records.len(), "saved filtered records");
    Ok(path)
}

/// Same layout as [`write_text_file`] on one worksheet: header on row 0, numbers
/// as numeric cells, absent values as empty cells.
pub fn write_excel_file(records: &[Record], fieldnames: &[String], dir: &Path) -> Result<PathBuf> {
    check_records(fieldnames, records)?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(EXCEL_SHEET_NAME)?;
    for (col, field) in fieldnames.iter().enumerate() {
        sheet.write_string(0, sheet_col(col)?, field)?;
    }
    for (idx, record) in records.iter().enumerate() {
        let row = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, field) in fieldnames.iter().enumerate() {
            let col = sheet_col(col)?;
            match record.get(field) {
                Some(Value::Int(n)) => {
                    sheet.write_number(row, col, *n as f64)?;
                }
                Some(Value::Float(x)) => {
                    sheet.write_number(row, col, *x)?;
                }
                Some(Value::Str(s)) => {
                    sheet.write_string(row, col, s)?;
                }
                Some(Value::Absent) | None => {}
            }
        }
    }

    let path = excel_file_path(dir, Local::now());
    workbook.save(&path)?;
    info!(path = %path.display(), records = records.len(), "saved filtered records as a workbook");
    Ok(path)
}

fn sheet_col(idx: usize) -> Result<u16> {
    Ok(u16::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)?)
}
