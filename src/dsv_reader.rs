// dsv_reader.rs
//! Line-at-a-time reading of delimiter-separated text.
//!
//! [`DsvReader`] yields each line as a row of raw cells. [`DsvDictReader`] wraps it
//! and pairs every row with a list of field names, coercing selected fields to
//! numbers. Neither performs quoting or escaping: a line is split on every
//! delimiter, so a line with N delimiters always gives N + 1 cells.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::dsv_value::{ensure_unique, Record, TypeMap};
use crate::error::{Error, Result};
use crate::open_mode::OpenMode;

pub const DEFAULT_DELIMITER: char = ',';

/// Raw cells of one line, in file order.
pub type Row = Vec<String>;

/// Configures and opens a [`DsvReader`].
#[derive(Debug, Clone)]
pub struct DsvReaderBuilder {
    delimiter: char,
    newline: Option<String>,
    mode: OpenMode,
}

impl Default for DsvReaderBuilder {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            newline: None,
            mode: OpenMode::Read,
        }
    }
}

impl DsvReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Line terminator to split on and strip. Without one, `\n`, `\r\n` and a lone `\r`
    /// all end a line.
    pub fn newline(&mut self, newline: impl Into<String>) -> &mut Self {
        let newline = newline.into();
        self.newline = if newline.is_empty() { None } else { Some(newline) };
        self
    }

    pub fn mode(&mut self, mode: OpenMode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<DsvReader> {
        let path = path.as_ref();
        let file = self.mode.open(path)?;
        debug!(path = %path.display(), mode = %self.mode, "opened dsv source");
        Ok(self.from_reader(file))
    }

    pub fn from_reader<R: Read>(&self, rdr: R) -> DsvReader<BufReader<R>> {
        DsvReader {
            source: BufReader::new(rdr),
            delimiter: self.delimiter,
            newline: self.newline.clone(),
            line_num: 0,
        }
    }
}

/// Forward-only sequence of rows. Re-reading means opening the source again.
#[derive(Debug)]
pub struct DsvReader<R = BufReader<File>> {
    source: R,
    delimiter: char,
    newline: Option<String>,
    line_num: usize,
}

impl DsvReader {
    /// Opens `path` for reading with default settings and the given delimiter.
    pub fn from_path(path: impl AsRef<Path>, delimiter: char) -> Result<DsvReader> {
        DsvReaderBuilder::new().delimiter(delimiter).from_path(path)
    }
}

impl<R: BufRead> DsvReader<R> {
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Number of lines consumed so far.
    pub fn line_num(&self) -> usize {
        self.line_num
    }

    /// Reads the next line and splits it, or returns `None` at end of input.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        Ok(self
            .read_line()?
            .map(|line| line.split(self.delimiter).map(str::to_string).collect()))
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        match &self.newline {
            None => read_universal_line(&mut self.source, &mut buf)?,
            Some(newline) => {
                let terminator = newline.as_bytes();
                let last = terminator[terminator.len() - 1];
                loop {
                    let read = self.source.read_until(last, &mut buf)?;
                    if read == 0 || buf.ends_with(terminator) {
                        break;
                    }
                }
            }
        }
        if buf.is_empty() {
            return Ok(None);
        }
        self.line_num += 1;

        let stripped = match &self.newline {
            None => buf
                .strip_suffix(b"\r\n")
                .or_else(|| buf.strip_suffix(b"\n"))
                .or_else(|| buf.strip_suffix(b"\r"))
                .unwrap_or(&buf),
            Some(newline) => buf.strip_suffix(newline.as_bytes()).unwrap_or(&buf),
        };
        let line = std::str::from_utf8(stripped).map_err(|_| Error::Encoding {
            line: self.line_num,
        })?;
        Ok(Some(line.to_string()))
    }

    /// Turns this row reader into a record reader.
    ///
    /// With [`FieldNames::Infer`] the next line is consumed as the header.
    pub fn into_dict(mut self, fieldnames: FieldNames, type_map: TypeMap) -> Result<DsvDictReader<R>> {
        let fieldnames = match fieldnames {
            FieldNames::Explicit(names) => names,
            FieldNames::Infer => self.read_row()?.ok_or(Error::EmptyInput)?,
        };
        ensure_unique(&fieldnames)?;
        Ok(DsvDictReader {
            rows: self,
            fieldnames,
            type_map,
        })
    }

    /// Releases the underlying source.
    pub fn close(self) {}
}

impl<R: BufRead> Iterator for DsvReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}

// Appends bytes through the next `\n`, `\r\n` or lone `\r`, terminator included.
fn read_universal_line<R: BufRead>(source: &mut R, buf: &mut Vec<u8>) -> io::Result<()> {
    loop {
        let available = source.fill_buf()?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(idx) => {
                let ends_with_cr = available[idx] == b'\r';
                buf.extend_from_slice(&available[..=idx]);
                source.consume(idx + 1);
                if ends_with_cr && source.fill_buf()?.first() == Some(&b'\n') {
                    buf.push(b'\n');
                    source.consume(1);
                }
                return Ok(());
            }
            None => {
                let len = available.len();
                buf.extend_from_slice(available);
                source.consume(len);
            }
        }
    }
}

/// Where a [`DsvDictReader`] gets its field names from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNames {
    /// Use the first line of the input.
    Infer,
    Explicit(Vec<String>),
}

/// Reads rows as [`Record`]s keyed by field name.
///
/// Rows are zipped against the field names without a length check: extra cells
/// are dropped and a short row yields a record with fewer fields.
#[derive(Debug)]
pub struct DsvDictReader<R = BufReader<File>> {
    rows: DsvReader<R>,
    fieldnames: Vec<String>,
    type_map: TypeMap,
}

impl<R: BufRead> DsvDictReader<R> {
    pub fn fieldnames(&self) -> &[String] {
        &self.fieldnames
    }

    pub fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    pub fn line_num(&self) -> usize {
        self.rows.line_num()
    }

    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let Some(row) = self.rows.read_row()? else {
            return Ok(None);
        };
        let mut record = Record::from_row(&self.fieldnames, row);
        record.coerce(&self.type_map, self.rows.line_num())?;
        Ok(Some(record))
    }

    pub fn close(self) {}
}

impl<R: BufRead> Iterator for DsvDictReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
