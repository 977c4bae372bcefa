// dsv_writer.rs
//! Writing delimiter-separated text, the mirror of [`crate::dsv_reader`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::dsv_reader::DEFAULT_DELIMITER;
use crate::dsv_value::{ensure_unique, Record, Value};
use crate::error::{Error, Result};
use crate::open_mode::OpenMode;

#[cfg(windows)]
pub const NATIVE_NEWLINE: &str = "\r\n";
#[cfg(not(windows))]
pub const NATIVE_NEWLINE: &str = "\n";

/// Checks that every record has exactly the keys in `fieldnames`.
///
/// Lets callers refuse a batch before creating its destination.
pub fn check_records(fieldnames: &[String], records: &[Record]) -> Result<()> {
    records
        .iter()
        .try_for_each(|record| order(fieldnames, record).map(drop))
}

fn order<'r>(fieldnames: &[String], record: &'r Record) -> Result<Vec<&'r Value>> {
    if record.len() != fieldnames.len() {
        return Err(Error::Shape {
            expected: fieldnames.len(),
            found: record.len(),
        });
    }
    fieldnames
        .iter()
        .map(|field| {
            record.get(field).ok_or_else(|| Error::UnknownField {
                field: field.clone(),
            })
        })
        .collect()
}

/// Configures and opens a [`DsvWriter`].
#[derive(Debug, Clone)]
pub struct DsvWriterBuilder {
    delimiter: char,
    newline: String,
    mode: OpenMode,
}

impl Default for DsvWriterBuilder {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            newline: NATIVE_NEWLINE.to_string(),
            mode: OpenMode::Write,
        }
    }
}

impl DsvWriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn newline(&mut self, newline: impl Into<String>) -> &mut Self {
        self.newline = newline.into();
        self
    }

    pub fn mode(&mut self, mode: OpenMode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<DsvWriter> {
        let path = path.as_ref();
        let file = self.mode.open(path)?;
        debug!(path = %path.display(), mode = %self.mode, "opened dsv destination");
        Ok(self.from_writer(file))
    }

    pub fn from_writer<W: Write>(&self, wtr: W) -> DsvWriter<W> {
        DsvWriter {
            sink: BufWriter::new(wtr),
            delimiter: self.delimiter,
            newline: self.newline.clone(),
        }
    }
}

/// Writes rows of [`Value`]s, one line each.
#[derive(Debug)]
pub struct DsvWriter<W: Write = File> {
    sink: BufWriter<W>,
    delimiter: char,
    newline: String,
}

impl<W: Write> DsvWriter<W> {
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Joins the cells with the delimiter and appends the line terminator.
    ///
    /// Absent cells become empty strings but keep their delimiter slot, so a row
    /// of three absent values is two delimiters and a newline.
    pub fn format_row<'a, I>(&self, row: I) -> String
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut line = String::new();
        for (idx, cell) in row.into_iter().enumerate() {
            if idx > 0 {
                line.push(self.delimiter);
            }
            if !cell.is_absent() {
                line.push_str(&cell.to_string());
            }
        }
        line.push_str(&self.newline);
        line
    }

    /// Writes and flushes one row, returning the number of bytes written.
    pub fn write_row(&mut self, row: &[Value]) -> Result<usize> {
        let written = self.put(row)?;
        self.sink.flush()?;
        Ok(written)
    }

    pub fn write_rows<'a, I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a [Value]>,
    {
        for row in rows {
            self.put(row)?;
        }
        self.sink.flush()?;
        Ok(())
    }

    fn put<'a, I>(&mut self, row: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let line = self.format_row(row);
        self.sink.write_all(line.as_bytes())?;
        Ok(line.len())
    }

    /// Wraps this writer so that it writes [`Record`]s in `fieldnames` order.
    pub fn into_dict(self, fieldnames: Vec<String>) -> Result<DsvDictWriter<W>> {
        ensure_unique(&fieldnames)?;
        Ok(DsvDictWriter {
            rows: self,
            fieldnames,
        })
    }

    /// Flushes buffered output and releases the destination.
    pub fn close(mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        self.sink.get_ref()
    }
}

/// Writes [`Record`]s whose keys must match a fixed field-name list.
#[derive(Debug)]
pub struct DsvDictWriter<W: Write = File> {
    rows: DsvWriter<W>,
    fieldnames: Vec<String>,
}

impl<W: Write> DsvDictWriter<W> {
    pub fn fieldnames(&self) -> &[String] {
        &self.fieldnames
    }

    pub fn write_header(&mut self) -> Result<usize> {
        let header: Vec<Value> = self.fieldnames.iter().map(|f| Value::from(f.as_str())).collect();
        self.rows.write_row(&header)
    }

    /// Writes one record, or fails before any output if its shape is wrong.
    pub fn write_record(&mut self, record: &Record) -> Result<usize> {
        let ordered = order(&self.fieldnames, record)?;
        let written = self.rows.put(ordered)?;
        self.rows.sink.flush()?;
        Ok(written)
    }

    /// Validates every record first; nothing is written unless all of them fit.
    pub fn write_records(&mut self, records: &[Record]) -> Result<()> {
        let ordered = records
            .iter()
            .map(|record| order(&self.fieldnames, record))
            .collect::<Result<Vec<_>>>()?;
        for row in ordered {
            self.rows.put(row)?;
        }
        self.rows.sink.flush()?;
        Ok(())
    }

    pub fn close(self) -> Result<()> {
        self.rows.close()
    }

    pub fn get_ref(&self) -> &W {
        self.rows.get_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsv_reader::{DsvReaderBuilder, Row};
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn text_row() -> Vec<Value> {
        ["this", "is", "a", "test"].map(Value::from).to_vec()
    }

    fn num_row() -> Vec<Value> {
        vec![
            Value::Int(4),
            Value::Float(7.4),
            Value::Int(-4),
            Value::Float(-7.4),
        ]
    }

    fn none_row() -> Vec<Value> {
        vec![Value::Absent; 4]
    }

    fn mixed_row() -> Vec<Value> {
        vec![
            Value::from("this"),
            Value::Int(0),
            Value::Absent,
            Value::Float(0.0),
        ]
    }

    fn all_rows() -> Vec<Vec<Value>> {
        vec![text_row(), num_row(), none_row(), mixed_row()]
    }

    fn tsv_writer(path: &Path) -> DsvWriter {
        DsvWriterBuilder::new()
            .delimiter('\t')
            .newline("\n")
            .from_path(path)
            .unwrap()
    }

    fn fieldnames() -> Vec<String> {
        ["string", "int", "none", "float"].map(String::from).to_vec()
    }

    fn records() -> Vec<Record> {
        vec![
            Record::from_iter([
                ("string", Value::from("this is text")),
                ("int", Value::Int(47)),
                ("none", Value::Absent),
                ("float", Value::Float(7.4)),
            ]),
            // Insertion order differs from the field order on purpose.
            Record::from_iter([
                ("float", Value::Float(-4.7)),
                ("none", Value::Absent),
                ("int", Value::Int(-74)),
                ("string", Value::from("this is also text")),
            ]),
            Record::from_iter([
                ("string", Value::Absent),
                ("int", Value::Absent),
                ("none", Value::Absent),
                ("float", Value::Absent),
            ]),
            Record::from_iter([
                ("string", Value::from("even more text")),
                ("int", Value::Int(0)),
                ("none", Value::Absent),
                ("float", Value::Float(0.0)),
            ]),
        ]
    }

    const ALL_RECORDS: &str =
        "this is text\t47\t\t7.4\nthis is also text\t-74\t\t-4.7\n\t\t\t\neven more text\t0\t\t0.0\n";

    #[test]
    fn format_row_keeps_empty_slots() {
        let writer = DsvWriterBuilder::new()
            .delimiter('\t')
            .newline("\n")
            .from_writer(Vec::new());

        assert_eq!(writer.format_row(&text_row()), "this\tis\ta\ttest\n");
        assert_eq!(writer.format_row(&num_row()), "4\t7.4\t-4\t-7.4\n");
        assert_eq!(writer.format_row(&none_row()), "\t\t\t\n");
        assert_eq!(writer.format_row(&mixed_row()), "this\t0\t\t0.0\n");
        assert_eq!(writer.format_row(&vec![Value::Absent; 3]), "\t\t\n");
    }

    #[test]
    fn write_row_flushes_each_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.tsv");
        let mut writer = tsv_writer(&path);

        assert_eq!(writer.write_row(&text_row()).unwrap(), 15);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "this\tis\ta\ttest\n");

        writer.write_row(&none_row()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "this\tis\ta\ttest\n\t\t\t\n"
        );
    }

    #[test]
    fn delimiters() {
        let dir = TempDir::new().unwrap();
        let rows = all_rows();
        for (delimiter, expected) in [
            (',', "this,is,a,test\n4,7.4,-4,-7.4\n,,,\nthis,0,,0.0\n"),
            ('\t', "this\tis\ta\ttest\n4\t7.4\t-4\t-7.4\n\t\t\t\nthis\t0\t\t0.0\n"),
            ('|', "this|is|a|test\n4|7.4|-4|-7.4\n|||\nthis|0||0.0\n"),
        ] {
            let path = dir.path().join(format!("delim_{}.txt", delimiter as u32));
            let mut writer = DsvWriterBuilder::new()
                .delimiter(delimiter)
                .newline("\n")
                .from_path(&path)
                .unwrap();
            assert_eq!(writer.delimiter(), delimiter);
            writer.write_rows(rows.iter().map(Vec::as_slice)).unwrap();
            writer.close().unwrap();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
        }
    }

    #[test]
    fn default_writer_uses_comma_and_native_newline() {
        let writer = DsvWriterBuilder::new().from_writer(Vec::new());
        assert_eq!(
            writer.format_row(&[Value::from("a"), Value::Int(1)]),
            format!("a,1{NATIVE_NEWLINE}")
        );
    }

    #[test]
    fn dict_writer_header_and_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.tsv");
        let mut writer = tsv_writer(&path).into_dict(fieldnames()).unwrap();
        assert_eq!(writer.fieldnames(), fieldnames().as_slice());

        writer.write_header().unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "string\tint\tnone\tfloat\n"
        );

        writer.write_records(&records()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("string\tint\tnone\tfloat\n{ALL_RECORDS}")
        );
    }

    #[test]
    fn dict_writer_rejects_wrong_shape_without_writing() {
        let mut writer = DsvWriterBuilder::new()
            .delimiter('\t')
            .newline("\n")
            .from_writer(Vec::new())
            .into_dict(fieldnames())
            .unwrap();
        writer.write_record(&records()[0]).unwrap();
        let before = writer.get_ref().clone();

        let too_few = Record::from_iter([
            ("string", Value::from("foo")),
            ("int", Value::Int(47)),
            ("none", Value::Absent),
        ]);
        let err = writer.write_record(&too_few).unwrap_err();
        assert!(matches!(err, Error::Shape { expected: 4, found: 3 }));

        let mut too_many = records()[0].clone();
        too_many.insert("extra", "true");
        assert_eq!(writer.write_record(&too_many).unwrap_err().kind(), ErrorKind::Shape);

        let wrong_key = Record::from_iter([
            ("string", Value::from("bar")),
            ("int", Value::Int(74)),
            ("none", Value::Absent),
            ("double", Value::Float(4.7)),
        ]);
        let err = writer.write_record(&wrong_key).unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field } if field == "float"));

        assert_eq!(writer.get_ref(), &before);
    }

    #[test]
    fn write_records_is_all_or_nothing() {
        let mut writer = DsvWriterBuilder::new()
            .delimiter('\t')
            .newline("\n")
            .from_writer(Vec::new())
            .into_dict(fieldnames())
            .unwrap();

        let mut batch = records();
        batch.push(Record::from_iter([("string", Value::from("foo"))]));

        assert!(writer.write_records(&batch).is_err());
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn check_records_matches_the_writer_rules() {
        assert!(check_records(&fieldnames(), &records()).is_ok());
        assert!(check_records(&fieldnames(), &[]).is_ok());

        let mut batch = records();
        batch.push(Record::from_iter([("string", Value::from("foo"))]));
        let err = check_records(&fieldnames(), &batch).unwrap_err();
        assert!(matches!(err, Error::Shape { expected: 4, found: 1 }));
    }

    #[test]
    fn duplicate_fieldnames_are_rejected() {
        let err = DsvWriterBuilder::new()
            .from_writer(Vec::new())
            .into_dict(vec!["a".into(), "a".into()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn rows_survive_a_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("round_trip.psv");
        let original: Vec<Row> = vec![
            vec!["Aachen".into(), "21".into(), "".into()],
            vec!["".into(), "".into(), "".into()],
            vec!["Northwest Africa 7755".into(), "30.0".into(), "Found".into()],
        ];

        let mut writer = DsvWriterBuilder::new()
            .delimiter('|')
            .newline("\r\n")
            .from_path(&path)
            .unwrap();
        for row in &original {
            let cells: Vec<Value> = row.iter().map(|c| Value::from(c.as_str())).collect();
            writer.write_row(&cells).unwrap();
        }
        writer.close().unwrap();

        let read_back: Vec<Row> = DsvReaderBuilder::new()
            .delimiter('|')
            .newline("\r\n")
            .from_path(&path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(read_back, original);
    }

    #[test]
    fn append_mode_extends_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("append.tsv");
        std::fs::write(&path, "first\n").unwrap();

        let mut writer = DsvWriterBuilder::new()
            .newline("\n")
            .mode(OpenMode::Append)
            .from_path(&path)
            .unwrap();
        writer.write_row(&[Value::from("second")]).unwrap();
        drop(writer);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
