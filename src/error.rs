// error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::open_mode::OpenMode;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the DSV reader/writer and the table printer.
///
/// Running out of lines is not an error; readers signal it by returning `None`
/// from `Iterator::next`.
#[derive(Error, Debug)]
pub enum Error {
    /// The path could not be opened in the requested mode (missing file,
    /// permission denied, file exists on exclusive create, ...).
    #[error("could not open {} for {mode}: {source}", .path.display())]
    Open {
        path: PathBuf,
        mode: OpenMode,
        source: io::Error,
    },

    /// A cell mapped to a numeric type held text that does not parse.
    #[error("line {line}: field '{field}' has invalid {expected} value '{raw}'")]
    Coercion {
        line: usize,
        field: String,
        raw: String,
        expected: &'static str,
    },

    /// A record or row has a different number of cells than the field list or header.
    #[error("shape mismatch: expected {expected} fields, found {found}")]
    Shape { expected: usize, found: usize },

    /// The record has the right number of keys but not the configured ones.
    #[error("record has no value for field '{field}'")]
    UnknownField { field: String },

    /// The same name appears twice in a header or field-name list.
    #[error("field name '{field}' appears more than once")]
    DuplicateField { field: String },

    /// Field names were to be read from the first line, but there was none.
    #[error("cannot infer field names from an empty file")]
    EmptyInput,

    #[error("line {line} is not valid UTF-8")]
    Encoding { line: usize },

    /// The spreadsheet could not be built or saved.
    #[error("could not write workbook: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Coarse classification of [`Error`], used by callers deciding whether to re-prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Open,
    Parse,
    Shape,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Open { .. } => ErrorKind::Open,
            Error::Coercion { .. } | Error::Encoding { .. } | Error::EmptyInput => {
                ErrorKind::Parse
            }
            Error::Shape { .. } | Error::UnknownField { .. } | Error::DuplicateField { .. } => {
                ErrorKind::Shape
            }
            Error::Io(_) | Error::Excel(_) => ErrorKind::Io,
        }
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The user asked to leave, or input ended.
    #[error("quit requested")]
    Quit,

    #[error("failed to read input: {0}")]
    Input(String),

    #[error("failed to write to the terminal: {0}")]
    Terminal(#[source] io::Error),

    #[error("could not read settings at {}: {source}", .path.display())]
    SettingsRead { path: PathBuf, source: io::Error },

    #[error("invalid settings in {}: {source}", .path.display())]
    SettingsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not write settings to {}: {source}", .path.display())]
    SettingsWrite { path: PathBuf, source: io::Error },

    #[error("no settings location available; pass --config")]
    NoSettingsPath,

    #[error(transparent)]
    Dsv(#[from] Error),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Terminal(err)
    }
}
