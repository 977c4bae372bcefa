//! Delimiter-separated-value reading and writing, plain-text tables, and the
//! interactive meteorite filter built on them.

pub mod cli;
pub mod dsv_reader;
pub mod dsv_value;
pub mod dsv_writer;
pub mod error;
pub mod logging;
pub mod menu;
pub mod open_mode;
pub mod output;
pub mod record_filter;
pub mod settings;
pub mod shell;
pub mod table_printer;
pub mod user_experience;
pub mod user_interaction;

pub use dsv_reader::{DsvDictReader, DsvReader, DsvReaderBuilder, FieldNames};
pub use dsv_value::{FieldType, Record, TypeMap, Value};
pub use dsv_writer::{DsvDictWriter, DsvWriter, DsvWriterBuilder};
pub use error::{Error, ErrorKind, Result};
pub use open_mode::OpenMode;
pub use table_printer::TablePrinter;
