// open_mode.rs
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::{Error, Result};

/// How a DSV file is opened. Each variant maps onto one native open flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Open an existing file for reading.
    #[default]
    Read,
    /// Open for writing, truncating the file first (created if missing).
    Write,
    /// Exclusive creation, failing if the file already exists.
    Create,
    /// Open for writing, appending to the end of the file (created if missing).
    Append,
}

impl OpenMode {
    pub const ALL: [OpenMode; 4] = [
        OpenMode::Read,
        OpenMode::Write,
        OpenMode::Create,
        OpenMode::Append,
    ];

    /// Single-letter code, as typed at the open-mode menu.
    pub fn code(self) -> &'static str {
        match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
            OpenMode::Create => "x",
            OpenMode::Append => "a",
        }
    }

    pub fn from_code(code: &str) -> Option<OpenMode> {
        OpenMode::ALL
            .into_iter()
            .find(|mode| mode.code().eq_ignore_ascii_case(code.trim()))
    }

    pub fn description(self) -> &'static str {
        match self {
            OpenMode::Read => "open for reading",
            OpenMode::Write => "open for writing, truncating the file first",
            OpenMode::Create => "open for exclusive creation, failing if the file already exists",
            OpenMode::Append => "open for writing, appending to the end of the file if it exists",
        }
    }

    pub fn short_description(self) -> &'static str {
        match self {
            OpenMode::Read => "read",
            OpenMode::Write => "write (truncate)",
            OpenMode::Create => "create",
            OpenMode::Append => "write (append)",
        }
    }

    pub fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            OpenMode::Read => {
                options.read(true);
            }
            OpenMode::Write => {
                options.write(true).create(true).truncate(true);
            }
            OpenMode::Create => {
                options.write(true).create_new(true);
            }
            OpenMode::Append => {
                options.append(true).create(true);
            }
        }
        options
    }

    pub fn open(self, path: &Path) -> Result<File> {
        self.options().open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            mode: self,
            source,
        })
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_description())
    }
}
