// shell.rs
//! The interactive session: open a data file, pick a field, type limits, choose
//! where the matching records go, and repeat until the user quits.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::dsv_reader::{DsvReaderBuilder, FieldNames};
use crate::dsv_value::Record;
use crate::error::{CliError, CliResult, Result};
use crate::menu::Menu;
use crate::open_mode::OpenMode;
use crate::output::{
    print_table, terminal_table, write_excel_file, write_text_file, OutputTarget,
    TEXT_FILE_DELIMITER,
};
use crate::record_filter::{filter_records, Range};
use crate::settings::{FilterField, Settings};
use crate::user_experience::{is_filename_quit_flag, is_quit_flag};
use crate::user_interaction::{
    clear_screen, print_insight, term_format, throw_error, Prompt, FG_GREEN, FG_RED, ITALIC,
};

const WELCOME_LINES: &[&str] = &[
    "METEORITE DATA FILTER",
    "",
    "Filter meteorite landing data by mass or year, then show the matches",
    "on screen or save them to a file.",
    "",
    "The data file must be delimited text whose first line names the fields.",
    "It needs at least the \"name\", \"mass (g)\" and \"year\" fields.",
    "",
    "Type the letter or number of a choice and press enter. Where a menu has a",
    "default, pressing enter alone selects it. Type \"q\" to leave at any menu.",
];

pub fn welcome_message() -> String {
    let inner = WELCOME_LINES
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        + 2;
    let mut out = format!("  ┏{}┓\n", "━".repeat(inner));
    for (idx, line) in WELCOME_LINES.iter().enumerate() {
        let body = if idx == 0 {
            format!("{line:^width$}", width = inner)
        } else {
            format!(" {line:<width$} ", width = inner - 2)
        };
        out.push_str(&format!("  ┃{body}┃\n"));
    }
    out.push_str(&format!("  ┗{}┛\n", "━".repeat(inner)));
    out
}

/// A loaded data file.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub fieldnames: Vec<String>,
    pub records: Vec<Record>,
}

/// Reads every record of `path`, coercing fields listed in the settings' type map.
pub fn load_dataset(path: &Path, mode: OpenMode, settings: &Settings) -> Result<Dataset> {
    let reader = DsvReaderBuilder::new()
        .delimiter(settings.delimiter)
        .mode(mode)
        .from_path(path)?
        .into_dict(FieldNames::Infer, settings.type_map.clone())?;
    let fieldnames = reader.fieldnames().to_vec();
    let records = reader.collect::<Result<Vec<_>>>()?;
    info!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(Dataset {
        path: path.to_path_buf(),
        fieldnames,
        records,
    })
}

pub struct Shell<'a, P, W> {
    settings: &'a Settings,
    prompt: P,
    out: W,
    clear: bool,
}

impl<'a, P: Prompt, W: Write> Shell<'a, P, W> {
    pub fn new(settings: &'a Settings, prompt: P, out: W) -> Self {
        Self {
            settings,
            prompt,
            out,
            clear: false,
        }
    }

    /// Clear the terminal before the welcome banner.
    pub fn clear_screen(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// Runs until the user quits. `initial_path` answers the first file-name prompt.
    pub fn run(&mut self, initial_path: Option<PathBuf>) -> CliResult<()> {
        match self.session(initial_path) {
            Err(CliError::Quit) => {
                writeln!(self.out, "\nQuitting application... Goodbye!")?;
                self.out.flush()?;
                Ok(())
            }
            other => other,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn session(&mut self, initial_path: Option<PathBuf>) -> CliResult<()> {
        if self.clear {
            clear_screen(&mut self.out)?;
        }
        writeln!(self.out, "{}", welcome_message())?;
        let dataset = self.open_dataset(initial_path)?;
        self.filter_loop(&dataset)
    }

    fn open_dataset(&mut self, mut initial_path: Option<PathBuf>) -> CliResult<Dataset> {
        loop {
            print_insight(
                &mut self.out,
                "To begin, please type the filename, including its file extension and path if\n\
                 necessary (ex: \"file.txt\"). To exit the application, type \">q\" or \">Q\"",
            )?;
            let path = match initial_path.take() {
                Some(path) => {
                    writeln!(self.out, "> {}", path.display())?;
                    path
                }
                None => {
                    let input = self.prompt.read_line("> ")?;
                    if is_filename_quit_flag(&input) {
                        return Err(CliError::Quit);
                    }
                    let input = input.trim();
                    if input.is_empty() {
                        throw_error(&mut self.out, "Please type a file name.")?;
                        continue;
                    }
                    PathBuf::from(input)
                }
            };
            writeln!(self.out)?;

            let mode = self.choose_open_mode()?;
            writeln!(
                self.out,
                "Opening file {} using {} mode...\n",
                term_format(&path.display().to_string(), &[ITALIC, FG_GREEN]),
                term_format(mode.short_description(), &[ITALIC, FG_GREEN]),
            )?;

            match load_dataset(&path, mode, self.settings) {
                Ok(dataset) => return Ok(dataset),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "could not load data file");
                    throw_error(
                        &mut self.out,
                        &format!(
                            "Could not open {}. Please double check the file name is correct and \
                             the file contains the required format.\n({err})",
                            term_format(&path.display().to_string(), &[ITALIC]),
                        ),
                    )?;
                }
            }
        }
    }

    fn choose_open_mode(&mut self) -> CliResult<OpenMode> {
        let menu = Menu::keyed(OpenMode::ALL.iter().map(|mode| {
            let mut label = mode.description().to_string();
            if *mode == OpenMode::Write {
                label.push(' ');
                label.push_str(&term_format(
                    "(WARNING: This will delete\n    all contents of the file)",
                    &[FG_RED],
                ));
            }
            (mode.code().to_string(), label)
        }))
        .with_preamble("What mode would you like to use to open the file?")
        .with_default(0);
        loop {
            if let Some(idx) = menu.ask(&mut self.prompt, &mut self.out)? {
                return Ok(OpenMode::ALL[idx]);
            }
        }
    }

    fn filter_loop(&mut self, dataset: &Dataset) -> CliResult<()> {
        let settings = self.settings;
        let menu = Menu::numbered(settings.filter_fields.iter().map(|f| f.menu_desc.clone()))
            .with_preamble("Which field would you like to use to filter the data?");
        loop {
            let Some(idx) = menu.ask(&mut self.prompt, &mut self.out)? else {
                continue;
            };
            let filter = &settings.filter_fields[idx];
            let range = self.read_range(filter)?;
            let matched = filter_records(&dataset.records, &filter.field, &settings.name_field, range);
            writeln!(self.out)?;
            self.select_output(dataset, filter, &matched)?;
            writeln!(self.out)?;
        }
    }

    fn read_range(&mut self, filter: &FilterField) -> CliResult<Range> {
        loop {
            print_insight(
                &mut self.out,
                "Enter a number for the upper and lower filter limits or type \"Q\" to quit.\n\
                 You may leave one limit blank.",
            )?;
            let lower = self.read_limit("LOWER", filter)?;
            let upper = self.read_limit("UPPER", filter)?;
            match Range::parse(&lower, &upper) {
                Ok(range) => return Ok(range),
                Err(err) => throw_error(&mut self.out, &err.to_string())?,
            }
        }
    }

    fn read_limit(&mut self, which: &str, filter: &FilterField) -> CliResult<String> {
        let input = self.prompt.read_line(&format!(
            "Enter the {which} limit (inclusive) for {}: ",
            filter.input_desc
        ))?;
        if is_quit_flag(&input) {
            return Err(CliError::Quit);
        }
        Ok(input)
    }

    fn select_output(&mut self, dataset: &Dataset, filter: &FilterField, matched: &[Record]) -> CliResult<()> {
        let menu = Menu::numbered(OutputTarget::ALL.iter().map(|target| target.menu_desc()))
            .with_preamble("How would you like to output the filtered results?")
            .with_back();
        let Some(idx) = menu.ask(&mut self.prompt, &mut self.out)? else {
            return Ok(());
        };

        let output_dir = &self.settings.output_dir;
        let saved = match OutputTarget::ALL[idx] {
            OutputTarget::Terminal => {
                let table = terminal_table(
                    matched,
                    filter,
                    &self.settings.name_field,
                    self.settings.column_margin,
                );
                return print_table(&mut self.out, &table);
            }
            OutputTarget::TextFile => {
                write_text_file(matched, &dataset.fieldnames, output_dir, TEXT_FILE_DELIMITER)
            }
            OutputTarget::ExcelFile => write_excel_file(matched, &dataset.fieldnames, output_dir),
        };
        match saved {
            Ok(path) => print_insight(
                &mut self.out,
                &format!("Saved {} records to {}", matched.len(), path.display()),
            )?,
            Err(err) => {
                warn!(error = %err, "could not save filtered records");
                throw_error(&mut self.out, &format!("Could not save the results. ({err})"))?;
            }
        }
        Ok(())
    }
}
