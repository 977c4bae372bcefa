// menu.rs
use std::io::Write;

use fuzzywuzzy::fuzz;

use crate::error::{CliError, CliResult};
use crate::user_experience::{is_back_flag, is_quit_flag};
use crate::user_interaction::{term_format, throw_error, Prompt, FG_CYAN};

/// Lowest `fuzz::ratio` score accepted as a match for a typed label.
pub const FUZZY_THRESHOLD: u8 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Item(usize),
    Back,
    Quit,
    Invalid,
}

#[derive(Debug, Clone)]
struct MenuItem {
    key: String,
    label: String,
}

/// A list of choices shown as `key - label` lines.
#[derive(Debug, Clone)]
pub struct Menu {
    preamble: Option<String>,
    items: Vec<MenuItem>,
    default: Option<usize>,
    back: bool,
    quittable: bool,
    prompt: String,
}

impl Menu {
    /// Menu keyed `1`, `2`, ... in label order.
    pub fn numbered<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::keyed(
            labels
                .into_iter()
                .enumerate()
                .map(|(idx, label)| ((idx + 1).to_string(), Into::<String>::into(label))),
        )
    }

    pub fn keyed<I, K, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            preamble: None,
            items: items
                .into_iter()
                .map(|(key, label)| MenuItem {
                    key: key.into(),
                    label: label.into(),
                })
                .collect(),
            default: None,
            back: false,
            quittable: true,
            prompt: "> ".to_string(),
        }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    pub fn with_default(mut self, idx: usize) -> Self {
        self.default = (idx < self.items.len()).then_some(idx);
        self
    }

    pub fn with_back(mut self) -> Self {
        self.back = true;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(preamble) = &self.preamble {
            out.push_str(&term_format(preamble, &[FG_CYAN]));
            out.push('\n');
        }
        for (idx, item) in self.items.iter().enumerate() {
            let marker = if self.default == Some(idx) { " (default)" } else { "" };
            out.push_str(&format!("{} - {}{marker}\n", item.key, item.label));
        }
        if self.back {
            out.push_str("b - Return to the previous menu\n");
        }
        if self.quittable {
            out.push_str("q - Quit the application\n");
        }
        let hint = if self.default.is_some() {
            "Type a letter or number to select your choice or press enter for the default"
        } else {
            "Type a letter or number to select your choice"
        };
        out.push_str(&term_format(hint, &[FG_CYAN]));
        out.push('\n');
        out
    }

    /// Maps typed input to a selection. Item keys win over the back and quit
    /// flags, then a 1-based position, then the closest label.
    pub fn resolve(&self, input: &str) -> Selection {
        let choice = input.trim().to_lowercase();
        if choice.is_empty() {
            return self.default.map_or(Selection::Invalid, Selection::Item);
        }
        if let Some(idx) = self.items.iter().position(|item| item.key.to_lowercase() == choice) {
            return Selection::Item(idx);
        }
        if self.back && is_back_flag(&choice) {
            return Selection::Back;
        }
        if self.quittable && is_quit_flag(&choice) {
            return Selection::Quit;
        }
        if let Ok(position) = choice.parse::<usize>() {
            return if (1..=self.items.len()).contains(&position) {
                Selection::Item(position - 1)
            } else {
                Selection::Invalid
            };
        }
        self.fuzzy_match(&choice)
            .map_or(Selection::Invalid, Selection::Item)
    }

    fn fuzzy_match(&self, choice: &str) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, item)| (idx, fuzz::ratio(choice, &item.label.to_lowercase())))
            .filter(|&(_, score)| score >= FUZZY_THRESHOLD)
            // First label wins a tie.
            .fold(None, |best: Option<(usize, u8)>, (idx, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((idx, score)),
            })
            .map(|(idx, _)| idx)
    }

    /// Shows the menu until a valid answer is typed. `None` means the user
    /// went back; quitting surfaces as [`CliError::Quit`].
    pub fn ask<P: Prompt, W: Write>(&self, prompt: &mut P, out: &mut W) -> CliResult<Option<usize>> {
        loop {
            write!(out, "{}", self.render())?;
            out.flush()?;
            let input = prompt.read_line(&self.prompt)?;
            match self.resolve(&input) {
                Selection::Item(idx) => {
                    writeln!(out)?;
                    return Ok(Some(idx));
                }
                Selection::Back => {
                    writeln!(out)?;
                    return Ok(None);
                }
                Selection::Quit => return Err(CliError::Quit),
                Selection::Invalid => {
                    tracing::debug!(input = %input, "invalid menu selection");
                    throw_error(
                        out,
                        "Invalid option. Please enter the number or letter of your selection.",
                    )?;
                }
            }
        }
    }
}
