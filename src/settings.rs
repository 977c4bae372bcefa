// settings.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dsv_value::{FieldType, TypeMap};
use crate::error::{CliError, CliResult};
use crate::table_printer::DEFAULT_MARGIN;

pub const SETTINGS_DIR: &str = "meteorite-filter";
pub const SETTINGS_FILE: &str = "settings.json";

/// A field the user can filter on, and how the shell talks about it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FilterField {
    pub field: String,
    pub menu_desc: String,
    pub input_desc: String,
    pub header: String,
}

impl FilterField {
    fn new(field: &str, menu_desc: &str, input_desc: &str, header: &str) -> Self {
        Self {
            field: field.to_string(),
            menu_desc: menu_desc.to_string(),
            input_desc: input_desc.to_string(),
            header: header.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub delimiter: char,
    pub column_margin: usize,
    pub output_dir: PathBuf,
    pub name_field: String,
    pub type_map: TypeMap,
    pub filter_fields: Vec<FilterField>,
}

impl Default for Settings {
    fn default() -> Self {
        let type_map = [
            ("id", FieldType::Int),
            ("mass (g)", FieldType::Float),
            ("year", FieldType::Int),
            ("reclat", FieldType::Float),
            ("reclong", FieldType::Float),
            ("States", FieldType::Int),
            ("Counties", FieldType::Int),
        ]
        .into_iter()
        .map(|(field, field_type)| (field.to_string(), field_type))
        .collect();

        Self {
            delimiter: '\t',
            column_margin: DEFAULT_MARGIN,
            output_dir: PathBuf::from("."),
            name_field: "name".to_string(),
            type_map,
            filter_fields: vec![
                FilterField::new(
                    "mass (g)",
                    "Meteorite mass",
                    "the meteorite's mass in grams",
                    "MASS (g)",
                ),
                FilterField::new(
                    "year",
                    "Year meteorite fell",
                    "the year the meteorite fell",
                    "YEAR",
                ),
            ],
        }
    }
}

/// `<config dir>/meteorite-filter/settings.json`, when the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

impl Settings {
    /// Loads settings from `explicit` (which must exist), or from the default
    /// location when present, or falls back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> CliResult<Settings> {
        if let Some(path) = explicit {
            return Self::read_from(path);
        }
        match default_settings_path() {
            Some(path) if path.exists() => Self::read_from(&path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Settings::default())
            }
            None => {
                tracing::debug!("no config directory available, using default settings");
                Ok(Settings::default())
            }
        }
    }

    pub fn read_from(path: &Path) -> CliResult<Settings> {
        let text = fs::read_to_string(path).map_err(|source| CliError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| CliError::SettingsParse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Writes these settings as pretty JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> CliResult<()> {
        let write_err = |source| CliError::SettingsWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut text = serde_json::to_string_pretty(self).map_err(|source| {
            CliError::SettingsParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        text.push('\n');
        fs::write(path, text).map_err(write_err)?;
        Ok(())
    }

    pub fn filter_field(&self, field: &str) -> Option<&FilterField> {
        self.filter_fields.iter().find(|f| f.field == field)
    }
}
