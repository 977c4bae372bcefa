//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::settings::Settings;

/// Filter meteorite landing data by mass or year
#[derive(Parser, Debug)]
#[command(name = "meteorite-filter", version, about)]
pub struct CliArgs {
    /// Data file to open; skips the first file-name prompt
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Field delimiter of the data file (a single character)
    #[arg(short, long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Directory for saved text files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    pub write_config: bool,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Command-line values take precedence over the settings file.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(delimiter) = self.delimiter {
            settings.delimiter = delimiter;
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_path() {
        let args = CliArgs::parse_from([
            "meteorite-filter",
            "--delimiter",
            ",",
            "-o",
            "out",
            "-v",
            "data.txt",
        ]);
        assert_eq!(args.path, Some(PathBuf::from("data.txt")));
        assert!(args.verbose);
        assert!(!args.write_config);

        let mut settings = Settings::default();
        args.apply_overrides(&mut settings);
        assert_eq!(settings.delimiter, ',');
        assert_eq!(settings.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn delimiter_must_be_one_character() {
        assert!(CliArgs::try_parse_from(["meteorite-filter", "--delimiter", "ab"]).is_err());
    }

    #[test]
    fn no_flags_keeps_settings() {
        let args = CliArgs::parse_from(["meteorite-filter"]);
        let mut settings = Settings::default();
        args.apply_overrides(&mut settings);
        assert_eq!(settings, Settings::default());
    }
}
