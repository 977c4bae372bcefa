use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use meteorite_filter::cli::CliArgs;
use meteorite_filter::error::{CliError, CliResult};
use meteorite_filter::logging;
use meteorite_filter::settings::{default_settings_path, Settings};
use meteorite_filter::shell::Shell;
use meteorite_filter::user_interaction::{EditorPrompt, LinePrompt};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "meteorite-filter failed");
            eprintln!("meteorite-filter: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> CliResult<()> {
    if args.write_config {
        return write_config(&args);
    }

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply_overrides(&mut settings);

    let stdout = io::stdout();
    if io::stdin().is_terminal() {
        let prompt = EditorPrompt::new()?;
        Shell::new(&settings, prompt, stdout.lock())
            .clear_screen(true)
            .run(args.path)
    } else {
        Shell::new(&settings, LinePrompt::stdin(), stdout.lock()).run(args.path)
    }
}

fn write_config(args: &CliArgs) -> CliResult<()> {
    let path = args
        .config
        .clone()
        .or_else(default_settings_path)
        .ok_or(CliError::NoSettingsPath)?;
    let mut settings = if path.exists() {
        Settings::read_from(&path)?
    } else {
        Settings::default()
    };
    args.apply_overrides(&mut settings);
    settings.write_to(&path)?;
    println!("Wrote settings to {}", path.display());
    Ok(())
}
