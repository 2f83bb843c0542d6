//! Cascade - drive the spreadsheet core from the command line

mod config;

use anyhow::{Context, Result, bail};
use cascade_core::{Coordinates, Spreadsheet, SpreadsheetConfig};
use cascade_engine::engine::ERROR_PREFIX;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: cascade [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <CELL=TEXT>     Set a cell of the active sheet (can be repeated)");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula and print its display value");
    eprintln!("  --config <FILE>           Load settings from a TOML file");
    eprintln!("  --no-config               Ignore the default config file");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Without --command the active sheet's data range is printed, tab-separated.");
}

#[derive(Debug, Default)]
struct Options {
    config_file: Option<PathBuf>,
    no_config: bool,
    sets: Vec<(Coordinates, String)>,
    command: Option<String>,
}

/// None means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "-s" | "--set" => {
                i += 1;
                let Some(assignment) = args.get(i) else {
                    bail!("--set requires CELL=TEXT");
                };
                let Some((cell, text)) = assignment.split_once('=') else {
                    bail!("--set expects CELL=TEXT, got '{}'", assignment);
                };
                let coords = Coordinates::parse(cell)
                    .with_context(|| format!("Invalid cell reference '{}'", cell))?;
                options.sets.push((coords, text.to_string()));
            }
            "-c" | "--command" => {
                i += 1;
                let Some(formula) = args.get(i) else {
                    bail!("--command requires a formula");
                };
                options.command = Some(formula.clone());
            }
            "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--config requires a file path");
                };
                options.config_file = Some(PathBuf::from(path));
            }
            "--no-config" => options.no_config = true,
            arg => bail!("Unknown argument: {}", arg),
        }
        i += 1;
    }

    Ok(Some(options))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(options: Options) -> Result<ExitCode> {
    let config = if options.no_config && options.config_file.is_none() {
        SpreadsheetConfig::default()
    } else {
        config::load_config(options.config_file.as_deref())?
    };

    let mut spreadsheet = Spreadsheet::new(config);
    let sheet = spreadsheet.active_sheet_mut()?;
    for (coords, text) in &options.sets {
        sheet
            .set_content(*coords, text)
            .with_context(|| format!("Failed to set {}", coords))?;
    }

    if let Some(command) = options.command {
        let formula = if command.starts_with('=') {
            command
        } else {
            format!("={}", command)
        };
        let display = sheet.evaluate(&formula);
        println!("{}", display);
        if display.starts_with(ERROR_PREFIX) {
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    for row in sheet.get_cell_range_with_data().display_rows() {
        println!("{}", row.join("\t"));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    init_tracing();
    match run(options) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
