//! dfd CLI entry point.

use std::io::IsTerminal as _;
use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, info};

use dfd_cli::{Args, run};

fn main() {
    let args = Args::parse();

    // initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting dfd");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = run(&args) {
        print_error(&format!("ERROR: {err}"));
        process::exit(1);
    }

    info!("Completed successfully");
}

/// Print an error message to stderr, in red if the output is a terminal.
fn print_error(text: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("\x1b[31m{text}\x1b[0m");
    } else {
        eprintln!("{text}");
    }
}
