//! chat2html
//!
//! Convert a Google Takeout chat archive into printable HTML transcripts.

use std::process::ExitCode;

use clap::Parser;
use log::error;

use chat2html::app::{App, CliArgs, Config};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    // Load configuration with precedence: CLI > env > file > defaults.
    let config = match Config::load_with_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match App::new(config).and_then(|mut app| app.run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}
