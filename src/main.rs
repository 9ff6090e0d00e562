//! `pwout <logfile> [settings] [--records]`
//!
//! Parses a pw.x output file and prints the flattened result as JSON, or
//! one JSON object per record with `--records`.

use std::env;
use std::fs;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pwout::settings::Settings;
use pwout::{Parser, PwoutError, Result};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "pwout failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let records_only = match args.iter().position(|a| a == "--records") {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    };
    let Some(log_path) = args.first() else {
        return Err(PwoutError::Config(
            "usage: pwout <logfile> [settings] [--records]".to_string(),
        ));
    };
    let settings = Settings::load(args.get(1).map(String::as_str))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let text = fs::read_to_string(log_path)?;
    let parser = Parser::new(settings.registry()?);
    info!(file = %log_path, rules = parser.registry().len(), "parsing");

    if records_only {
        let mut count = 0;
        for record in parser.parse(text.lines()) {
            println!("{}", serde_json::to_string(&record)?);
            count += 1;
        }
        info!(records = count, "done");
    } else {
        let flat = parser.parse_flat(text.lines());
        let json = if settings.pretty {
            serde_json::to_string_pretty(&flat)?
        } else {
            serde_json::to_string(&flat)?
        };
        println!("{}", json);
        info!(keys = flat.len(), "done");
    }
    Ok(())
}
