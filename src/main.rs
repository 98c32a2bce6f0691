//! Balance Projection CLI
//!
//! Loads a scenario (JSON) and an optional ledger (CSV), projects balances and
//! writes the result as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- scenario.json ledger.csv > projection.csv
//! cargo run -- scenario.json ledger.csv --events > events.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug`, `info` or `warn` to control logging verbosity

use balance_projection::{EngineError, MemoryLedger, ProjectionService, Result, Scenario};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let events_only = args.iter().any(|a| a == "--events");
    let mut paths = args.iter().filter(|a| !a.starts_with("--"));

    let scenario_path = paths.next().ok_or(EngineError::MissingArgument)?;
    let scenario = Scenario::from_reader(BufReader::new(File::open(scenario_path)?))?;

    let ledger = match paths.next() {
        Some(path) => MemoryLedger::from_csv(BufReader::new(File::open(path)?))?,
        None => MemoryLedger::new(),
    };

    let start = scenario
        .start_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let service = ProjectionService::new(&scenario)?;
    let projection = service.run(&ledger, start, scenario.days)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    if events_only {
        projection.write_events(handle)?;
    } else {
        projection.write_rows(handle, service.account_names())?;
    }

    Ok(())
}
