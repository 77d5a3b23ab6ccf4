mod cli;
mod commands;
mod logging;
mod store;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

/// Exit status for a booking that was checked and refused.
const EXIT_CONFLICT: i32 = 2;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command) {
        Ok(Outcome::Done) => {}
        Ok(Outcome::Conflict) => process::exit(EXIT_CONFLICT),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

/// How a successful command ended.
pub enum Outcome {
    Done,
    Conflict,
}

fn run(command: Command) -> Result<Outcome> {
    match command {
        Command::List(args) => commands::list(args),
        Command::Book(args) => commands::book(args),
        Command::Convert(args) => commands::convert(args),
    }
}
