mod cli;
mod config;
mod convert;
mod decompose_cmd;
mod inspect_cmd;
mod logging;
mod series;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Decompose(args) => decompose_cmd::run(args),
        Command::Inspect(args) => inspect_cmd::run(args),
    }
}
