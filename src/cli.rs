use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Canonical SEATS decomposition of seasonal ARIMA models.
#[derive(Parser)]
#[command(
    name = "sadj",
    version,
    about = "Canonical SEATS decomposition of seasonal ARIMA models"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Decompose a series into trend, seasonal, transitory and irregular.
    Decompose(DecomposeArgs),
    /// Print the canonical decomposition of the configured model.
    Inspect(InspectArgs),
}

/// Arguments for the `decompose` subcommand.
#[derive(clap::Args)]
pub struct DecomposeArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "sadj.toml")]
    pub config: PathBuf,

    /// Override the series path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output CSV path; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the estimation method (wk, smoother, matrix).
    #[arg(short, long)]
    pub method: Option<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "sadj.toml")]
    pub config: PathBuf,
}
