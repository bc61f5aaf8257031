//! GeoProc CLI - server entry point and configuration tooling.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "geoproc")]
#[command(about = "Geospatial process execution server", long_about = None)]
#[command(version = geoproc::VERSION)]
struct Cli {
    /// Path to the INI configuration file
    #[arg(long, global = true, default_value = "geoproc.ini")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the processing server
    Serve,
    /// Load and validate the configuration, then print the effective values
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve => commands::serve::run(&cli.config).await,
        Command::CheckConfig => commands::config::run(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
