//! irkit CLI - Impulse-Response Conversion
//!
//! Command-line interface for probing and resampling impulse responses.

use clap::Parser;
use env_logger::Env;
use log::info;

use irkit::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("irkit v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("irkit v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Probe { path, json } => irkit::cli::commands::probe(&path, json),
        Commands::Convert {
            path,
            rate,
            quality,
            clip,
            output,
        } => irkit::cli::commands::convert(
            &path,
            rate,
            quality.into(),
            clip.into(),
            output.as_deref(),
        ),
        Commands::Resample {
            directory,
            filename,
            rate,
            quality,
            reuse,
        } => irkit::cli::commands::resample(&directory, &filename, rate, quality.into(), reuse)
            .map(|_| ()),
    }
}
