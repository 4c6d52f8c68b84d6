//! pla - command-line front end for pla-core

mod cli;
mod commands;
mod reader;
mod report;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use report::RowWriter;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Compress {
            input,
            output,
            options,
            algorithm,
        } => {
            commands::compress(&input, &output, algorithm, &options)?;
        }
        Command::Decompress { input, output } => {
            let mut out = open_output(output.as_deref())?;
            commands::decompress(&input, &mut out)?;
        }
        Command::Evaluate {
            input,
            output,
            options,
            algorithm,
        } => {
            let mut rows = RowWriter::new(open_output(output.as_deref())?);
            commands::evaluate(&input, &algorithm, &options, &mut rows)?;
            rows.finish()?;
        }
    }

    Ok(())
}

/// Log to stderr; stdout carries command output
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("PLA_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn open_output(path: Option<&std::path::Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}
