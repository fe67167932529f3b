//! Report which usecases each device in a threat catalog can host.
//!
//! Loads the embedded catalog (or `--catalog` / `DOMAINFIT_CATALOG`),
//! validates it, matches every device against every usecase, and prints the
//! text or JSON report on stdout. Any failure goes to stderr with exit 1 and
//! nothing on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use domainfit::{Cli, RunConfig, load_catalog, logging, render_output};
use std::env;
use std::io::{self, Write};
use tracing::info;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = RunConfig::resolve(cli, |name| env::var(name).ok())?;
    logging::init(config.verbosity)?;

    let catalog = load_catalog(&config.catalog).context("Failed to load threat catalog")?;
    info!(
        devices = catalog.devices().len(),
        usecases = catalog.usecases().len(),
        "catalog ready"
    );

    let output = render_output(&config, &catalog)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write report")?;
    Ok(())
}
