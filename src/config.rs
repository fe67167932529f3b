//! Command-line and environment configuration.
//!
//! Flags win over environment variables, which win over defaults. Env lookup
//! is injected so resolution can be tested without touching the process
//! environment.

use crate::catalog::{DeviceName, ThreatCatalog};
use crate::report::{DEFAULT_WIDTH, MIN_WIDTH, ReportOptions};
use crate::split_list;
use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

pub const CATALOG_ENV: &str = "DOMAINFIT_CATALOG";
pub const DEVICES_ENV: &str = "DOMAINFIT_DEVICES";
pub const WIDTH_ENV: &str = "DOMAINFIT_WIDTH";

#[derive(Parser, Debug, Default)]
#[command(
    name = "domainfit",
    version,
    about = "Match usecases to the devices whose threat levels can host them"
)]
pub struct Cli {
    #[arg(long, value_name = "PATH", help = "Catalog document (or set DOMAINFIT_CATALOG)")]
    pub catalog: Option<PathBuf>,
    #[arg(
        long = "device",
        value_name = "NAME",
        help = "Only report this device; repeatable (or set DOMAINFIT_DEVICES)"
    )]
    pub devices: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[arg(long, value_name = "N", help = "Wrap width for usecase lines (or set DOMAINFIT_WIDTH)")]
    pub width: Option<usize>,
    #[arg(long, help = "List colliding usecases under each device")]
    pub conflicts: bool,
    #[arg(long, help = "List rejected usecases and the levels they lack")]
    pub explain: bool,
    #[arg(long, help = "Validate the catalog and exit")]
    pub check: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the catalog document comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CatalogSource {
    Embedded,
    File(PathBuf),
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunConfig {
    pub catalog: CatalogSource,
    pub devices: Vec<DeviceName>,
    pub format: OutputFormat,
    pub report: ReportOptions,
    pub check_only: bool,
    pub verbosity: u8,
}

impl RunConfig {
    /// Merge parsed flags with the environment seen through `lookup`.
    pub fn resolve(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let catalog = cli
            .catalog
            .or_else(|| env_value(CATALOG_ENV).map(PathBuf::from))
            .map(CatalogSource::File)
            .unwrap_or(CatalogSource::Embedded);

        let devices = if cli.devices.is_empty() {
            env_value(DEVICES_ENV)
                .map(|raw| split_list(&raw))
                .unwrap_or_default()
        } else {
            cli.devices
        };

        let width = match cli.width {
            Some(width) => width,
            None => match env_value(WIDTH_ENV) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{WIDTH_ENV} must be a positive integer, got '{raw}'"))?,
                None => DEFAULT_WIDTH,
            },
        };
        if width < MIN_WIDTH {
            bail!("Report width must be at least {MIN_WIDTH} columns (got {width})");
        }

        Ok(Self {
            catalog,
            devices: devices.into_iter().map(DeviceName).collect(),
            format: cli.format,
            report: ReportOptions {
                width,
                show_conflicts: cli.conflicts,
                explain: cli.explain,
            },
            check_only: cli.check,
            verbosity: cli.verbose,
        })
    }

    /// Reject requested device names the catalog does not define.
    pub fn check_devices(&self, catalog: &ThreatCatalog) -> Result<()> {
        if let Some(unknown) = self
            .devices
            .iter()
            .find(|name| catalog.device(name).is_none())
        {
            bail!("Unknown device requested: {unknown}");
        }
        Ok(())
    }
}
