//! Shared library for the domainfit tool.
//!
//! The crate loads a device/usecase threat catalog, decides which usecases
//! each device can host, and renders the result. Public functions here form
//! the contract the `domainfit` binary depends on: catalog loading from the
//! embedded default or a file, matching, and report rendering.

use anyhow::{Context, Result};

pub mod catalog;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod report;

pub use catalog::{
    AttackVector, CATALOG_SCHEMA_VERSION, Device, DeviceName, Dimension, Level, Levels,
    RecordKind, Shortfall, ThreatCatalog, Tier, Tiers, Usecase, UsecaseName, VectorName,
};
pub use config::{CatalogSource, Cli, OutputFormat, RunConfig};
pub use conflicts::{Collision, collisions, row_collisions};
pub use error::{CatalogError, DefinitionError, InvalidInputError, RecordRef};
pub use matcher::{MatchRow, MatchTable, ThreatProfile, is_hostable, match_usecases, rejections};
pub use report::{ReportOptions, render_json, render_text};

/// Catalog shipped with the binary, used when no path is configured.
pub const DEFAULT_CATALOG_JSON: &str = include_str!("../catalog/threat_model.json");
const EMBEDDED_ORIGIN: &str = "<embedded catalog>";

/// Load and validate the catalog named by `source`.
pub fn load_catalog(source: &CatalogSource) -> Result<ThreatCatalog, CatalogError> {
    match source {
        CatalogSource::Embedded => ThreatCatalog::from_json_str(DEFAULT_CATALOG_JSON, EMBEDDED_ORIGIN),
        CatalogSource::File(path) => ThreatCatalog::load(path),
    }
}

/// Everything the binary prints on stdout for one run: the `--check`
/// summary or the full report. Requested devices are verified either way.
pub fn render_output(config: &RunConfig, catalog: &ThreatCatalog) -> Result<String> {
    config.check_devices(catalog)?;
    if config.check_only {
        return Ok(format!("{}\n", check_summary(catalog)));
    }
    build_report(config, catalog)
}

/// Match every device against every usecase and render the requested report.
///
/// Device filtering is applied after matching and only drops whole rows.
pub fn build_report(config: &RunConfig, catalog: &ThreatCatalog) -> Result<String> {
    config.check_devices(catalog)?;
    let mut table = match_usecases(catalog.devices(), catalog.usecases())?;
    if !config.devices.is_empty() {
        table.retain(|row| config.devices.contains(&row.device.name));
    }

    match config.format {
        OutputFormat::Text => {
            let mut out = String::new();
            render_text(&table, catalog.usecases(), &config.report, &mut out)
                .context("Failed to render text report")?;
            Ok(out)
        }
        OutputFormat::Json => {
            let mut out = render_json(catalog, &table).context("Failed to serialize report")?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// One-line summary printed by `--check`.
pub fn check_summary(catalog: &ThreatCatalog) -> String {
    format!(
        "catalog valid: {} devices, {} usecases",
        catalog.devices().len(),
        catalog.usecases().len()
    )
}

/// Split comma- or whitespace-delimited configuration lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
