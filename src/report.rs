//! Text and JSON rendering of a match table.
//!
//! The text layout is a header listing device names, a dash separator, then
//! per device its name, its levels, and one or more ` * ` lines of matched
//! usecase names. Wrapping of those lines is cosmetic; the set of names is
//! exactly the matcher's row.

use crate::catalog::{Device, Levels, Shortfall, ThreatCatalog, Tiers, Usecase};
use crate::conflicts::{Collision, row_collisions};
use crate::matcher::{MatchRow, MatchTable, rejections};
use serde::Serialize;
use std::fmt;

const SEPARATOR: &str = "---------------------------------------------";
const BULLET: &str = " * ";
// Parentheses are rejected in names, so this cannot be mistaken for a usecase.
const NO_MATCHES: &str = "(none)";

/// Narrowest wrap width accepted for ` * ` lines.
pub const MIN_WIDTH: usize = 20;
pub const DEFAULT_WIDTH: usize = 100;

/// Presentation knobs; none of them affect which usecases are listed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportOptions {
    pub width: usize,
    pub show_conflicts: bool,
    pub explain: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            show_conflicts: false,
            explain: false,
        }
    }
}

/// Render the text report for `table` into `writer`.
///
/// `usecases` is the full usecase catalog, needed only for `--explain`.
pub fn render_text<W: fmt::Write>(
    table: &MatchTable<'_, Device, Usecase>,
    usecases: &[Usecase],
    options: &ReportOptions,
    writer: &mut W,
) -> fmt::Result {
    let header = table
        .iter()
        .map(|row| row.device.name.0.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(writer, "{header}")?;
    writeln!(writer, "{SEPARATOR}")?;
    for row in table.iter() {
        render_row(row, usecases, options, writer)?;
    }
    writeln!(writer, "{SEPARATOR}")?;
    Ok(())
}

fn render_row<W: fmt::Write>(
    row: &MatchRow<'_, Device, Usecase>,
    usecases: &[Usecase],
    options: &ReportOptions,
    writer: &mut W,
) -> fmt::Result {
    writeln!(writer)?;
    writeln!(writer, "{}", row.device.name)?;
    writeln!(writer, "  {}", row.levels)?;

    let names: Vec<&str> = row.usecases.iter().map(|u| u.name.0.as_str()).collect();
    if names.is_empty() {
        writeln!(writer, "{BULLET}{NO_MATCHES}")?;
    } else {
        for line in wrap_names(&names, options.width) {
            writeln!(writer, "{BULLET}{line}")?;
        }
    }

    if options.show_conflicts {
        for collision in row_collisions(row) {
            let (first, second) = collision.names();
            writeln!(writer, "  ! {first} collides with {second}")?;
        }
    }

    if options.explain {
        // Catalog records always carry three levels, so this cannot fail.
        let rejected = rejections(row.device, usecases).map_err(|_| fmt::Error)?;
        for (usecase, gaps) in rejected {
            writeln!(writer, "  - {}: {}", usecase.name, describe_shortfalls(&gaps))?;
        }
    }
    Ok(())
}

/// Greedy comma-joined lines no wider than `width` columns (including the
/// bullet). A single name longer than the width gets a line of its own.
pub fn wrap_names(names: &[&str], width: usize) -> Vec<String> {
    let budget = width.saturating_sub(BULLET.chars().count());
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut columns = 0;
    for name in names {
        let name_columns = name.chars().count();
        if current.is_empty() {
            current.push_str(name);
            columns = name_columns;
        } else if columns + 2 + name_columns <= budget {
            current.push_str(", ");
            current.push_str(name);
            columns += 2 + name_columns;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(name);
            columns = name_columns;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn describe_shortfalls(gaps: &[Shortfall]) -> String {
    gaps.iter()
        .map(|gap| {
            format!(
                "{} needs {}, has {}",
                gap.dimension,
                gap.required.labelled(),
                gap.available.labelled()
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Machine-readable form of the report.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub schema_version: &'a str,
    pub devices: Vec<JsonDevice<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonDevice<'a> {
    pub name: &'a str,
    pub levels: Levels,
    pub tiers: Tiers,
    pub usecases: Vec<&'a str>,
    pub conflicts: Vec<Collision<'a>>,
}

impl<'a> JsonReport<'a> {
    pub fn build(catalog: &'a ThreatCatalog, table: &MatchTable<'a, Device, Usecase>) -> Self {
        let devices = table
            .iter()
            .map(|row| JsonDevice {
                name: &row.device.name.0,
                levels: row.levels,
                tiers: row.levels.tiers(),
                usecases: row.usecases.iter().map(|&u| u.name.0.as_str()).collect(),
                conflicts: row_collisions(row),
            })
            .collect();
        Self {
            schema_version: catalog.schema_version(),
            devices,
        }
    }
}

/// Pretty-printed JSON report.
pub fn render_json(
    catalog: &ThreatCatalog,
    table: &MatchTable<'_, Device, Usecase>,
) -> serde_json::Result<String> {
    let report = JsonReport::build(catalog, table);
    serde_json::to_string_pretty(&report)
}
