use anyhow::{Context, Result};
use assert_cmd::Command;
use serde_json::{Value, json};
use std::io::Write;
use tempfile::NamedTempFile;

/// The `domainfit` binary with catalog-related env vars cleared so the host
/// environment cannot leak into a test.
pub fn domainfit() -> Command {
    let mut cmd = Command::cargo_bin("domainfit").expect("domainfit binary is built");
    cmd.env_remove("DOMAINFIT_CATALOG")
        .env_remove("DOMAINFIT_DEVICES")
        .env_remove("DOMAINFIT_WIDTH")
        .env_remove("RUST_LOG");
    cmd
}

/// Small valid catalog used across the CLI tests.
pub fn small_catalog() -> Value {
    json!({
        "schema_version": "threat_catalog_v1",
        "devices": [
            {"name": "pocket", "phys": 2, "near": 1, "remote": 1},
            {"name": "sim_tray", "phys": 1, "near": 1, "remote": 1}
        ],
        "usecases": [
            {"name": "keepass", "phys": 2, "near": 1, "remote": 1},
            {"name": "banking", "phys": 2, "near": 2, "remote": 1},
            {"name": "music", "phys": 1, "near": 1, "remote": 1, "collides_with": ["keepass"]}
        ]
    })
}

/// Catalog whose first device pins a usecase that introduces a weak
/// attack vector, so its effective levels sit below its ceiling.
pub fn pinned_catalog() -> Value {
    json!({
        "schema_version": "threat_catalog_v1",
        "attack_vectors": [
            {"name": "gsm_easy", "phys": 2, "near": 1, "remote": 1}
        ],
        "devices": [
            {"name": "gsm_phone", "phys": 2, "near": 2, "remote": 2, "pinned": ["sim"]},
            {"name": "tablet", "phys": 2, "near": 2, "remote": 2}
        ],
        "usecases": [
            {"name": "sim", "phys": 1, "near": 1, "remote": 1, "attack_vectors": ["gsm_easy"]},
            {"name": "keepass", "phys": 2, "near": 1, "remote": 1},
            {"name": "banking", "phys": 2, "near": 2, "remote": 1}
        ]
    })
}

/// Write `document` to a temp file that lives as long as the handle.
pub fn write_catalog(document: &Value) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("failed to create temp catalog")?;
    serde_json::to_writer_pretty(&mut file, document).context("failed to write temp catalog")?;
    file.flush()?;
    Ok(file)
}

/// Write raw bytes, for documents that are not valid JSON.
pub fn write_raw(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("failed to create temp catalog")?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
