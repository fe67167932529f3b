// End-to-end suite for the domainfit binary; drives the CLI against the
// embedded catalog and temp-file catalogs so output and exit codes are pinned.
mod support;

use anyhow::Result;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::{Value, json};
use support::{domainfit, pinned_catalog, small_catalog, write_catalog, write_raw};

const SEPARATOR: &str = "---------------------------------------------";

// Default invocation needs no arguments and reports every embedded device.
#[test]
fn default_run_reports_embedded_catalog() {
    let assert = domainfit().assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some(
            "primary_pocket_computer, primary_laptop_computer, gsm_phone, computer_sec, \
             phone_banking_sim, android_secure, windows_tablet, work_computer"
        )
    );
    assert_eq!(lines.next(), Some(SEPARATOR));
    assert_eq!(stdout.lines().last(), Some(SEPARATOR));
    assert!(stdout.contains("\nwork_computer\n  phys=2, near=2, remote=2\n"));
    assert!(
        stdout
            .lines()
            .filter(|line| line.starts_with(" * "))
            .all(|line| line.len() <= 100)
    );
}

#[test]
fn text_report_for_file_catalog() -> Result<()> {
    let catalog = write_catalog(&small_catalog())?;
    let expected = format!(
        "pocket, sim_tray\n{SEPARATOR}\n\npocket\n  phys=2, near=1, remote=1\n * keepass, music\n\n\
         sim_tray\n  phys=1, near=1, remote=1\n * music\n{SEPARATOR}\n"
    );
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(expected);
    Ok(())
}

#[test]
fn catalog_path_from_environment() -> Result<()> {
    let catalog = write_catalog(&small_catalog())?;
    domainfit()
        .env("DOMAINFIT_CATALOG", catalog.path())
        .assert()
        .success()
        .stdout(contains("pocket, sim_tray\n"));
    Ok(())
}

#[test]
fn json_report_parses() -> Result<()> {
    let catalog = write_catalog(&small_catalog())?;
    let assert = domainfit()
        .args(["--format", "json", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success();
    let report: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(
        report,
        json!({
            "schema_version": "threat_catalog_v1",
            "devices": [
                {
                    "name": "pocket",
                    "levels": {"phys": 2, "near": 1, "remote": 1},
                    "tiers": {"phys": "hard", "near": "easy", "remote": "easy"},
                    "usecases": ["keepass", "music"],
                    "conflicts": [["keepass", "music"]]
                },
                {
                    "name": "sim_tray",
                    "levels": {"phys": 1, "near": 1, "remote": 1},
                    "tiers": {"phys": "easy", "near": "easy", "remote": "easy"},
                    "usecases": ["music"],
                    "conflicts": []
                }
            ]
        })
    );
    Ok(())
}

#[test]
fn device_filter_selects_rows() -> Result<()> {
    let catalog = write_catalog(&small_catalog())?;
    domainfit()
        .args(["--device", "sim_tray", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(contains("sim_tray\n").and(contains("pocket").not()));

    domainfit()
        .env("DOMAINFIT_DEVICES", "pocket")
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(contains(" * keepass, music").and(contains("sim_tray").not()));
    Ok(())
}

#[test]
fn unknown_device_fails_without_stdout() {
    domainfit()
        .args(["--device", "toaster"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("Unknown device requested: toaster"));
}

#[test]
fn check_prints_summary_only() -> Result<()> {
    domainfit()
        .arg("--check")
        .assert()
        .success()
        .stdout("catalog valid: 8 devices, 23 usecases\n");

    let catalog = write_catalog(&small_catalog())?;
    domainfit()
        .arg("--check")
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .success()
        .stdout("catalog valid: 2 devices, 3 usecases\n");
    Ok(())
}

#[test]
fn check_rejects_unknown_device() {
    domainfit()
        .args(["--check", "--device", "toaster"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("Unknown device requested: toaster"));
}

#[test]
fn conflicts_and_explain_annotate_rows() -> Result<()> {
    let catalog = write_catalog(&small_catalog())?;
    domainfit()
        .args(["--conflicts", "--explain", "--catalog"])
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(
            contains("  ! keepass collides with music")
                .and(contains("  - banking: near needs 2 (hard), has 1 (easy)"))
                .and(contains(
                    "  - banking: phys needs 2 (hard), has 1 (easy); near needs 2 (hard), has 1 (easy)",
                )),
        );
    Ok(())
}

#[test]
fn narrow_width_wraps_usecase_lines() {
    let assert = domainfit().args(["--width", "40"]).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for line in stdout.lines().filter(|line| line.starts_with(" * ")) {
        assert!(line.len() <= 40 || !line.contains(", "), "overlong line: {line}");
    }
    assert!(stdout.lines().filter(|line| line.starts_with(" * ")).count() > 8);
}

#[test]
fn rejects_too_narrow_width() {
    domainfit()
        .args(["--width", "10"])
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("at least 20"));
}

#[test]
fn missing_catalog_file_fails() {
    domainfit()
        .args(["--catalog", "/nonexistent/threat_model.json"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("failed to read catalog"));
}

#[test]
fn malformed_json_fails() -> Result<()> {
    let catalog = write_raw("{\"devices\": [")?;
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("failed to parse catalog"));
    Ok(())
}

#[test]
fn definition_error_names_the_record() -> Result<()> {
    let mut document = small_catalog();
    document["devices"][1]["name"] = json!("pocket");
    let catalog = write_catalog(&document)?;
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("device #2 ('pocket'): duplicate device name 'pocket'"));

    let mut document = small_catalog();
    document["usecases"][2]["phys"] = json!("high");
    let catalog = write_catalog(&document)?;
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .failure()
        .stderr(contains("usecase #3 ('music'): level 'phys' must be an integer"));
    Ok(())
}

#[test]
fn schema_violation_fails() -> Result<()> {
    let mut document = small_catalog();
    document["schema_version"] = json!("threat_catalog_v0");
    let catalog = write_catalog(&document)?;
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("failed schema validation"));
    Ok(())
}

#[test]
fn pinned_usecases_lower_device_levels() -> Result<()> {
    let catalog = write_catalog(&pinned_catalog())?;
    let expected = format!(
        "gsm_phone, tablet\n{SEPARATOR}\n\ngsm_phone\n  phys=2, near=1, remote=1\n * sim, keepass\n\n\
         tablet\n  phys=2, near=2, remote=2\n * sim, keepass, banking\n{SEPARATOR}\n"
    );
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .success()
        .stdout(expected);
    Ok(())
}

#[test]
fn impossible_usecase_fails_the_load() -> Result<()> {
    let mut document = pinned_catalog();
    document["usecases"][2]["attack_vectors"] = json!(["gsm_easy"]);
    let catalog = write_catalog(&document)?;
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .failure()
        .stdout("")
        .stderr(contains(
            "usecase 'banking' is impossible: near needs 2, capped at 1",
        ));

    let mut document = pinned_catalog();
    document["usecases"][0]["attack_vectors"] = json!(["wifi_easy"]);
    let catalog = write_catalog(&document)?;
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .failure()
        .stderr(contains("usecase 'sim' introduces unknown attack vector 'wifi_easy'"));
    Ok(())
}

#[test]
fn reserved_characters_in_names_fail() -> Result<()> {
    let mut document = small_catalog();
    document["usecases"][2]["name"] = json!("(none)");
    let catalog = write_catalog(&document)?;
    domainfit()
        .arg("--catalog")
        .arg(catalog.path())
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("name must not contain commas, parentheses or whitespace"));
    Ok(())
}
