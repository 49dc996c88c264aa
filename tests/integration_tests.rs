//! Integration tests for the piste-osm CLI
//!
//! Runs the built binary against small GeoJSON datasets written to a temp dir.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const NETWORK: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "geometry": {"type": "LineString", "coordinates": [[7.60, 46.00], [7.61, 46.01], [7.62, 46.02]]},
      "properties": {"segm_id": 101, "access": 0, "direction": 1, "discipline": "ski_tour"}
    },
    {
      "type": "Feature",
      "geometry": {"type": "LineString", "coordinates": [[7.62, 46.02], [7.61, 46.01], [7.60, 46.00]]},
      "properties": {
        "target_name": "Lake Loop", "name_en": "Blue", "difficulty_en": "T3",
        "target_altitude": 1200, "access": "abc", "url_sac_en": "https://www.sac-cas.ch/en/"
      }
    },
    {
      "type": "Feature",
      "geometry": {"type": "LineString", "coordinates": [[7.70, 46.10], [7.71, 46.11]]},
      "properties": {"discipline": "snowshoe_tour", "access": 2}
    }
  ]
}"#;

fn write_dataset(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write dataset");
    path
}

#[test]
fn test_cli_help_works() {
    Command::cargo_bin("piste-osm")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--input"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_cli_version_works() {
    Command::cargo_bin("piste-osm")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_input_is_a_parameter_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.osm");

    Command::cargo_bin("piste-osm")
        .unwrap()
        .args(["-i", "does-not-exist.geojson", "-o"])
        .arg(&output)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Missing does-not-exist.geojson"));

    assert!(!output.exists());
}

#[test]
fn test_output_is_required() {
    let dir = TempDir::new().unwrap();
    let input = write_dataset(&dir, "network.geojson", NETWORK);

    Command::cargo_bin("piste-osm")
        .unwrap()
        .arg("-i")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_converts_network_and_merges_coincident_segments() {
    let dir = TempDir::new().unwrap();
    let input = write_dataset(&dir, "network.geojson", NETWORK);
    let output = dir.path().join("osm/network.osm");

    Command::cargo_bin("piste-osm")
        .unwrap()
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("▶ Converting"))
        .stdout(predicate::str::contains("3 features -> 2 ways, 5 nodes (1 merged"));

    let xml = fs::read_to_string(&output).expect("Output should be written");

    assert!(xml.contains("<osm version=\"0.6\""));
    assert_eq!(xml.matches("<way ").count(), 2);
    assert_eq!(xml.matches("<node ").count(), 5);

    // Second feature overwrites the shared segment's tags where they collide
    assert!(xml.contains("k=\"name\" v=\"Lake Loop (Blue)\""));
    assert!(xml.contains("k=\"sac:access\" v=\"standard\""));
    assert!(xml.contains("k=\"sac:direction\" v=\"1\""));
    assert!(xml.contains("k=\"description\" v=\"Altitude: 1200m. Difficulty: T3.\""));
    assert!(xml.contains("k=\"website\" v=\"https://www.sac-cas.ch/en/\""));

    assert!(xml.contains("k=\"piste:type\" v=\"snowshoe\""));
    assert!(xml.contains("k=\"sac:access\" v=\"caution\""));
    assert!(!xml.contains("Ski Info"));
}

#[test]
fn test_output_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let input = write_dataset(&dir, "network.geojson", NETWORK);
    let first = dir.path().join("first.osm");
    let second = dir.path().join("second.osm");

    for output in [&first, &second] {
        Command::cargo_bin("piste-osm")
            .unwrap()
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(output)
            .arg("--no-progress")
            .assert()
            .success();
    }

    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_dataset(&dir, "network.geojson", NETWORK);
    let output = dir.path().join("network.osm");

    Command::cargo_bin("piste-osm")
        .unwrap()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--dry-run")
        .assert()
        .success()
        .stderr(predicate::str::contains("[DRY RUN]"));

    assert!(!output.exists());
}

#[test]
fn test_unsupported_format_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_dataset(&dir, "sac.gpkg", "not really a geopackage");

    Command::cargo_bin("piste-osm")
        .unwrap()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.osm"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("GPKG"));
}

#[test]
fn test_segment_without_name_gets_placeholder() {
    let dir = TempDir::new().unwrap();
    let input = write_dataset(
        &dir,
        "segments.geojson",
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature",
             "geometry": {"type": "LineString", "coordinates": [[8.0, 46.5], [8.1, 46.6]]},
             "properties": {"segm_id": "42"}}
        ]}"#,
    );
    let output = dir.path().join("segments.osm");

    Command::cargo_bin("piste-osm")
        .unwrap()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--no-progress")
        .assert()
        .success();

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("k=\"name\" v=\"Ski Info\""));
    assert!(xml.contains("k=\"piste:type\" v=\"skitour\""));
}
