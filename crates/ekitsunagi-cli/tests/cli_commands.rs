//! Integration tests for the CLI subcommands.

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::{tempdir, TempDir};

use ekitsunagi_lib::{run_build, BuildRequest};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .canonicalize()
        .expect("fixtures present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("ekitsunagi-cli");
    cmd.env("RUST_LOG", "error").env("NO_COLOR", "1");
    cmd
}

/// Temporary directory holding freshly built fixture artifacts.
struct Artifacts {
    _dir: TempDir,
    base: PathBuf,
    walking: PathBuf,
}

impl Artifacts {
    fn build() -> Self {
        let dir = tempdir().expect("create temp dir");
        let base = dir.path().join("graph.json");
        let walking = dir.path().join("graph_walking.json");
        run_build(&BuildRequest {
            data_dir: fixtures_dir(),
            config_path: fixtures_dir().join("area.json"),
            base_output: base.clone(),
            walking_output: walking.clone(),
        })
        .expect("fixture build succeeds");

        Self {
            _dir: dir,
            base,
            walking,
        }
    }
}

#[test]
fn build_writes_artifacts_and_reports_counts() {
    let dir = tempdir().expect("create temp dir");
    let base = dir.path().join("out/graph.json");
    let walking = dir.path().join("out/graph_walking.json");

    cli()
        .arg("build")
        .arg("--config")
        .arg(fixtures_dir().join("area.json"))
        .arg("--data-dir")
        .arg(fixtures_dir())
        .arg("--base-output")
        .arg(&base)
        .arg("--walking-output")
        .arg(&walking)
        .assert()
        .success()
        .stdout(contains("(13 stations, 26 edges)"))
        .stdout(contains("(13 stations, 32 edges)"))
        .stdout(contains("sha256 "));

    assert!(base.exists());
    assert!(walking.exists());
}

#[test]
fn build_reads_data_dir_from_environment() {
    let dir = tempdir().expect("create temp dir");
    let base = dir.path().join("graph.json");

    cli()
        .env("EKITSUNAGI_DATA_DIR", fixtures_dir())
        .args(["--format", "json", "build", "--config"])
        .arg(fixtures_dir().join("area.json"))
        .arg("--base-output")
        .arg(&base)
        .arg("--walking-output")
        .arg(dir.path().join("graph_walking.json"))
        .assert()
        .success()
        .stdout(contains("\"digest\""));

    assert!(base.exists());
}

#[test]
fn build_with_missing_tables_fails_with_context() {
    let dir = tempdir().expect("create temp dir");

    cli()
        .arg("build")
        .arg("--config")
        .arg(fixtures_dir().join("area.json"))
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--base-output")
        .arg(dir.path().join("graph.json"))
        .arg("--walking-output")
        .arg(dir.path().join("graph_walking.json"))
        .assert()
        .failure()
        .stderr(contains("failed to build graphs"));

    assert!(!dir.path().join("graph.json").exists());
}

#[test]
fn route_prints_walking_shortcut() {
    let artifacts = Artifacts::build();

    cli()
        .arg("route")
        .arg("--graph")
        .arg(&artifacts.walking)
        .args(["--from", "東京", "--to", "三越前"])
        .assert()
        .success()
        .stdout(contains(
            "Route from 東京 to 三越前 (2 stops, 1 line change):",
        ))
        .stdout(contains("STRT 東京"))
        .stdout(contains("WALK 大手町 (walking)"))
        .stdout(contains("LINE 三越前 (東京メトロ半蔵門線)"));
}

#[test]
fn route_json_reports_stop_count() {
    let artifacts = Artifacts::build();

    let output = cli()
        .args(["--format", "json", "route", "--graph"])
        .arg(&artifacts.base)
        .args(["--from", "東京", "--to", "三越前"])
        .output()
        .expect("command runs");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["stop_count"], 6);
    assert_eq!(json["steps"][0]["station"], "東京");
    assert_eq!(json["steps"][6]["station"], "三越前");
}

#[test]
fn route_to_unknown_station_suggests_names() {
    let artifacts = Artifacts::build();

    cli()
        .arg("route")
        .arg("--graph")
        .arg(&artifacts.base)
        .args(["--from", "渋谷駅", "--to", "東京"])
        .assert()
        .failure()
        .stderr(contains("Did you mean '渋谷'?"));
}

#[test]
fn route_to_same_station_is_rejected() {
    let artifacts = Artifacts::build();

    cli()
        .arg("route")
        .arg("--graph")
        .arg(&artifacts.base)
        .args(["--from", "東京", "--to", "東京"])
        .assert()
        .failure()
        .stderr(contains("start and goal are both '東京'"));
}

#[test]
fn hint_ranks_candidates() {
    let artifacts = Artifacts::build();

    cli()
        .arg("hint")
        .arg("--graph")
        .arg(&artifacts.walking)
        .args(["--goal", "三越前", "--frontier", "東京"])
        .assert()
        .success()
        .stdout(contains("Closest next stations to 三越前:"))
        .stdout(contains("1. 大手町 (1 stop to go)"))
        .stdout(contains("2. 有楽町 (3 stops to go)"));
}

#[test]
fn hint_requires_a_frontier() {
    let artifacts = Artifacts::build();

    cli()
        .arg("hint")
        .arg("--graph")
        .arg(&artifacts.walking)
        .args(["--goal", "三越前"])
        .assert()
        .failure()
        .stderr(contains("--frontier"));
}

#[test]
fn line_lists_stations_in_order() {
    let artifacts = Artifacts::build();

    cli()
        .arg("line")
        .arg("--graph")
        .arg(&artifacts.base)
        .args(["--line", "28001"])
        .assert()
        .success()
        .stdout(contains("東京メトロ銀座線 (6 stations):"))
        .stdout(contains("日本橋").and(contains("渋谷")));

    cli()
        .arg("line")
        .arg("--graph")
        .arg(&artifacts.base)
        .args(["--line", "21001"])
        .assert()
        .failure()
        .stderr(contains("line 21001 has no edges"));
}

#[test]
fn missing_artifact_is_reported() {
    let dir = tempdir().expect("create temp dir");

    cli()
        .arg("route")
        .arg("--graph")
        .arg(dir.path().join("absent.json"))
        .args(["--from", "東京", "--to", "三越前"])
        .assert()
        .failure()
        .stderr(contains("failed to load graph artifact"));
}
