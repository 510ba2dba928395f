use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn wl_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wl-sim"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn write(path: &Path, text: &str) -> String {
    fs::write(path, text).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn run_writes_artefacts() {
    let dir = tempdir().unwrap();
    let input = write(&dir.path().join("hairpin.seq"), "> hairpin\nGGGGAAAACCCC\n");
    let config = write(
        &dir.path().join("wl.yaml"),
        "check_steps: 200\nmax_steps: 2000\nseed_policy:\n  seed: 11\ncheckpoint:\n  first: 0\n",
    );
    let out = dir.path().join("out");
    let output = wl_sim(&["run", "--config", &config, "--in", &input, "--out", out.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    for name in ["summary.json", "config.yaml", "manifest.json", "flatness.csv", "hairpin.final.sc.dos"] {
        assert!(out.join(name).exists(), "missing {name}");
    }
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["seed"], 11);
    assert_eq!(summary["steps"], 2000);
    assert_eq!(summary["termination"], "step-limit");
}

#[test]
fn leaving_the_window_aborts_with_histogram_dump() {
    let dir = tempdir().unwrap();
    let input = write(&dir.path().join("tight.seq"), "GGGGAAAACCCC\n((((....))))\n");
    let config = write(
        &dir.path().join("wl.yaml"),
        "binning:\n  type: uniform\n  bins: 1\nenergy_min: -15.0\nenergy_max: -5.0\nseed_policy:\n  seed: 3\ncheckpoint:\n  first: 0\n",
    );
    let out = dir.path().join("out");
    let output = wl_sim(&["run", "--config", &config, "--in", &input, "--out", out.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("# bin\tlower\tupper\tH\tG"), "{stderr}");
    assert!(stderr.contains("energy-above-window"), "{stderr}");
    assert!(!out.join("summary.json").exists());
}

#[test]
fn failed_artefact_write_dumps_histograms() {
    let dir = tempdir().unwrap();
    let input = write(&dir.path().join("hairpin.seq"), "GGGGAAAACCCC\n");
    let config = write(
        &dir.path().join("wl.yaml"),
        "check_steps: 100\nmax_steps: 300\nseed_policy:\n  seed: 5\ncheckpoint:\n  first: 0\n",
    );
    let out = dir.path().join("out");
    fs::create_dir_all(out.join("hairpin.final.sc.dos")).unwrap();
    let output = wl_sim(&["run", "--config", &config, "--in", &input, "--out", out.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("# bin\tlower\tupper\tH\tG"), "{stderr}");
    assert!(stderr.contains("report-create"), "{stderr}");
    assert!(!out.join("summary.json").exists());
}

#[test]
fn enumerate_lists_ground_state_first() {
    let dir = tempdir().unwrap();
    let input = write(&dir.path().join("hairpin.seq"), "GGGGAAAACCCC\n");
    let output = wl_sim(&["enumerate", "--in", &input, "--window", "0"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "GGGGAAAACCCC");
    assert_eq!(lines[1], "((((....)))) -15.00");
}
