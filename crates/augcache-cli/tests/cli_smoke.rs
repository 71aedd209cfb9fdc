use assert_cmd::Command;
use predicates::prelude::*;

fn augcache() -> Command {
    let mut cmd = Command::cargo_bin("augcache").unwrap();
    // keep the user's real config file out of the picture
    cmd.env_remove("AUGCACHE_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn cli_run_reports_amortization_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        "[cache]
load_size = 2
updates_per_reload = 4

[synthetic]
height = 8
width = 8
particles = 1
",
    );

    let output = augcache()
        .args(["--json", "--config"])
        .arg(&config)
        .args(["run", "--steps", "8", "--seed", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["steps"], 8);
    // initial fill plus reloads after updates 4 and 8
    assert_eq!(report["reloads"], 3);
    assert_eq!(report["upstream_calls"], 6);
    assert_eq!(report["final_state"]["updates_since_reload"], 0);
}

#[test]
fn cli_run_flags_override_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "[synthetic]\nheight = 4\nwidth = 6\nparticles = 2\n");

    let output = augcache()
        .args(["--json", "--config"])
        .arg(&config)
        .args([
            "run",
            "--steps",
            "3",
            "--load-size",
            "1",
            "--updates-per-reload",
            "1",
            "--augmentation",
            "mirror",
            "--show-sample",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["augmentation"], "mirror");
    assert_eq!(report["upstream_calls"], 4);
    assert_eq!(report["last_sample"]["shape"], serde_json::json!([4, 6]));
    assert_eq!(report["last_sample"]["properties"].as_array().unwrap().len(), 2);
}

#[test]
fn cli_rejects_zero_load_size() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "[cache]\nload_size = 0\nupdates_per_reload = 2\n");

    augcache()
        .arg("--config")
        .arg(&config)
        .args(["run", "--steps", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("load_size must be at least 1"));
}

#[test]
fn cli_config_prints_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "[cache]\nload_size = 3\nupdates_per_reload = 9\n");

    augcache()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("load_size = 3"))
        .stdout(predicate::str::contains("updates_per_reload = 9"));
}

#[test]
fn cli_rejects_seed_beyond_toml_range() {
    augcache()
        .args(["run", "--steps", "1", "--seed", "18446744073709551615"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--seed"));
}
