use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_nshot")
}

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("nshot-{name}-{stamp}"));
    fs::create_dir_all(&dir).expect("temp dir should be created");
    dir
}

fn nshot() -> Command {
    let mut cmd = Command::new(bin());
    cmd.env("NSHOT_SEED", "7").env("NSHOT_SIMS", "400");
    cmd
}

#[test]
fn simulate_command_dispatches_and_emits_json() {
    let output = nshot()
        .args(["simulate", "--min", "1000", "--max", "1000", "--monster", "training_dummy"])
        .output()
        .expect("simulate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("simulate should emit json");
    assert_eq!(payload["seed"], 7);
    assert_eq!(payload["skill"], "savage_blow");
    assert_eq!(payload["summary"]["trials"], 400);
    assert_eq!(payload["summary"]["rows"][0]["casts"], 1);
}

#[test]
fn simulate_command_is_reproducible_with_seed() {
    let args = [
        "simulate", "--min", "900", "--max", "1400", "--monster", "bain", "--venom", "20",
        "--luk", "250", "--dex", "30", "--str", "4", "--seed", "99",
    ];
    let first = nshot().args(args).output().expect("first run");
    let second = nshot().args(args).output().expect("second run");
    assert_eq!(first.status.code(), Some(0));
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn simulate_table_flag_prints_tab_separated_rows() {
    let output = nshot()
        .args(["simulate", "--min", "1000", "--max", "1000", "--table"])
        .output()
        .expect("simulate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("casts\tcount\tpercent\tcumulative"));
    assert_eq!(lines.next(), Some("1\t400\t100.00\t100.00"));
    assert!(stdout.contains("expected\t1.00"));
}

#[test]
fn simulate_trace_flag_emits_events() {
    let output = nshot()
        .args(["simulate", "--min", "500", "--max", "700", "--monster", "skeleton_soldier", "--trace"])
        .output()
        .expect("simulate should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("trace should emit json");
    let events = payload["events"].as_array().expect("events array");
    assert!(!events.is_empty());
    assert_eq!(events[0]["kind"], "cast");
    assert_eq!(payload["outcome"]["killed"], true);
}

#[test]
fn simulate_without_attack_range_is_usage_error() {
    let output = nshot()
        .args(["simulate", "--monster", "bain"])
        .output()
        .expect("simulate should run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn simulate_with_unparsable_seed_is_usage_error() {
    let output = nshot()
        .args(["simulate", "--min", "10", "--max", "20", "--seed", "12x"])
        .output()
        .expect("simulate should run");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid --seed '12x'"));
}

#[test]
fn simulate_with_unknown_monster_fails() {
    let output = nshot()
        .args(["simulate", "--min", "10", "--max", "20", "--monster", "nobody"])
        .output()
        .expect("simulate should run");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nobody"));
}

#[test]
fn info_command_lists_tables() {
    let output = nshot().arg("info").output().expect("info should run");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("training_dummy"));
    assert!(stdout.contains("savage_blow"));
    assert!(!stdout.contains("  venom\t"));
}

#[test]
fn validate_command_passes_on_repo_data() {
    let output = nshot().arg("validate").output().expect("validate should run");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));
}

#[test]
fn validate_command_reports_bad_tables() {
    let dir = unique_temp_dir("validate");
    fs::write(
        dir.join("monsters.json"),
        r#"[{"id":"ghost","name":"Ghost","hp":0,"weapon_def":10}]"#,
    )
    .expect("write monsters");
    fs::copy("data/skills.json", dir.join("skills.json")).expect("copy skills");

    let output = nshot()
        .args(["validate", dir.to_str().expect("utf-8 path")])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed:"), "{stderr}");
    assert!(stderr.contains("hp must be positive"), "{stderr}");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_command_prints_usage() {
    let output = Command::new(bin()).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: nshot"));
}
