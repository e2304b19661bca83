//! End-to-end tests driving the `tl` binary.
//!
//! Each test points the binary at a temporary log directory through a
//! `--config` file and isolates it from the user's own configuration.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn tl_binary() -> String {
    env!("CARGO_BIN_EXE_tl").to_string()
}

const DEVBOX_LOG: &str = "\
* Planning :work:
:PROPERTIES:
:TIMELOG-ID: devbox-1
:TIMELOG-TIMESTAMP: 2024-01-01 10:00:00
:END:
* Review :work:
:PROPERTIES:
:TIMELOG-ID: devbox-2
:TIMELOG-TIMESTAMP: 2024-01-02 09:00:00
:END:
";

const LAPTOP_LOG: &str = "\
* Coding :dev:
:PROPERTIES:
:TIMELOG-ID: laptop-1
:TIMELOG-TIMESTAMP: 2024-01-01 12:00:00
:END:
* Heading without a drawer
";

/// Writes a config file selecting `log_dir` and a fixed host id.
fn setup(temp: &Path) -> std::path::PathBuf {
    let log_dir = temp.join("logs");
    let config_file = temp.join("config.toml");
    fs::write(
        &config_file,
        format!(
            "log_dir = \"{}\"\nhost_id = \"devbox\"\n",
            log_dir.display()
        ),
    )
    .unwrap();
    config_file
}

fn write_fixtures(temp: &Path) {
    let log_dir = temp.join("logs");
    fs::create_dir_all(&log_dir).unwrap();
    fs::write(log_dir.join("devbox.org"), DEVBOX_LOG).unwrap();
    fs::write(log_dir.join("laptop.org"), LAPTOP_LOG).unwrap();
}

fn tl(temp: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(tl_binary())
        .env("HOME", temp)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run tl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_log_creates_active_document() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());

    let output = tl(
        temp.path(),
        &config,
        &["log", "Planning", "--tags", "work", "--set", "project=timelog"],
    );
    assert!(output.status.success(), "tl log failed: {}", stderr(&output));
    assert!(stdout(&output).starts_with("Logged devbox-"));

    let document = fs::read_to_string(temp.path().join("logs/devbox.org")).unwrap();
    assert!(document.starts_with("* Planning :work:\n:PROPERTIES:\n:TIMELOG-ID: devbox-"));
    assert!(document.contains(":TIMELOG-PROJECT: timelog\n"));
    assert!(document.contains(":END:\n"));
}

#[test]
fn test_logged_entries_are_appended_in_order() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());

    for title in ["First", "Second"] {
        let output = tl(temp.path(), &config, &["log", title]);
        assert!(output.status.success(), "tl log failed: {}", stderr(&output));
    }

    let output = tl(temp.path(), &config, &["csv", "--fields", "TITLE"]);
    assert!(output.status.success(), "tl csv failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "TITLE\n\"First\"\n\"Second\"\n");
}

#[test]
fn test_csv_merges_documents_and_skips_malformed_entries() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    write_fixtures(temp.path());

    let output = tl(
        temp.path(),
        &config,
        &["csv", "--fields", "id,duration", "--from", "2024-01-01", "--to", "2024-01-01"],
    );
    assert!(output.status.success(), "tl csv failed: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "ID, DURATION\n\"devbox-1\", \"7200.0\"\n\"laptop-1\", \"75600.0\"\n"
    );
}

#[test]
fn test_csv_to_file_reports_written_rows() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    write_fixtures(temp.path());
    let dest = temp.path().join("out/report.csv");

    let output = tl(
        temp.path(),
        &config,
        &["csv", "--fields", "TIMESTAMP", "--output", dest.to_str().unwrap()],
    );
    assert!(output.status.success(), "tl csv failed: {}", stderr(&output));
    assert!(stderr(&output).contains("Wrote 3 entries (4 lines)"));
    assert_eq!(fs::read_to_string(&dest).unwrap().lines().count(), 4);
}

#[test]
fn test_empty_period_succeeds_with_header_only() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    write_fixtures(temp.path());
    let dest = temp.path().join("empty.csv");

    let output = tl(
        temp.path(),
        &config,
        &[
            "csv",
            "--fields",
            "TIMESTAMP,DURATION",
            "--from",
            "2023-06-01",
            "--to",
            "2023-06-30",
            "--output",
            dest.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "empty export should succeed");
    assert!(stderr(&output).contains("No entries matched"));
    assert_eq!(fs::read_to_string(&dest).unwrap(), "TIMESTAMP, DURATION");
}

#[test]
fn test_unwritable_destination_fails() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    write_fixtures(temp.path());
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let dest = blocker.join("report.csv");

    let output = tl(
        temp.path(),
        &config,
        &["csv", "--output", dest.to_str().unwrap()],
    );
    assert!(!output.status.success(), "writing below a file should fail");
    assert!(stderr(&output).contains("failed to export report"));
}

#[test]
fn test_export_into_log_dir_is_refused() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    write_fixtures(temp.path());
    let dest = temp.path().join("logs/all.org");

    let output = tl(
        temp.path(),
        &config,
        &["export", "--output", dest.to_str().unwrap()],
    );
    assert!(!output.status.success(), "exporting into the log dir should fail");
    assert!(stderr(&output).contains("read back as a source document"));
    assert!(!dest.exists());

    let output = tl(temp.path(), &config, &["csv", "--fields", "ID"]);
    assert!(output.status.success(), "tl csv failed: {}", stderr(&output));
    assert_eq!(stdout(&output).lines().count(), 4);
}

#[test]
fn test_export_produces_a_parseable_document() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    write_fixtures(temp.path());

    let output = tl(temp.path(), &config, &["export", "--period", "last-week"]);
    assert!(output.status.success(), "tl export failed: {}", stderr(&output));

    let output = tl(temp.path(), &config, &["export"]);
    assert!(output.status.success(), "tl export failed: {}", stderr(&output));
    let document = stdout(&output);
    assert_eq!(document.matches(":PROPERTIES:").count(), 3);
    assert!(document.contains(":TIMELOG-ID: laptop-1\n"));
    assert!(document.contains(":TIMELOG-DURATION: 75600.0\n"));

    // The consolidated document reads back as the same timeline.
    let merged = temp.path().join("merged");
    fs::create_dir_all(&merged).unwrap();
    fs::write(merged.join("all.org"), &document).unwrap();
    let merged_config = temp.path().join("merged.toml");
    fs::write(
        &merged_config,
        format!("log_dir = \"{}\"\n", merged.display()),
    )
    .unwrap();

    let original = tl(temp.path(), &config, &["csv", "--fields", "ID,DURATION"]);
    let reread = tl(temp.path(), &merged_config, &["csv", "--fields", "ID,DURATION"]);
    assert_eq!(stdout(&original), stdout(&reread));
}

#[test]
fn test_summary_groups_by_tag() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    write_fixtures(temp.path());

    let output = tl(temp.path(), &config, &["summary", "--group-by", "tag", "--json"]);
    assert!(output.status.success(), "tl summary failed: {}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["groups"][0]["name"], "work");
    assert_eq!(value["groups"][0]["seconds"], 7200.0);
    assert_eq!(value["groups"][1]["name"], "dev");
    assert_eq!(value["groups"][1]["seconds"], 75600.0);
}

#[test]
fn test_invalid_period_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());

    let output = tl(
        temp.path(),
        &config,
        &["csv", "--from", "2024-02-01", "--to", "2024-01-01"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("after period end"));
}

#[test]
fn test_status_lists_documents() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    write_fixtures(temp.path());

    let output = tl(temp.path(), &config, &["status"]);
    assert!(output.status.success(), "tl status failed: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("- devbox.org\n- laptop.org\n"));
    assert!(text.contains("Entries: 3\n"));
    assert!(text.contains("Current: Review"));
}
