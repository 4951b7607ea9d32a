//! End-to-end tests driving the `checkmate` binary against a temporary database.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn checkmate_binary() -> &'static str {
    env!("CARGO_BIN_EXE_checkmate")
}

/// A temporary home with a config file pointing at its own database.
struct Env {
    temp: TempDir,
    config: PathBuf,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        let db = temp.path().join("data").join("checkmate.db");
        std::fs::write(
            &config,
            format!("database_path = {:?}\n", db.to_string_lossy()),
        )
        .unwrap();
        Self { temp, config }
    }

    fn path(&self) -> &Path {
        self.temp.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(checkmate_binary())
            .env("HOME", self.path())
            .env_remove("RUST_LOG")
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("XDG_DATA_HOME")
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .output()
            .expect("failed to run checkmate")
    }

    /// Runs a command that must succeed, returning (stdout, stderr).
    fn ok(&self, args: &[&str]) -> (String, String) {
        let output = self.run(args);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        assert!(
            output.status.success(),
            "checkmate {args:?} should succeed: {stderr}"
        );
        (stdout, stderr)
    }

    /// Runs a command that must fail, returning its stderr.
    fn fails(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "checkmate {args:?} should fail"
        );
        String::from_utf8_lossy(&output.stderr).into_owned()
    }
}

#[test]
fn test_check_out_and_in_flow() {
    let env = Env::new();

    let (stdout, stderr) = env.ok(&["out", "Alice", "Library"]);
    assert!(stdout.is_empty());
    assert!(
        stderr.contains("Check-out Successful: Alice checked out to Library at"),
        "unexpected stderr: {stderr}"
    );

    let stderr = env.fails(&["out", "Alice", "Gym"]);
    assert!(stderr.contains("already checked out"), "unexpected stderr: {stderr}");

    let (stdout, _) = env.ok(&["status"]);
    assert!(stdout.starts_with("STUDENT"));
    assert!(stdout.contains("Alice"));
    assert!(stdout.contains("Library"));

    let (_, stderr) = env.ok(&["in", "Alice"]);
    assert!(stderr.contains("Check-in Successful: Alice checked in at"));

    let stderr = env.fails(&["in", "Alice"]);
    assert_eq!(
        stderr.trim(),
        "error: Error: No active check-out found for this student."
    );

    let (stdout, _) = env.ok(&["status"]);
    assert_eq!(stdout.trim(), "No students are checked out.");

    let (stdout, _) = env.ok(&["log", "--json"]);
    let records: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["subject"], "Alice");
    assert!(records[0]["checkInInstant"].is_string());
    assert!(records[0]["durationMinutes"].is_i64());
}

#[test]
fn test_save_clear_load_flow() {
    let env = Env::new();
    env.ok(&["out", "Bob", "Gym"]);

    let (_, stderr) = env.ok(&["save", "period-1"]);
    assert!(stderr.contains("Save Successful: Activity log saved as period-1."));

    env.ok(&["clear"]);
    let (stdout, _) = env.ok(&["log"]);
    assert_eq!(stdout.trim(), "The activity log is empty.");

    let (stdout, _) = env.ok(&["saved"]);
    assert_eq!(stdout.trim(), "period-1");

    let (_, stderr) = env.ok(&["load", "period-1"]);
    assert!(stderr.contains("Load Successful: Activity log \"period-1\" loaded."));
    let (stdout, _) = env.ok(&["status"]);
    assert!(stdout.contains("Bob"));

    let (_, stderr) = env.ok(&["load", "period-1", "--merge"]);
    assert!(stderr.contains("0 record(s) from \"period-1\" merged."));

    let stderr = env.fails(&["load", "missing"]);
    assert!(stderr.contains("Could not load the selected log \"missing\"."));

    let blocked = env.path().join("blocked");
    std::fs::write(&blocked, "").unwrap();
    let target = blocked.join("log.csv");
    let stderr = env.fails(&["export", "--output", target.to_str().unwrap()]);
    assert!(stderr.contains("File Write Error: Could not write the export file."));
    assert!(!stderr.contains("Export Successful"));

    let (stdout, _) = env.ok(&["export"]);
    assert!(stdout.starts_with("Student,Type,Location,Time\nBob,check-out,Gym,"));
}

#[test]
fn test_roster_import_and_clear() {
    let env = Env::new();

    let (stdout, _) = env.ok(&["roster", "list"]);
    assert_eq!(stdout.lines().count(), 12);
    assert_eq!(stdout.lines().next(), Some("Alice"));

    let csv = env.path().join("class.csv");
    std::fs::write(&csv, "Student\r\nMina\r\nOmar\r\n").unwrap();
    let (_, stderr) = env.ok(&["roster", "import", csv.to_str().unwrap()]);
    assert!(stderr.contains("Import Successful: 2 student(s) imported successfully."));

    let (stdout, _) = env.ok(&["roster", "list"]);
    assert_eq!(stdout, "Mina\nOmar\n");

    let txt = env.path().join("class.txt");
    std::fs::write(&txt, "Student\nMina\n").unwrap();
    let stderr = env.fails(&["roster", "import", txt.to_str().unwrap()]);
    assert!(stderr.contains("Please upload a .csv file."));

    env.ok(&["roster", "clear"]);
    let (stdout, _) = env.ok(&["roster", "list"]);
    assert_eq!(stdout.lines().count(), 12);
}

#[test]
fn test_destinations_come_from_config() {
    let env = Env::new();
    let (stdout, _) = env.ok(&["destinations"]);
    assert_eq!(stdout.lines().next(), Some("Library"));

    let custom = env.path().join("custom.toml");
    std::fs::write(
        &custom,
        format!(
            "database_path = {:?}\ndestinations = [\"Nurse\"]\n",
            env.path().join("other.db").to_string_lossy()
        ),
    )
    .unwrap();
    let output = Command::new(checkmate_binary())
        .env("HOME", env.path())
        .env_remove("XDG_CONFIG_HOME")
        .arg("--config")
        .arg(&custom)
        .arg("destinations")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Nurse\n");
}
