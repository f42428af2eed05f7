use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
        }
    }

    fn tally(&self) -> Command {
        let mut cmd = Command::cargo_bin("tally").unwrap();
        cmd.env("HOME", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("TALLY_LOG");
        cmd
    }

    fn data_dir(&self) -> std::path::PathBuf {
        self.home.path().join("books")
    }

    fn init(&self) {
        let dir = self.data_dir();
        self.tally()
            .args(["init", "--data-dir", dir.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized tally"));
    }

    /// Adds an expense and returns the short id printed back.
    fn add(&self, args: &[&str]) -> String {
        let out = self.tally().arg("add").args(args).output().unwrap();
        assert!(out.status.success(), "add failed: {out:?}");
        let stdout = String::from_utf8(out.stdout).unwrap();
        stdout
            .strip_prefix("Added ")
            .and_then(|rest| rest.split(':').next())
            .unwrap()
            .to_string()
    }
}

#[test]
fn commands_without_init_point_at_init() {
    let sb = Sandbox::new();
    sb.tally()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tally init"));
}

#[test]
fn add_then_list() {
    let sb = Sandbox::new();
    sb.init();
    sb.add(&["12.5", "--category", "food", "--note", "lunch", "--date", "2024-03-01"]);
    sb.add(&["30", "--category", "Transport", "--note", "taxi", "--date", "2024-03-05"]);

    sb.tally()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("lunch"))
        .stdout(predicate::str::contains("taxi"))
        .stdout(predicate::str::contains("2 expenses, total $42.50"));

    sb.tally()
        .args(["list", "--min", "20", "--max", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("taxi"))
        .stdout(predicate::str::contains("lunch").not());
}

#[test]
fn list_on_empty_store() {
    let sb = Sandbox::new();
    sb.init();
    sb.tally()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses yet"));
}

#[test]
fn add_rejects_invalid_input() {
    let sb = Sandbox::new();
    sb.init();
    sb.tally().args(["add", "0"]).assert().failure();
    sb.tally().args(["add", "5", "--category", "rent"]).assert().failure();
    let long_note = "x".repeat(81);
    sb.tally()
        .args(["add", "5", "--note", long_note.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("80"));
}

#[test]
fn summary_for_a_month() {
    let sb = Sandbox::new();
    sb.init();
    sb.add(&["10", "--category", "food", "--date", "2024-02-10"]);
    sb.add(&["30", "--category", "shopping", "--date", "2024-02-20"]);
    sb.add(&["99", "--category", "food", "--date", "2024-03-01"]);

    sb.tally()
        .args(["summary", "--month", "2024-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$40.00"))
        .stdout(predicate::str::contains("2 expenses"))
        .stdout(predicate::str::contains("75.0%"))
        .stdout(predicate::str::contains("2/29"));

    sb.tally()
        .args(["summary", "--month", "2024-13"])
        .assert()
        .failure();
}

#[test]
fn export_writes_header_and_rows() {
    let sb = Sandbox::new();
    sb.init();
    sb.add(&["12.5", "--note", "tea, \"oolong\"", "--date", "2024-03-01"]);
    sb.add(&["7", "--category", "transport", "--date", "2024-03-02"]);

    let path = sb.home.path().join("out.csv");
    sb.tally()
        .args(["export", "--output", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 expenses"));

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("ID,Amount,Category,Note,Date"));
    assert_eq!(lines.count(), 2);
    assert!(content.contains("\"tea, \"\"oolong\"\"\""));
}

#[test]
fn export_defaults_into_data_dir() {
    let sb = Sandbox::new();
    sb.init();
    sb.add(&["5"]);
    sb.tally().arg("export").assert().success();

    let exports: Vec<_> = std::fs::read_dir(sb.data_dir().join("exports"))
        .unwrap()
        .collect();
    assert_eq!(exports.len(), 1);
}

#[test]
fn edit_and_delete() {
    let sb = Sandbox::new();
    sb.init();
    let id = sb.add(&["12", "--note", "coffee", "--date", "2024-03-01"]);

    sb.tally()
        .args(["edit", id.as_str(), "--amount", "15.5", "--note", "better coffee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    sb.tally()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("better coffee"))
        .stdout(predicate::str::contains("$15.50"));

    sb.tally()
        .args(["delete", "zzzzzzzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));

    sb.tally()
        .args(["delete", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    sb.tally()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses yet"));
}

#[test]
fn demo_seeds_once() {
    let sb = Sandbox::new();
    sb.init();
    sb.tally()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("sample expenses"));
    sb.tally()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data not loaded"));
}

#[test]
fn status_and_categories() {
    let sb = Sandbox::new();
    sb.tally()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database not found"));

    sb.init();
    sb.add(&["3"]);
    sb.tally()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Expenses:   1"));

    sb.tally()
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("Entertainment"));
}

#[test]
fn add_rejects_amounts_over_the_limit() {
    let sb = Sandbox::new();
    sb.init();
    sb.tally()
        .args(["add", "60000000000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("limit"));
    sb.tally().args(["add", "1000000000"]).assert().success();
    sb.tally()
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("$1,000,000,000.00"));
}
