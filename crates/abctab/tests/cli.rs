//! End-to-end tests for the abctab binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SCALE: &str = "X:1\nT:D Major Scale\nL:1/4\nK:D\nD E F G | A B c d |]\n";

/// abctab run from an empty directory with no user config or env overrides
fn abctab(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("abctab").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("RUST_LOG")
        .env_remove("ABCTAB_INSTRUMENT")
        .env_remove("ABCTAB_WHISTLE_KEY")
        .env_remove("ABCTAB_AUTO_WHISTLE_KEY")
        .env_remove("ABCTAB_SKIP_REPEATED")
        .env_remove("ABCTAB_BAR_ACCIDENTALS")
        .env_remove("ABCTAB_LOG_LEVEL");
    cmd
}

fn write_tune(dir: &TempDir, name: &str, abc: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, abc).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn notes_from_stdin() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["notes", "-"])
        .write_stdin("K:D\nF =F F|F\n")
        .assert()
        .success()
        .stdout("^F =F =F | ^F\n");
}

#[test]
fn notes_as_json() {
    let dir = TempDir::new().unwrap();
    let tune = write_tune(&dir, "scale.abc", SCALE);
    abctab(&dir)
        .args(["notes", &tune, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"barline\""))
        .stdout(predicate::str::contains("\"token\": \"^c\""));
}

#[test]
fn notes_report_unknown_key() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["notes", "-"])
        .write_stdin("K:HP\nA B\n")
        .assert()
        .success()
        .stdout("A B\n")
        .stderr(predicate::str::contains("warning"));
}

#[test]
fn transpose_up() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["transpose", "-", "2"])
        .write_stdin("K:D\nD E F G |\n")
        .assert()
        .success()
        .stdout("K:E\nE F G A |\n");
}

#[test]
fn transpose_down() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["transpose", "-", "-2"])
        .write_stdin("K:D\nD")
        .assert()
        .success()
        .stdout("K:C\nC\n");
}

#[test]
fn transpose_key_only() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["transpose", "-", "2", "--key-only"])
        .write_stdin("K:C\n^D E\n")
        .assert()
        .success()
        .stdout("K:D\n=F F\n");
}

#[test]
fn tab_fiddle() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["tab", "-", "--instrument", "fiddle"])
        .write_stdin("K:D\nDEF|A\n")
        .assert()
        .success()
        .stdout("D  E  F# | A\nD0 D1 D2 | A0\n");
}

#[test]
fn tab_whistle_uses_recommended_key() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["tab", "-", "--json"])
        .write_stdin("K:G\nG\n")
        .assert()
        .success()
        // Bottom note of a G whistle
        .stdout(predicate::str::contains("\"closed\"").count(6));
}

#[test]
fn finger_whistle() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["finger", "^c", "--key", "D"])
        .assert()
        .success()
        .stdout("C#5 on D whistle: ○○○○○○\n");
}

#[test]
fn finger_fiddle() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["finger", "D", "-i", "fiddle"])
        .assert()
        .success()
        .stdout("D4 on fiddle: D0\n");
}

#[test]
fn finger_rejects_non_note() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["finger", "H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a pitched ABC note"));
}

#[test]
fn recommend_whistle() {
    let dir = TempDir::new().unwrap();
    let tune = write_tune(&dir, "tune.abc", "X:1\nK:Bm\nB\n");
    abctab(&dir).args(["recommend", &tune]).assert().success().stdout("A\n");
}

#[test]
fn recommend_without_key_fails() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["recommend", "-"])
        .write_stdin("X:1\nT:Nothing\n")
        .assert()
        .failure();
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["notes", "no-such-tune.abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn config_file_and_env() {
    let dir = TempDir::new().unwrap();
    let config = write_tune(&dir, "custom.toml", "[tablature]\ninstrument = \"fiddle\"\n");
    abctab(&dir)
        .args(["--config", &config, "config"])
        .env("ABCTAB_SKIP_REPEATED", "true")
        .assert()
        .success()
        .stdout(predicate::str::contains("instrument = \"fiddle\""))
        .stdout(predicate::str::contains("skip_repeated = true"))
        .stdout(predicate::str::contains("custom.toml"))
        .stdout(predicate::str::contains("ABCTAB_SKIP_REPEATED"));
}

#[test]
fn local_config_is_read() {
    let dir = TempDir::new().unwrap();
    write_tune(&dir, "abctab.toml", "[tablature]\ninstrument = \"fiddle\"\n");
    abctab(&dir)
        .args(["tab", "-"])
        .write_stdin("K:D\nD\n")
        .assert()
        .success()
        .stdout("D\nD0\n");
}

#[test]
fn bad_env_value_fails() {
    let dir = TempDir::new().unwrap();
    abctab(&dir)
        .args(["config"])
        .env("ABCTAB_WHISTLE_KEY", "E")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ABCTAB_WHISTLE_KEY"));
}
