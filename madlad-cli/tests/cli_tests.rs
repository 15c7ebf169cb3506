use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const EXAMPLE: &str = "define x := construct_empty()\n\
                       y := reduce(wrap(x))\n\
                       assert dual(dual(y)) == y, \"duality holds\"\n";

fn workspace(source: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.mad"), source).unwrap();
    dir
}

fn madlad(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("madlad").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn test_catalog_lists_every_operator() {
    let dir = tempfile::tempdir().unwrap();
    let output = madlad(&dir).arg("catalog").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 41);
    assert!(stdout.contains("construct_empty"));
    assert!(stdout.contains("reduction"));
}

#[test]
fn test_run_prints_output_and_digest() {
    let dir = workspace(EXAMPLE);
    madlad(&dir)
        .args(["run", "main.mad"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output: wrap(empty)"))
        .stdout(predicate::str::contains("digest: sha256:"))
        .stdout(predicate::str::contains("steps: 3"));
}

#[test]
fn test_modes_print_the_same_digest() {
    let dir = workspace(EXAMPLE);
    let compiled = madlad(&dir).args(["run", "main.mad"]).output().unwrap();
    let interpreted = madlad(&dir)
        .args(["run", "main.mad", "--mode", "interpreted"])
        .output()
        .unwrap();
    assert!(compiled.status.success() && interpreted.status.success());
    assert_eq!(compiled.stdout, interpreted.stdout);
}

#[test]
fn test_certificate_written_and_verified() {
    let dir = workspace(EXAMPLE);
    madlad(&dir)
        .args(["run", "main.mad", "--certificate", "run.cert"])
        .assert()
        .success();
    let text = fs::read_to_string(dir.path().join("run.cert")).unwrap();
    assert_eq!(text.lines().count(), 5);

    madlad(&dir)
        .args(["verify", "run.cert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verified 3 step(s), complete"));
}

#[test]
fn test_tampered_certificate_fails_verification() {
    let dir = workspace(EXAMPLE);
    madlad(&dir)
        .args(["run", "main.mad", "--certificate", "run.cert"])
        .assert()
        .success();
    let path = dir.path().join("run.cert");
    let text = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<&str> = text.lines().collect();
    lines.remove(2);
    fs::write(&path, lines.join("\n")).unwrap();

    madlad(&dir)
        .args(["verify", "run.cert"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("certificate"));
}

#[test]
fn test_failed_run_writes_partial_certificate() {
    let dir = workspace("x := wrap(empty)\nassert false, \"stop\"\n");
    madlad(&dir)
        .args(["run", "main.mad", "--certificate", "run.cert"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("AssertionFailed"));

    madlad(&dir)
        .args(["verify", "run.cert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verified 1 step(s), partial"));
}

#[test]
fn test_syntax_error_shows_source_context() {
    let dir = workspace("x := 1\ny := @\n");
    madlad(&dir)
        .args(["run", "main.mad"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("parser error"))
        .stderr(predicate::str::contains("2 | y := @"))
        .stderr(predicate::str::contains("^"));
}

#[test]
fn test_check_prints_bytecode_json() {
    let dir = workspace(EXAMPLE);
    let output = madlad(&dir).args(["check", "main.mad"]).output().unwrap();
    assert!(output.status.success());
    let program: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(program["catalog_version"], 1);
    assert!(program["code"].as_array().unwrap().len() > 3);
}

#[test]
fn test_initial_flag_and_step_budget() {
    let dir = workspace("wrap()\nwrap()\nwrap()\n");
    madlad(&dir)
        .args(["run", "main.mad", "--initial", r#"{"scalar":{"int":7}}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("output: wrap(wrap(wrap(7)))"));

    madlad(&dir)
        .args(["run", "main.mad", "--max-steps", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("BudgetExhausted"));
}

#[test]
fn test_project_file_sets_defaults() {
    let dir = workspace("wrap()\n");
    fs::write(
        dir.path().join("madlad.json"),
        r#"{"mode": "interpreted", "initial": {"seq": []}}"#,
    )
    .unwrap();
    madlad(&dir)
        .args(["run", "main.mad"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output: wrap([])"));

    madlad(&dir)
        .args(["--config", "missing.json", "run", "main.mad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_missing_program_file() {
    let dir = tempfile::tempdir().unwrap();
    madlad(&dir)
        .args(["run", "nope.mad"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.mad"));
}

#[test]
fn test_print_and_for_on_both_paths() {
    let dir = workspace("for i := 0; i < 2; i := i + 1 { wrap() print i }\nprint state\n");
    for mode in ["compiled", "interpreted"] {
        madlad(&dir)
            .args(["run", "main.mad", "--mode", mode])
            .assert()
            .success()
            .stdout(predicate::str::contains("print: 0\nprint: 1\nprint: wrap(wrap(empty))\n"))
            .stdout(predicate::str::contains("steps: 2"));
    }
}

#[test]
fn test_runaway_depth_is_a_clean_error() {
    let dir = workspace("define x := empty\nconverge x with wrap limit 100000\ndepth(x)\n");
    for mode in ["compiled", "interpreted"] {
        madlad(&dir)
            .args(["run", "main.mad", "--mode", mode])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("LimitExceeded"));
    }
}
