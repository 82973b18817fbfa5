use assert_cmd::Command;
use predicates::str::{contains, diff};

fn lmc() -> Command {
    Command::cargo_bin("lmc").unwrap()
}

#[test]
fn runs_without_arguments() {
    lmc().assert().success();
}

#[test]
fn runs_sum() {
    lmc()
        .args(["run", "tests/files/sum.lmc", "--minimal"])
        .assert()
        .success()
        .stdout(diff("11\n"));
}

#[test]
fn path_shorthand_runs() {
    lmc()
        .arg("tests/files/sum.lmc")
        .assert()
        .success()
        .stdout(contains("11"))
        .stderr(contains("Halted"));
}

#[test]
fn calls_and_returns_through_the_stack() {
    lmc()
        .args(["run", "tests/files/call.lmc", "--minimal"])
        .assert()
        .success()
        .stdout(diff("11\n"));
}

#[test]
fn reads_input_from_the_back() {
    lmc()
        .args(["run", "tests/files/echo.lmc", "--minimal", "--input", "10,-2"])
        .assert()
        .success()
        .stdout(diff("-2\n10\n"));
}

#[test]
fn prints_characters() {
    lmc()
        .args(["run", "tests/files/hello.lmc", "--minimal"])
        .assert()
        .success()
        .stdout(diff("Hi\n"));
}

#[test]
fn reads_source_from_stdin() {
    lmc()
        .args(["run", "-", "--minimal"])
        .write_stdin("LDA x\nPSH\nPOP\nOUT\nHLT\nx DAT 42\n")
        .assert()
        .success()
        .stdout(diff("42\n"));
}

#[test]
fn traces_steps() {
    lmc()
        .args(["run", "tests/files/sum.lmc", "--minimal", "--trace"])
        .assert()
        .success()
        .stderr(contains("LDA 4"))
        .stderr(contains("ADD 5"));
}

#[test]
fn reports_duplicate_label() {
    lmc()
        .args(["check", "tests/files/duplicate.lmc"])
        .assert()
        .failure()
        .stderr(contains("Multiple definitions of label `x`, latest at 2"));
}

#[test]
fn reports_unresolved_symbol() {
    lmc()
        .args(["run", "tests/files/unresolved.lmc", "--minimal"])
        .assert()
        .failure()
        .stderr(contains("Undefined symbol: `missing`"));
}

#[test]
fn reports_stack_underflow() {
    lmc()
        .args(["run", "tests/files/underflow.lmc", "--minimal"])
        .assert()
        .failure()
        .stderr(contains("Popped from an empty stack"));
}

#[test]
fn step_limit_stops_endless_loops() {
    lmc()
        .args(["run", "tests/files/forever.lmc", "--minimal", "--max-steps", "1000"])
        .assert()
        .failure()
        .stderr(contains("did not halt within 1000 steps"));
}

#[test]
fn check_accepts_valid_source() {
    lmc()
        .args(["check", "tests/files/call.lmc"])
        .assert()
        .success()
        .stderr(contains("no errors found!"));
}

#[test]
fn dumps_listing() {
    lmc()
        .args(["dump", "tests/files/sum.lmc"])
        .assert()
        .success()
        .stdout(contains("5004"))
        .stdout(contains("LDA 4"))
        .stdout(contains("DAT 5"))
        .stdout(contains("Symbols"))
        .stdout(contains("y                   5"));
}

#[test]
fn compiled_image_runs() {
    let dest = std::path::Path::new(env!("CARGO_TARGET_TMPDIR")).join("call.lmo");
    lmc()
        .args(["compile", "tests/files/call.lmc"])
        .arg(&dest)
        .assert()
        .success();

    let image = std::fs::read(&dest).unwrap();
    assert_eq!(image.len(), 40 * 8);

    lmc()
        .arg("run")
        .arg(&dest)
        .arg("--minimal")
        .assert()
        .success()
        .stdout(diff("11\n"));
}
