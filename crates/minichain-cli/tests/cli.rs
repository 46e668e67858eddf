use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    Command::cargo_bin("minichain-cli").expect("binary should be built")
}

#[test]
fn demo_reports_tampering() {
    cli()
        .args(["--difficulty", "1", "demo", "--blocks", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mined block #3"))
        .stdout(predicate::str::contains("The blockchain is valid."))
        .stdout(predicate::str::contains("Blockchain integrity has been broken!"))
        .stdout(predicate::str::contains("block 1: hash mismatch"));
}

#[test]
fn menu_session_over_stdin() {
    cli()
        .args(["--difficulty", "1"])
        .write_stdin("1\nalice\nbob\n3\n3\n5\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Blockchain initialized with Genesis Block (difficulty=1)",
        ))
        .stdout(predicate::str::contains("Mined block #1"))
        .stdout(predicate::str::contains("The blockchain is valid."))
        .stdout(predicate::str::contains("Exiting..."));
}

#[test]
fn menu_exits_on_closed_stdin() {
    cli()
        .args(["--difficulty", "0"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exiting..."));
}

#[test]
fn attempt_budget_is_reported() {
    cli()
        .args(["--genesis-difficulty", "0", "--difficulty", "8", "--max-attempts", "1"])
        .args(["demo", "--blocks", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mining failed: no nonce meeting difficulty 8"))
        .stdout(predicate::str::contains("The blockchain is valid."));
}

#[test]
fn rejects_unsatisfiable_difficulty() {
    cli().args(["--difficulty", "65"]).assert().failure();
}
