use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// The binary with no user config file and no `BFVM_*` or `RUST_LOG` overrides.
fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bfvm").unwrap();
    cmd.env("XDG_CONFIG_HOME", Path::new(env!("CARGO_TARGET_TMPDIR")).join("no-config"));
    for var in [
        "BFVM_TAPE_LEN",
        "BFVM_CELL",
        "BFVM_OVERFLOW",
        "BFVM_EOF",
        "BFVM_OUTPUT",
        "BFVM_MAX_STEPS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn balanced_program_checks_ok() {
    cargo_bin()
        .args(["check", "+[>[-]<]"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok: 8 instructions, 2 loops, max depth 2"));
}

#[test]
fn table_lists_jump_targets() {
    cargo_bin()
        .args(["check", "--table", "+[-]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OPEN  | CLOSE")
            .and(predicate::str::contains("1     | 3     | 4       | 2")));
}

#[test]
fn lone_close_fails_check() {
    cargo_bin()
        .args(["check", "]"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unmatched bracket ']' at instruction 0"));
}

#[test]
fn check_does_not_execute() {
    // Would block forever on input and loop forever if it ran.
    cargo_bin()
        .args(["check", "+[,]"])
        .timeout(std::time::Duration::from_secs(2))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 loops"));
}
