use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use std::io::Write;
use std::time::Duration;

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

fn hello_world_bf() -> &'static str {
    "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>."
}

fn program_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn plus_plus_dot_prints_a_single_byte_two() {
    cargo_bin()
        .arg("run").arg("++.")
        .assert()
        .success()
        .stdout(predicate::eq(&[2u8][..]))
        .stderr(predicate::str::is_empty());
}

#[test]
fn clear_loop_terminates() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg("+[-].")
        .assert()
        .success()
        .stdout(predicate::eq(&[0u8][..]));
}

#[test]
fn empty_loop_on_zero_cell_is_skipped() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg("[]")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn runs_program_from_file_with_comments() {
    let tf = program_file(&format!("print hello world\n{}\n", hello_world_bf()));
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn runs_program_from_stdin_with_dash() {
    cargo_bin()
        .arg("run").arg("--file").arg("-")
        .write_stdin(hello_world_bf())
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn positional_parts_are_concatenated() {
    cargo_bin()
        .args(["run", "++++++++[>++++++++<-]", ">+."])
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn reads_from_stdin_and_echoes_bytes() {
    cargo_bin()
        .arg("run").arg(",[.,]")
        .write_stdin("Zebra")
        .assert()
        .success()
        .stdout("Zebra");
}

#[test]
fn eof_unchanged_keeps_cell() {
    let code = "+".repeat(65) + ",.";
    cargo_bin()
        .args(["run", "--eof", "unchanged", code.as_str()])
        .write_stdin("")
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn cursor_wraps_left_of_cell_zero() {
    // Move left from cell 0 onto the last cell, set it, then come back round.
    let code = format!("<{}>.<.", "+".repeat(65));
    cargo_bin()
        .args(["run", "--tape-len", "3", code.as_str()])
        .assert()
        .success()
        .stdout(predicate::eq(&[0u8, 65u8][..]));
}

#[test]
fn wide_cells_print_numbers() {
    let code = "+".repeat(300) + ".";
    cargo_bin()
        .args(["run", "--cell", "u16", code.as_str()])
        .assert()
        .success()
        .stdout("300");
}

#[test]
fn signed_cells_print_negative_numbers() {
    cargo_bin()
        .args(["run", "--cell", "i32", "--", "--."])
        .assert()
        .success()
        .stdout("-2");
}

#[test]
fn debug_prints_step_table_to_stderr() {
    cargo_bin()
        .args(["run", "--debug", ">+."])
        .assert()
        .success()
        .stdout(predicate::eq(&[1u8][..]))
        .stderr(predicate::str::contains("STEP | IP")
            .and(predicate::str::contains("Moved pointer head to index 1")));
}

#[test]
fn verbose_logs_to_stderr_only() {
    cargo_bin()
        .args(["run", "-v", "+."])
        .assert()
        .success()
        .stdout(predicate::eq(&[1u8][..]))
        .stderr(predicate::str::contains("brackets resolved"));
}
