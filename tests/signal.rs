use assert_cmd::prelude::*;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(unix)]
#[test]
fn sigint_flushes_buffered_output_and_exits_130() {
    // Prints 'A', then spins forever on a non-zero cell.
    let mut child = Command::cargo_bin("bfvm")
        .unwrap()
        .args(["run", "++++++++[>++++++++<-]>+.+[]"])
        .env("XDG_CONFIG_HOME", Path::new(env!("CARGO_TARGET_TMPDIR")).join("no-config"))
        .env_remove("BFVM_MAX_STEPS")
        .env_remove("BFVM_CELL")
        .env_remove("BFVM_OUTPUT")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_secs(1));
    let sent = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(sent.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("bfvm kept running after SIGINT");
        }
        thread::sleep(Duration::from_millis(20));
    };

    let mut out = Vec::new();
    child.stdout.take().unwrap().read_to_end(&mut out).unwrap();
    assert_eq!(status.code(), Some(130));
    assert_eq!(out, b"A");
}
