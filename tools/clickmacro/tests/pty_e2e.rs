#![cfg(unix)]

use expectrl::{Eof, Expect};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

fn headless_command(dir: &TempDir) -> Command {
    let bin = std::path::PathBuf::from(env!("CARGO_BIN_EXE_clickmacro"));
    let mut cmd = Command::new(bin);
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(format!(
            "{}/tests/fixtures/configs/headless.toml",
            env!("CARGO_MANIFEST_DIR")
        ));
    cmd
}

#[test]
fn pty_e2e_dry_run_then_record_persists_cursor() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("recorded_data.txt"), "1\r\n7 9\r\n").expect("seed data");

    let mut session = expectrl::Session::spawn(headless_command(&dir)).expect("spawn pty");
    session.set_expect_timeout(Some(Duration::from_secs(8)));

    session.expect("Pos(7, 9)").expect("startup load");
    session.expect("4. Saving Data & Exit").expect("menu");

    session.send("2").expect("send 2");
    session.expect("Move(7, 9)").expect("dry run");
    session.expect("Press any key").expect("continue prompt");
    session.send(" ").expect("send space");

    session.send("1").expect("send 1");
    session.expect("press 'q'").expect("record instructions");
    session.send("a").expect("send a");
    session.expect("Click(7, 9)").expect("captured virtual cursor");
    session.send("0").expect("send 0 while recording");
    session.expect("Click(7, 9)").expect("digit captured as a point");
    session.send("q").expect("send q");

    session.expect("4. Saving Data & Exit").expect("menu again");
    session.send("4").expect("send 4");
    session.expect(Eof).expect("session exited");

    assert_eq!(
        std::fs::read_to_string(dir.path().join("recorded_data.txt")).expect("read data"),
        "2\r\n7 9\r\n7 9\r\n"
    );
    let log = std::fs::read_to_string(dir.path().join(".cache/clickmacro/run.jsonl"))
        .expect("read run log");
    assert!(log.contains("\"event_type\":\"session.started\""));
    assert!(log.contains("\"event_type\":\"sequence.saved\""));
}

#[test]
fn pty_e2e_missing_file_then_exit_writes_empty_sequence() {
    let dir = TempDir::new().expect("tempdir");

    let mut session = expectrl::Session::spawn(headless_command(&dir)).expect("spawn pty");
    session.set_expect_timeout(Some(Duration::from_secs(8)));

    session
        .expect("No Recorded File Exists")
        .expect("missing file notice");
    session.send("x").expect("send ignored key");
    session.expect("0. Run").expect("menu redisplayed");
    session.send("4").expect("send 4");
    session.expect(Eof).expect("session exited");

    assert_eq!(
        std::fs::read_to_string(dir.path().join("recorded_data.txt")).expect("read data"),
        "0\r\n"
    );
}
