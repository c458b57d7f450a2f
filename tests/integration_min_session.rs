// Drives the compiled binary through a pseudo terminal.
//
// - Requires a TTY; expectrl allocates one.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("typerate");
    let cmd = format!("env HOME={} {} -p hi", home.path().display(), bin.display());

    let mut p = spawn(cmd)?;

    // let the app enter the alternate screen
    std::thread::sleep(Duration::from_millis(200));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // ctrl+c quits from any screen
    p.send("\x03")?;

    p.expect(Eof)?;

    // the finished session was persisted
    assert!(home.path().join(".local/state/typerate/records.db").exists());
    Ok(())
}
