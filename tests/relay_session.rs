//! End-to-end relay sessions against real `/bin/sh` children.
//!
//! Each test drives [`pyrelay::run`] with in-memory duplex streams standing
//! in for the terminal, so both relay directions are observable byte for
//! byte: what the test writes to the input half reaches the child's stdin,
//! and everything the child prints comes back on the output half.

use std::time::Duration;

use pretty_assertions::assert_eq;
use pyrelay::{RelayConfig, RelayError, run};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::time::timeout;

/// Relay config that runs `script` under `sh -c`.
fn sh_config(script: &str) -> RelayConfig {
    let mut config = RelayConfig::new("sh", "-c");
    config.script_args = vec![script.to_string()];
    config
}

/// Read from `reader` until the collected output contains `marker`.
async fn read_until(reader: &mut DuplexStream, marker: &str) -> String {
    let mut collected = String::new();
    let mut chunk = [0u8; 256];
    while !collected.contains(marker) {
        let n = reader.read(&mut chunk).await.unwrap();
        assert!(n > 0, "output closed before {marker:?} appeared");
        collected.push_str(std::str::from_utf8(&chunk[..n]).unwrap());
    }
    collected
}

// =========================================================================
// Round trips through both directions
// =========================================================================

#[tokio::test]
async fn echo_child_round_trip() {
    let config = sh_config(r#"read line; echo "ECHO: $line""#);
    let (mut input_write, input_read) = tokio::io::duplex(4096);
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    input_write.write_all(b"hello\n").await.unwrap();
    drop(input_write);

    let collect = tokio::spawn(async move {
        let mut out = String::new();
        term_read.read_to_string(&mut out).await.unwrap();
        out
    });

    let status = timeout(
        Duration::from_secs(10),
        run(&config, input_read, term_write),
    )
    .await
    .unwrap()
    .unwrap();

    assert!(status.success());
    assert_eq!(collect.await.unwrap(), "ECHO: hello\n");
}

#[tokio::test]
async fn input_lines_delivered_in_order() {
    let config = sh_config(r#"read a; read b; read c; echo "$a-$b-$c""#);
    let (mut input_write, input_read) = tokio::io::duplex(4096);
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    input_write.write_all(b"one\ntwo\nthree\n").await.unwrap();
    drop(input_write);

    let collect = tokio::spawn(async move {
        let mut out = String::new();
        term_read.read_to_string(&mut out).await.unwrap();
        out
    });

    let status = timeout(
        Duration::from_secs(10),
        run(&config, input_read, term_write),
    )
    .await
    .unwrap()
    .unwrap();

    assert!(status.success());
    assert_eq!(collect.await.unwrap(), "one-two-three\n");
}

#[tokio::test]
async fn output_lines_relayed_in_order() {
    let config = sh_config(r#"for i in 1 2 3; do echo "line $i"; sleep 0.1; done"#);
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    let collect = tokio::spawn(async move {
        let mut out = String::new();
        term_read.read_to_string(&mut out).await.unwrap();
        out
    });

    let status = timeout(
        Duration::from_secs(10),
        run(&config, tokio::io::empty(), term_write),
    )
    .await
    .unwrap()
    .unwrap();

    assert!(status.success());
    assert_eq!(collect.await.unwrap(), "line 1\nline 2\nline 3\n");
}

#[tokio::test]
async fn stderr_merged_into_output() {
    let config = sh_config("echo out-first; echo on-stderr 1>&2; echo out-second");
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    let collect = tokio::spawn(async move {
        let mut out = String::new();
        term_read.read_to_string(&mut out).await.unwrap();
        out
    });

    let status = timeout(
        Duration::from_secs(10),
        run(&config, tokio::io::empty(), term_write),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(status.success());

    let out = collect.await.unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3, "unexpected output: {lines:?}");
    assert!(lines.contains(&"on-stderr"), "stderr line missing: {lines:?}");
    let first = lines.iter().position(|l| *l == "out-first").unwrap();
    let second = lines.iter().position(|l| *l == "out-second").unwrap();
    assert!(first < second, "stdout order lost: {lines:?}");
}

#[tokio::test]
async fn cwd_applies_to_child() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = sh_config("pwd");
    config.cwd = Some(dir.path().to_path_buf());
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    let collect = tokio::spawn(async move {
        let mut out = String::new();
        term_read.read_to_string(&mut out).await.unwrap();
        out
    });

    let status = timeout(
        Duration::from_secs(10),
        run(&config, tokio::io::empty(), term_write),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(status.success());

    let out = collect.await.unwrap();
    // pwd reports the physical path, so compare canonicalized
    assert_eq!(
        std::path::PathBuf::from(out.trim_end()),
        dir.path().canonicalize().unwrap()
    );
}

// =========================================================================
// Session lifetime
// =========================================================================

#[tokio::test]
async fn child_exit_ends_session_without_input() {
    let config = sh_config("echo ready; exit 7");
    // Input stays open and silent for the whole session.
    let (input_write, input_read) = tokio::io::duplex(64);
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    let collect = tokio::spawn(async move {
        let mut out = String::new();
        term_read.read_to_string(&mut out).await.unwrap();
        out
    });

    let status = timeout(
        Duration::from_secs(10),
        run(&config, input_read, term_write),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(status.code(), Some(7));

    // Only now unpark the input side; the session already ended above.
    drop(input_write);
    assert_eq!(collect.await.unwrap(), "ready\n");
}

#[tokio::test]
async fn input_eof_keeps_session_running() {
    // This child exits as soon as its stdin reaches end of file, so the
    // session outliving the closed input proves the child's stdin stayed
    // open.
    let config = sh_config(r#"while read line; do echo "got:$line"; done"#);
    let (mut input_write, input_read) = tokio::io::duplex(4096);
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    let relay = tokio::spawn(async move { run(&config, input_read, term_write).await });

    input_write.write_all(b"a\n").await.unwrap();
    read_until(&mut term_read, "got:a\n").await;

    drop(input_write);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(
        !relay.is_finished(),
        "session ended when terminal input closed"
    );

    relay.abort();
    relay.await.ok();
}

#[tokio::test]
async fn blocked_write_does_not_stall_shutdown() {
    // Child that never reads its stdin and closes both output pipes while
    // staying alive: the input direction ends up blocked mid-write on a
    // full stdin pipe right when the merged output stream ends. Shutdown
    // must still terminate the child and return.
    let config = sh_config("sleep 1; exec 1>&- 2>&-; exec sleep 600");
    let (mut input_write, input_read) = tokio::io::duplex(512 * 1024);
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    // Enough pending lines to fill the OS pipe buffer behind the child.
    let line = format!("{}\n", "x".repeat(255));
    let mut pending = String::with_capacity(1024 * line.len());
    for _ in 0..1024 {
        pending.push_str(&line);
    }
    input_write.write_all(pending.as_bytes()).await.unwrap();

    let collect = tokio::spawn(async move {
        let mut out = String::new();
        term_read.read_to_string(&mut out).await.unwrap();
        out
    });

    let status = timeout(
        Duration::from_secs(8),
        run(&config, input_read, term_write),
    )
    .await
    .expect("shutdown stalled behind the blocked stdin write")
    .unwrap();
    assert!(!status.success(), "child should have been killed");

    drop(input_write);
    let out = collect.await.unwrap();
    assert_eq!(out.lines().last(), Some("Python program terminated."));
}

// =========================================================================
// Failure paths
// =========================================================================

#[tokio::test]
async fn write_failure_reports_and_terminates() {
    // The child closes its stdin before announcing itself, so the first
    // relayed input line hits a dead pipe.
    let config = sh_config("exec 0<&-; echo started; sleep 5");
    let (mut input_write, input_read) = tokio::io::duplex(4096);
    let (mut term_read, term_write) = tokio::io::duplex(4096);

    let relay = tokio::spawn(async move { run(&config, input_read, term_write).await });

    let head = read_until(&mut term_read, "started\n").await;
    input_write.write_all(b"hello\n").await.unwrap();
    input_write.flush().await.unwrap();

    let joined = timeout(Duration::from_secs(10), relay).await.unwrap();
    let status = joined.unwrap().unwrap();
    assert!(!status.success(), "child should have been killed");

    drop(input_write);
    let mut rest = String::new();
    term_read.read_to_string(&mut rest).await.unwrap();

    let full = format!("{head}{rest}");
    let lines: Vec<&str> = full.lines().collect();
    assert_eq!(lines.first().copied(), Some("started"));
    assert_eq!(lines.last().copied(), Some("Python program terminated."));
    assert!(
        lines[lines.len() - 2].contains("pipe"),
        "missing write failure message: {lines:?}"
    );
}

#[tokio::test]
async fn spawn_failure_surfaces_before_relay() {
    let config = RelayConfig::new("pyrelay-missing-interpreter", "game.py");
    let (mut term_read, term_write) = tokio::io::duplex(64);

    let err = run(&config, tokio::io::empty(), term_write)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, RelayError::Spawn { .. }));
    assert!(err.is_startup());
    assert!(err.to_string().contains("pyrelay-missing-interpreter"));

    let mut out = String::new();
    term_read.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "", "nothing should reach the terminal on spawn failure");
}
