//! End-to-end tests for the batchprover binary
//!
//! Each test runs the compiled binary against a scripted local coordinator and
//! a shell-script prover, then checks the exit status, the operator output, and
//! the requests the coordinator received.

#![cfg(unix)]

mod test_support;

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use test_support::{
    StubCoordinator, StubResponse, closed_address, isolated_workspace, recording_prover,
    write_script,
};

const ENV_VARS: &[&str] = &[
    "RUST_LOG",
    batchprover_config::CONFIG_PATH_ENV,
    batchprover_config::ENV_PROVER,
    batchprover_config::ENV_PROVER_TIMEOUT,
    batchprover_config::ENV_PROVING_TIME,
    batchprover_config::ENV_COST,
    batchprover_config::ENV_PRICE,
    batchprover_config::ENV_ACCELERATION,
    batchprover_config::ENV_DEPLOYMENT_VERSION,
    batchprover_config::ENV_STRICT_SUBMIT,
];

fn batchprover(workspace: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("batchprover"));
    cmd.current_dir(workspace).stdin(Stdio::null());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

/// Unix keeps the low 8 bits of an exit status.
fn observed_exit(code: i32) -> i32 {
    code & 0xff
}

#[test]
fn happy_path_submits_proof_for_fetched_batch() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());
    let stub = StubCoordinator::start(vec![
        StubResponse::batch("r1", "b1.bin"),
        StubResponse::new(200, r#"{"status":"ok"}"#),
    ]);

    batchprover(ws.path())
        .args([
            "alice",
            stub.base(),
            "--prover",
            path_str(&prover),
            "--proving-time",
            "7200000",
            "--cost",
            "100000",
            "--price",
            "10100",
            "--acceleration",
            "GPU",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Requesting batch."))
        .stdout(predicate::str::contains(r#""request_id":"r1""#))
        .stdout(predicate::str::contains("Submitting proof."))
        .stdout(predicate::str::contains(r#"{"status":"ok"}"#));

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/get_batch/?participant_id=alice");

    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].target, "/submit_proof/?participant_id=alice");
    assert!(
        requests[1]
            .header("content-type")
            .is_some_and(|v| v.starts_with("application/json"))
    );

    let payload = requests[1].json();
    assert_eq!(payload["request_id"], "r1");
    assert_eq!(payload["proof_data"], "3q2+7w==");
    assert_eq!(payload["proving_time"], 7_200_000);
    assert_eq!(payload["cost"], 100_000);
    assert_eq!(payload["price"], 10_100);
    assert_eq!(payload["acceleration"], "GPU");
    assert_eq!(payload["deployment_version"], 2);

    let location = std::fs::read_to_string(ws.path().join("args.txt")).unwrap();
    assert_eq!(location, format!("{}/b1.bin", stub.base()));
}

#[test]
fn defaults_report_no_acceleration_and_measured_time() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());
    let stub = StubCoordinator::start(vec![
        StubResponse::batch("r2", "/nested/b2.bin"),
        StubResponse::new(200, "{}"),
    ]);

    batchprover(ws.path())
        .args(["alice", stub.base(), "--prover", path_str(&prover)])
        .assert()
        .success();

    let payload = stub.requests()[1].json();
    assert_eq!(payload["acceleration"], "NONE");
    assert_eq!(payload["cost"], 0);
    assert!(payload["proving_time"].is_u64());

    let location = std::fs::read_to_string(ws.path().join("args.txt")).unwrap();
    assert_eq!(location, format!("{}/nested/b2.bin", stub.base()));
}

#[test]
fn rejected_batch_request_exits_with_http_status() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());
    let stub = StubCoordinator::start(vec![StubResponse::new(404, "not found")]);

    batchprover(ws.path())
        .args(["alice", stub.base(), "--prover", path_str(&prover)])
        .assert()
        .code(observed_exit(404))
        .stderr(predicate::str::contains("404"))
        .stderr(predicate::str::contains("not found"));

    assert_eq!(stub.requests().len(), 1);
    assert!(!ws.path().join("args.txt").exists(), "prover must not run");
}

#[test]
fn failing_prover_exit_code_is_propagated_without_submit() {
    let ws = isolated_workspace();
    let prover = write_script(ws.path(), "prove.sh", "echo 'missing key' >&2\nexit 2");
    let stub = StubCoordinator::start(vec![
        StubResponse::batch("r1", "b1.bin"),
        StubResponse::new(200, "{}"),
    ]);

    batchprover(ws.path())
        .args(["alice", stub.base(), "--prover", path_str(&prover)])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing key"));

    assert_eq!(stub.requests().len(), 1, "no submission after prover failure");
}

#[test]
fn missing_arguments_are_usage_errors() {
    let ws = isolated_workspace();

    batchprover(ws.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No participant ID specified"));

    batchprover(ws.path())
        .arg("alice")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No server address specified"));
}

#[test]
fn help_describes_protocol() {
    let ws = isolated_workspace();

    batchprover(ws.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_batch"))
        .stdout(predicate::str::contains("--strict-submit"));
}

#[test]
fn strict_submit_turns_rejection_into_failure() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());
    let stub = StubCoordinator::start(vec![
        StubResponse::batch("r1", "b1.bin"),
        StubResponse::new(422, r#"{"error":"stale batch"}"#),
    ]);

    batchprover(ws.path())
        .args(["alice", stub.base(), "--prover", path_str(&prover), "--strict-submit"])
        .assert()
        .code(75)
        .stdout(predicate::str::contains("stale batch"));
}

#[test]
fn lenient_submit_reports_rejection_and_succeeds() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());
    let stub = StubCoordinator::start(vec![
        StubResponse::batch("r1", "b1.bin"),
        StubResponse::new(422, r#"{"error":"stale batch"}"#),
    ]);

    batchprover(ws.path())
        .args(["alice", stub.base(), "--prover", path_str(&prover)])
        .assert()
        .success()
        .stdout(predicate::str::contains("stale batch"));
}

#[test]
fn malformed_batch_response_exits_76() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());
    let stub = StubCoordinator::start(vec![StubResponse::new(200, "<html>oops</html>")]);

    batchprover(ws.path())
        .args(["alice", stub.base(), "--prover", path_str(&prover)])
        .assert()
        .code(76);

    assert!(!ws.path().join("args.txt").exists());
}

#[test]
fn unreachable_coordinator_exits_69() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());

    batchprover(ws.path())
        .args(["alice", &closed_address(), "--prover", path_str(&prover)])
        .assert()
        .code(69);
}

#[test]
fn missing_prover_fails_before_fetch() {
    let ws = isolated_workspace();
    let stub = StubCoordinator::start(vec![StubResponse::batch("r1", "b1.bin")]);
    let absent = ws.path().join("absent.sh");

    batchprover(ws.path())
        .args(["alice", stub.base(), "--prover", path_str(&absent)])
        .assert()
        .code(78);

    assert!(stub.requests().is_empty(), "no batch may be consumed");
}

#[test]
fn invalid_configuration_exits_78() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());

    batchprover(ws.path())
        .args([
            "alice",
            "http://127.0.0.1:9",
            "--prover",
            path_str(&prover),
            "--config",
            path_str(&ws.path().join("missing.toml")),
        ])
        .assert()
        .code(78);

    std::fs::create_dir(ws.path().join(".batchprover")).unwrap();
    std::fs::write(
        ws.path().join(".batchprover/config.toml"),
        "[prover]\nprogramme = \"typo\"\n",
    )
    .unwrap();

    batchprover(ws.path())
        .args(["alice", "http://127.0.0.1:9"])
        .assert()
        .code(78);
}

#[test]
fn discovered_config_file_supplies_prover_and_metadata() {
    let ws = isolated_workspace();
    let prover = recording_prover(ws.path());
    let stub = StubCoordinator::start(vec![
        StubResponse::batch("r9", "b9.bin"),
        StubResponse::new(200, "{}"),
    ]);

    std::fs::create_dir(ws.path().join(".batchprover")).unwrap();
    std::fs::write(
        ws.path().join(".batchprover/config.toml"),
        format!(
            "[prover]\nprogram = \"{}\"\n\n[submission]\ncost = 42\nacceleration = \"FPGA\"\n",
            prover.display()
        ),
    )
    .unwrap();

    batchprover(ws.path())
        .args(["alice", stub.base(), "--cost", "7"])
        .assert()
        .success();

    let payload = stub.requests()[1].json();
    assert_eq!(payload["cost"], 7, "CLI overrides the file");
    assert_eq!(payload["acceleration"], "FPGA");
}

#[test]
fn prover_timeout_exits_124() {
    let ws = isolated_workspace();
    // The script forks `sleep`, which holds the output pipes after the shell dies.
    let prover = write_script(ws.path(), "prove.sh", "sleep 30\ntrue");
    let stub = StubCoordinator::start(vec![StubResponse::batch("r1", "b1.bin")]);

    let started = Instant::now();
    batchprover(ws.path())
        .args([
            "alice",
            stub.base(),
            "--prover",
            path_str(&prover),
            "--prover-timeout",
            "1",
        ])
        .assert()
        .code(124);

    assert!(
        started.elapsed() < Duration::from_secs(10),
        "timeout did not bound the run: {:?}",
        started.elapsed()
    );
    assert_eq!(stub.requests().len(), 1, "no submission after timeout");
}

#[test]
fn prover_killed_by_signal_exits_128_plus_signal() {
    let ws = isolated_workspace();
    let prover = write_script(ws.path(), "prove.sh", "kill -9 $$");
    let stub = StubCoordinator::start(vec![StubResponse::batch("r1", "b1.bin")]);

    batchprover(ws.path())
        .args(["alice", stub.base(), "--prover", path_str(&prover)])
        .assert()
        .code(137);
}
