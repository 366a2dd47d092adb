// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! End-to-end checks of the harness against stub daemons: full case cycles,
//! failure isolation, and clean lifecycle teardown.

mod common;

use std::fs;
use std::thread;
use std::time::Duration;

use common::StubKind;
use jukebox_test_harness::{
    fixture, scenarios, CaseError, ClientChannel, DaemonSupervisor, FixtureBuilder,
    HarnessSession, TestRootPaths,
};
use nix::sys::signal;
use nix::unistd::Pid;

fn stub_session(dir: &tempfile::TempDir, kind: StubKind) -> HarnessSession {
    let stub = common::write_stub_daemon(dir.path(), kind);
    HarnessSession::initialize(
        dir.path().join("testroot"),
        DaemonSupervisor::with_binary(stub),
    )
    .expect("session initialization against a fresh root")
}

#[test]
fn noop_case_against_standard_set_counts_one_pass() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = stub_session(&dir, StubKind::RunUntilTerm);

    session
        .run_case(
            |_ctx| Ok(()),
            &fixture::standard_track_set,
            false,
            Some("noop"),
        )
        .unwrap();

    let tally = session.tally();
    assert_eq!(tally.cases_run, 1);
    assert_eq!(tally.cases_failed, 0);
    assert!(!session.is_daemon_running());
}

#[test]
fn smoke_scenario_runs_a_full_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = stub_session(&dir, StubKind::RunUntilTerm);

    session
        .run_case(
            scenarios::daemon_smoke,
            &fixture::standard_track_set,
            false,
            Some("smoke"),
        )
        .unwrap();

    assert!(session.tally().all_passed());
    let log = fs::read_to_string(session.paths().daemon_log_path("smoke")).unwrap();
    assert!(log.contains("stub daemon up"), "log was: {log:?}");
}

#[test]
fn failing_body_is_counted_and_its_daemon_log_flushed() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = stub_session(&dir, StubKind::RunUntilTerm);

    session
        .run_case(
            |_ctx| Err(CaseError::failed("queue should have been empty")),
            &fixture::standard_track_set,
            false,
            Some("failing"),
        )
        .unwrap();

    let tally = session.tally();
    assert_eq!(tally.cases_run, 1);
    assert_eq!(tally.cases_failed, 1);
    assert!(!session.is_daemon_running());

    let log = fs::read_to_string(session.paths().daemon_log_path("failing")).unwrap();
    assert!(log.contains("stub daemon up"));
}

#[test]
fn duplicate_tracks_scenario_passes_under_the_runner() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = stub_session(&dir, StubKind::RunUntilTerm);

    session
        .run_case(
            scenarios::duplicate_tracks,
            &fixture::standard_track_set,
            false,
            Some("duplicate-tracks"),
        )
        .unwrap();

    assert!(session.tally().all_passed());
}

#[test]
fn crashed_daemon_does_not_break_the_next_case() {
    let dir = tempfile::tempdir().unwrap();
    let crashing = common::write_stub_daemon(dir.path(), StubKind::ExitImmediately);
    let mut session = HarnessSession::initialize(
        dir.path().join("testroot"),
        DaemonSupervisor::with_binary(crashing),
    )
    .unwrap();

    // The stub exits on its own; stop() during teardown must cope.
    session
        .run_case(
            |_ctx| {
                thread::sleep(Duration::from_millis(300));
                Ok(())
            },
            &fixture::empty_track_set,
            false,
            Some("self-exit"),
        )
        .unwrap();

    session
        .run_case(
            |_ctx| Ok(()),
            &fixture::empty_track_set,
            false,
            Some("after-crash"),
        )
        .unwrap();

    let tally = session.tally();
    assert_eq!(tally.cases_run, 2);
    assert!(tally.all_passed());
}

#[test]
fn start_settle_stop_leaves_no_residual_process() {
    let dir = tempfile::tempdir().unwrap();
    let stub = common::write_stub_daemon(dir.path(), StubKind::RunUntilTerm);
    let paths = TestRootPaths::new(dir.path().join("testroot"));
    let fixture = FixtureBuilder::new(&paths);
    fixture.reset_root().unwrap();
    fixture.write_config().unwrap();

    let mut supervisor = DaemonSupervisor::with_binary(stub);
    let client = ClientChannel::for_root(&paths);
    supervisor.start(&paths, &client, Some("settle")).unwrap();
    let pid = supervisor.running_pid().expect("daemon tracked after start");

    thread::sleep(Duration::from_secs(2));
    supervisor.stop().unwrap();
    assert!(!supervisor.is_running());

    // The pid must be gone once stop() has reaped the daemon.
    let probe = signal::kill(Pid::from_raw(pid as i32), None);
    assert!(probe.is_err(), "daemon pid {pid} still alive after stop");
}
