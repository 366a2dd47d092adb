// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Shared helpers for the unit tests: a lock serializing tests that touch
//! process-global state (environment variables, spawned daemons) and stub
//! daemon executables standing in for the real binary.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Serialize tests that publish client environment or spawn daemons.
pub(crate) fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// How a stub daemon behaves once spawned.
#[derive(Clone, Copy, Debug)]
pub(crate) enum StubBehavior {
    /// Validate the invocation, announce itself on stderr, then idle until
    /// SIGTERM.
    RunUntilTerm,
    /// Exit successfully right away, simulating a daemon that died mid-case.
    ExitImmediately,
    /// Idle and ignore SIGTERM so only SIGKILL can end it.
    IgnoreTerm,
}

/// Write an executable shell script that impersonates the daemon. The
/// running variants check they were invoked as
/// `<bin> --foreground --config <existing file>`.
pub(crate) fn write_stub_daemon(dir: &Path, behavior: StubBehavior) -> PathBuf {
    let body = match behavior {
        StubBehavior::RunUntilTerm => {
            r#"if [[ "${1:-}" != "--foreground" ]]; then echo "missing --foreground" >&2; exit 64; fi
if [[ "${2:-}" != "--config" || ! -f "${3:-}" ]]; then echo "missing config" >&2; exit 65; fi
echo "stub daemon up" >&2
trap 'exit 0' TERM INT
while true; do sleep 1; done"#
        }
        StubBehavior::ExitImmediately => r#"echo "stub daemon exiting" >&2
exit 0"#,
        StubBehavior::IgnoreTerm => {
            r#"echo "stub daemon ignoring TERM" >&2
trap '' TERM
while true; do sleep 1; done"#
        }
    };
    let path = dir.join("stub-jukeboxd.sh");
    let script = format!("#!/usr/bin/env bash\nset -euo pipefail\n{body}\n");
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}
