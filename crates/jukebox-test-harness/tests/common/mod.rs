// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Stub daemon executables shared by the integration tests. Each stub
//! honours the `--foreground --config <path>` invocation contract so the
//! harness exercises the same code paths as with a real daemon.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Behaviour of a stub daemon once spawned.
#[derive(Clone, Copy, Debug)]
pub enum StubKind {
    /// Validate the invocation, announce itself on stderr, idle until
    /// SIGTERM.
    RunUntilTerm,
    /// Exit successfully right away, simulating a mid-case crash.
    ExitImmediately,
    /// Misbehave: append a ghost entry to the played log next to the config
    /// file before idling, so the played-log scenario fails.
    WritesPlayedLog,
}

pub fn write_stub_daemon(dir: &Path, kind: StubKind) -> PathBuf {
    let body = match kind {
        StubKind::RunUntilTerm => {
            r#"if [[ "${1:-}" != "--foreground" ]]; then echo "missing --foreground" >&2; exit 64; fi
if [[ "${2:-}" != "--config" || ! -f "${3:-}" ]]; then echo "missing config" >&2; exit 65; fi
echo "stub daemon up" >&2
trap 'exit 0' TERM INT
while true; do sleep 1; done"#
        }
        StubKind::ExitImmediately => r#"echo "stub daemon exiting" >&2
exit 0"#,
        StubKind::WritesPlayedLog => {
            r#"root="$(dirname "${3:?}")"
echo "ghost-track.ogg" >> "$root/played.log"
echo "stub daemon up" >&2
trap 'exit 0' TERM INT
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
