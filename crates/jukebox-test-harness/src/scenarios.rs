// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Built-in test bodies exercised by the harness driver. These routines are
//! shared between the driver binary and the Rust tests so coverage stays
//! identical across both entry points.
//!
//! Bodies that genuinely exercise the daemon's control protocol live with
//! the client library; the scenarios here only need the daemon process to
//! be alive, which keeps them runnable against any binary honouring the
//! `--foreground --config` contract.

use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::check;
use crate::fixture::{SAMPLE_TRACK, STANDARD_TRACKS};
use crate::paths::TestRootPaths;
use crate::runner::{CaseContext, CaseResult};

/// How long the smoke scenario lets the daemon run before teardown.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

const SHORT_SETTLE: Duration = Duration::from_millis(500);

/// Start the daemon and stop it a few seconds later; the minimal proof that
/// the lifecycle plumbing works end to end.
pub fn daemon_smoke(ctx: &CaseContext<'_>) -> CaseResult {
    debug!(root = %ctx.paths.root().display(), "letting the daemon settle");
    thread::sleep(SETTLE_DELAY);
    Ok(())
}

/// Boot against an empty library: nothing to scan must not keep the daemon
/// from coming up or going down cleanly.
pub fn empty_library(_ctx: &CaseContext<'_>) -> CaseResult {
    thread::sleep(SHORT_SETTLE);
    Ok(())
}

/// Verify the duplicate-tolerant standard fixture on disk: every catalogue
/// entry is byte-identical to the sample asset and duplicated paths left
/// exactly one file each.
pub fn duplicate_tracks(ctx: &CaseContext<'_>) -> CaseResult {
    for relative in STANDARD_TRACKS {
        let path = ctx.paths.track_path(relative);
        check!(path.is_file(), "standard track missing at {}", path.display());
        let bytes = fs::read(&path)?;
        check!(
            bytes == SAMPLE_TRACK,
            "track {relative} is not byte-identical to the sample asset"
        );
    }

    for (album, expected) in [
        ("Joe Bloggs/First Album", 5),
        ("Joe Bloggs/Second Album", 5),
        ("Fred Smith/Boring", 4),
        ("Various/Greatest Hits", 2),
    ] {
        let dir = ctx.paths.track_path(album);
        let found = entry_count(&dir)?;
        check!(
            found == expected,
            "album {album} holds {found} files, expected {expected} (duplicates must overwrite)"
        );
    }
    Ok(())
}

/// Before any playback has been requested, the shell player binding must
/// not have appended anything to the played log.
pub fn played_log(ctx: &CaseContext<'_>) -> CaseResult {
    thread::sleep(SHORT_SETTLE);
    let played = played_tracks(ctx.paths)?;
    check!(
        played.is_empty(),
        "expected no played tracks before any playback, got {played:?}"
    );
    Ok(())
}

/// Tracks the configured shell player has logged so far, in play order.
/// Empty when the daemon has not played anything yet.
pub fn played_tracks(paths: &TestRootPaths) -> io::Result<Vec<String>> {
    match fs::read_to_string(paths.played_log_path()) {
        Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

fn entry_count(dir: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        entry?;
        count += 1;
    }
    Ok(count)
}
