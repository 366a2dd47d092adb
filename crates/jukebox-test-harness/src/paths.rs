// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layout of the isolated test root. Every location the harness or the
//! daemon touches is derived from a single root directory so the whole
//! fixture can be threaded explicitly through the fixture builder and the
//! supervisor instead of living in process-wide state.

use std::path::{Path, PathBuf};

/// Derives fixture locations from the test-root directory.
///
/// The root lives for the entire harness run and is intentionally never
/// deleted at the end so a failed run can be inspected postmortem.
#[derive(Clone, Debug)]
pub struct TestRootPaths {
    root: PathBuf,
}

impl TestRootPaths {
    /// Wrap an absolute root path. [`crate::HarnessSession::initialize`]
    /// resolves relative paths against the current directory before calling
    /// this.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The generated daemon configuration file, read once per daemon start.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Root of the track collection the daemon scans.
    pub fn tracks_dir(&self) -> PathBuf {
        self.root.join("tracks")
    }

    /// A track location under the collection, from its relative path.
    pub fn track_path(&self, relative: &str) -> PathBuf {
        self.tracks_dir().join(relative)
    }

    /// The scratch sample the daemon plays when a track is interrupted.
    pub fn scratch_path(&self) -> PathBuf {
        self.root.join("scratch.ogg")
    }

    /// Log appended to by the configured shell player binding.
    pub fn played_log_path(&self) -> PathBuf {
        self.root.join("played.log")
    }

    /// Per-case destination for the daemon's diagnostic stream.
    pub fn daemon_log_path(&self, case_name: &str) -> PathBuf {
        self.root.join(format!("{case_name}.log"))
    }
}
