// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Filesystem fixtures for the daemon under test: the isolated root, the
//! track collection, and the generated configuration.
//!
//! Track materialization is duplicate-tolerant on purpose: the standard
//! catalogue deliberately lists some paths more than once to exercise the
//! daemon's collection de-duplication, so re-materializing a path must
//! overwrite idempotently rather than fail.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::config::DaemonConfig;
use crate::paths::TestRootPaths;

/// Synthetic stand-in for the short sample recording copied to every track
/// path. The daemon under test only needs bytes to exist at the path; tests
/// verify materialized tracks against this constant.
pub const SAMPLE_TRACK: &[u8] = b"OggS\x00\x02jukebox sample track payload\x00\x01\x02\x03\x04\x05\x06\x07";

/// Synthetic stand-in for the scratch sample referenced by the generated
/// configuration. Distinct from [`SAMPLE_TRACK`] so a mixed-up copy shows up
/// in byte comparisons.
pub const SAMPLE_SCRATCH: &[u8] = b"OggS\x00\x02jukebox scratch payload\x00\x0a\x0b\x0c\x0d\x0e\x0f";

/// The standard catalogue: two artists, three albums, one miscellaneous
/// file, and one compilation album. The repeated entries are intentional
/// duplicate-track coverage and must be preserved exactly.
pub const STANDARD_TRACKS: &[&str] = &[
    "Joe Bloggs/First Album/01:First track.ogg",
    "Joe Bloggs/First Album/02:Second track.ogg",
    "Joe Bloggs/First Album/03:Third track.ogg",
    "Joe Bloggs/First Album/04:Fourth track.ogg",
    "Joe Bloggs/First Album/05:Fifth track.ogg",
    "Joe Bloggs/First Album/05:Fifth track.ogg",
    "Joe Bloggs/Second Album/01:First track.ogg",
    "Joe Bloggs/Second Album/02:Second track.ogg",
    "Joe Bloggs/Second Album/03:Third track.ogg",
    "Joe Bloggs/Second Album/04:Fourth track.ogg",
    "Joe Bloggs/Second Album/05:Fifth track.ogg",
    "Joe Bloggs/Second Album/05:Fifth track.ogg",
    "Joe Bloggs/First Album/01:First track.ogg",
    "Joe Bloggs/First Album/02:Second track.ogg",
    "Joe Bloggs/First Album/03:Third track.ogg",
    "Joe Bloggs/First Album/04:Fourth track.ogg",
    "Joe Bloggs/First Album/05:Fifth track.ogg",
    "Fred Smith/Boring/01:Dull.ogg",
    "Fred Smith/Boring/02:Tedious.ogg",
    "Fred Smith/Boring/03:Drum Solo.ogg",
    "Fred Smith/Boring/04:Yawn.ogg",
    "misc/blahblahblah.ogg",
    "Various/Greatest Hits/01:Jim Whatever - Spong.ogg",
    "Various/Greatest Hits/02:Joe Bloggs - Yadda.ogg",
];

/// Errors emitted while building fixtures. All of them are environment
/// failures and fatal to the harness run.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to reset test root {path:?}: {source}")]
    Reset { path: PathBuf, source: io::Error },
    #[error("failed to materialize track {track:?}: {source}")]
    Track { track: String, source: io::Error },
    #[error("failed to write daemon config {path:?}: {source}")]
    Config { path: PathBuf, source: io::Error },
    #[error("failed to place scratch sample {path:?}: {source}")]
    Scratch { path: PathBuf, source: io::Error },
}

/// Builds fixture state under one test root.
pub struct FixtureBuilder<'a> {
    paths: &'a TestRootPaths,
}

impl<'a> FixtureBuilder<'a> {
    pub fn new(paths: &'a TestRootPaths) -> Self {
        Self { paths }
    }

    /// Remove whatever currently sits at the root path and recreate it as an
    /// empty directory. Directory trees are removed recursively without
    /// following symlinks; plain files and links are unlinked.
    pub fn reset_root(&self) -> Result<(), FixtureError> {
        let root = self.paths.root();
        let reset_err = |source| FixtureError::Reset {
            path: root.to_path_buf(),
            source,
        };
        match fs::symlink_metadata(root) {
            Ok(meta) => {
                if meta.is_dir() {
                    fs::remove_dir_all(root).map_err(reset_err)?;
                } else {
                    fs::remove_file(root).map_err(reset_err)?;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(reset_err(err)),
        }
        fs::create_dir_all(root).map_err(reset_err)?;
        debug!(root = %root.display(), "test root reset");
        Ok(())
    }

    /// Ensure `tracks/<relative>` exists with the sample-track bytes,
    /// creating parent directories on demand and overwriting any previous
    /// copy. Calling this twice with the same path is a supported case.
    pub fn materialize_track(&self, relative: &str) -> Result<(), FixtureError> {
        let track_err = |source| FixtureError::Track {
            track: relative.to_string(),
            source,
        };
        let path = self.paths.track_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(track_err)?;
        }
        fs::write(&path, SAMPLE_TRACK).map_err(track_err)
    }

    /// Render and write the daemon configuration, then place the scratch
    /// sample it references. Must complete before any daemon start.
    pub fn write_config(&self) -> Result<(), FixtureError> {
        let config_path = self.paths.config_path();
        let rendered = DaemonConfig::for_root(self.paths).render();
        fs::write(&config_path, rendered).map_err(|source| FixtureError::Config {
            path: config_path.clone(),
            source,
        })?;
        let scratch_path = self.paths.scratch_path();
        fs::write(&scratch_path, SAMPLE_SCRATCH).map_err(|source| FixtureError::Scratch {
            path: scratch_path.clone(),
            source,
        })?;
        debug!(config = %config_path.display(), "daemon config written");
        Ok(())
    }
}

/// Materialize the full standard catalogue, duplicates included.
pub fn standard_track_set(fixture: &FixtureBuilder<'_>) -> Result<(), FixtureError> {
    for relative in STANDARD_TRACKS {
        fixture.materialize_track(relative)?;
    }
    Ok(())
}

/// Setup variant for cases that need a daemon with no library content.
pub fn empty_track_set(_fixture: &FixtureBuilder<'_>) -> Result<(), FixtureError> {
    Ok(())
}
