// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Process-lifecycle test harness for the jukebox daemon.
//!
//! The harness provisions an isolated filesystem fixture (track files, a
//! generated daemon configuration, audio assets), launches `jukeboxd` as a
//! supervised subprocess against that fixture, runs a test body while the
//! daemon is live, and tears the daemon down deterministically on every exit
//! path. Independent cases are sequenced so that one case's failure or crash
//! cannot corrupt the environment of the next.
//!
//! The daemon binary itself, the client library used inside test bodies, and
//! the audio tooling named in the generated configuration are all external
//! collaborators: the harness only ever touches them through a command line,
//! a config file, environment variables, and POSIX signals.

pub mod client;
pub mod config;
pub mod fixture;
pub mod paths;
pub mod runner;
pub mod scenarios;
pub mod supervisor;

pub use client::ClientChannel;
pub use fixture::{FixtureBuilder, FixtureError};
pub use paths::TestRootPaths;
pub use runner::{CaseContext, CaseError, CaseResult, HarnessSession, RunTally};
pub use supervisor::{DaemonSupervisor, SupervisorError};

#[cfg(test)]
pub(crate) mod test_support;
