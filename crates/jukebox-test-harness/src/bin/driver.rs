// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use jukebox_test_harness::{fixture, scenarios, DaemonSupervisor, HarnessSession};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "jukebox-harness-driver",
    about = "Run lifecycle test cases against a supervised jukebox daemon."
)]
struct Cli {
    /// Directory used as the isolated test root; recreated on startup and
    /// left in place afterwards for postmortem inspection.
    #[arg(long, default_value = "testroot")]
    root: PathBuf,

    /// Daemon binary to supervise; defaults to $JUKEBOXD_BIN, then
    /// `jukeboxd` on PATH.
    #[arg(long)]
    daemon: Option<PathBuf>,

    /// Seconds to wait after SIGTERM before escalating to SIGKILL.
    #[arg(long, default_value_t = 5)]
    grace_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the daemon against the standard track set, let it settle, stop
    /// it again.
    Smoke,
    /// Boot the daemon with no pre-existing library content.
    EmptyLibrary,
    /// Verify the duplicate-tolerant standard fixture on disk.
    DuplicateTracks,
    /// Check that nothing is reported as played before any playback.
    PlayedLog,
    /// Run every scenario in sequence and aggregate the outcome.
    All,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let supervisor = match &cli.daemon {
        Some(bin) => DaemonSupervisor::with_binary(bin.clone()),
        None => DaemonSupervisor::new(),
    }
    .stop_grace(Duration::from_secs(cli.grace_secs));

    let mut session = HarnessSession::initialize(cli.root.clone(), supervisor)?;

    match cli.command {
        Command::Smoke => {
            session.run_case(
                scenarios::daemon_smoke,
                &fixture::standard_track_set,
                true,
                Some("smoke"),
            )?;
        }
        Command::EmptyLibrary => {
            session.run_case(
                scenarios::empty_library,
                &fixture::empty_track_set,
                true,
                Some("empty-library"),
            )?;
        }
        Command::DuplicateTracks => {
            session.run_case(
                scenarios::duplicate_tracks,
                &fixture::standard_track_set,
                true,
                Some("duplicate-tracks"),
            )?;
        }
        Command::PlayedLog => {
            session.run_case(
                scenarios::played_log,
                &fixture::standard_track_set,
                true,
                Some("played-log"),
            )?;
        }
        Command::All => {
            session.run_case(
                scenarios::daemon_smoke,
                &fixture::standard_track_set,
                false,
                Some("smoke"),
            )?;
            session.run_case(
                scenarios::empty_library,
                &fixture::empty_track_set,
                false,
                Some("empty-library"),
            )?;
            session.run_case(
                scenarios::duplicate_tracks,
                &fixture::standard_track_set,
                false,
                Some("duplicate-tracks"),
            )?;
            session.run_case(
                scenarios::played_log,
                &fixture::standard_track_set,
                false,
                Some("played-log"),
            )?;
            return Ok(session.finish());
        }
    }

    Ok(ExitCode::SUCCESS)
}
