// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Lifecycle supervision of the daemon subprocess.
//!
//! The supervisor owns the `Idle -> Running -> Idle` state machine: it
//! spawns the daemon in foreground mode against the generated config,
//! redirects the diagnostic stream to a per-case log, and terminates the
//! process with SIGTERM plus a bounded wait, escalating to SIGKILL when the
//! grace period expires. At most one daemon may be tracked at a time;
//! overlapping daemons would corrupt the shared fixture state, so a second
//! `start` is a programming error rather than a queueing request.

use std::env;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::ClientChannel;
use crate::paths::TestRootPaths;

/// Overrides the daemon binary the supervisor spawns.
pub const DAEMON_BIN_ENV: &str = "JUKEBOXD_BIN";

const DEFAULT_DAEMON_BIN: &str = "jukeboxd";

/// How long `stop` waits after SIGTERM before escalating to SIGKILL.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors emitted by the daemon supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("daemon already running (pid {0}); stop it before starting another")]
    AlreadyRunning(u32),
    #[error("failed to open daemon log {path:?}: {source}")]
    Log { path: PathBuf, source: io::Error },
    #[error("failed to spawn daemon {bin:?}: {source}")]
    Spawn { bin: PathBuf, source: io::Error },
    #[error("failed to signal daemon (pid {pid}): {source}")]
    Signal { pid: u32, source: nix::Error },
    #[error("failed waiting for daemon exit: {0}")]
    Wait(#[from] io::Error),
}

/// Supervises at most one daemon subprocess.
pub struct DaemonSupervisor {
    daemon_bin: PathBuf,
    stop_grace: Duration,
    child: Option<Child>,
}

impl DaemonSupervisor {
    /// Supervisor for the binary named by [`DAEMON_BIN_ENV`], falling back
    /// to `jukeboxd` on `PATH`.
    pub fn new() -> Self {
        Self::with_binary(daemon_bin_from_env())
    }

    pub fn with_binary(bin: impl Into<PathBuf>) -> Self {
        Self {
            daemon_bin: bin.into(),
            stop_grace: DEFAULT_STOP_GRACE,
            child: None,
        }
    }

    /// Adjust the SIGTERM-to-SIGKILL escalation budget.
    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Pid of the tracked daemon, if one is running.
    pub fn running_pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Spawn the daemon in foreground mode against the generated config.
    ///
    /// With a case name, the daemon's diagnostic stream goes to
    /// `<root>/<case>.log`; without one (ad-hoc runs) it inherits the
    /// harness's own stderr. Publishes `client` so in-test client calls
    /// reach this instance.
    pub fn start(
        &mut self,
        paths: &TestRootPaths,
        client: &ClientChannel,
        case_name: Option<&str>,
    ) -> Result<(), SupervisorError> {
        if let Some(child) = &self.child {
            return Err(SupervisorError::AlreadyRunning(child.id()));
        }

        let stderr = match case_name {
            Some(name) => {
                let log_path = paths.daemon_log_path(name);
                let file = File::create(&log_path).map_err(|source| SupervisorError::Log {
                    path: log_path.clone(),
                    source,
                })?;
                Stdio::from(file)
            }
            None => Stdio::inherit(),
        };

        info!(config = %paths.config_path().display(), "starting daemon");
        let child = Command::new(&self.daemon_bin)
            .arg("--foreground")
            .arg("--config")
            .arg(paths.config_path())
            .stderr(stderr)
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                bin: self.daemon_bin.clone(),
                source,
            })?;
        debug!(pid = child.id(), "daemon spawned");
        self.child = Some(child);

        client.publish();
        Ok(())
    }

    /// Terminate the tracked daemon if it has not stopped already.
    ///
    /// Polls for a self-exit first, so a daemon that crashed mid-case is
    /// reaped without signalling. Safe to call when nothing is tracked.
    pub fn stop(&mut self) -> Result<(), SupervisorError> {
        let Some(mut child) = self.child.take() else {
            debug!("stop called with no daemon tracked");
            return Ok(());
        };
        let pid = child.id();

        match child.try_wait()? {
            Some(status) => {
                warn!(pid, %status, "daemon exited on its own before teardown");
            }
            None => {
                info!(pid, "stopping daemon");
                signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
                    .map_err(|source| SupervisorError::Signal { pid, source })?;
                let deadline = Instant::now() + self.stop_grace;
                loop {
                    if child.try_wait()?.is_some() {
                        break;
                    }
                    if Instant::now() >= deadline {
                        warn!(pid, grace = ?self.stop_grace, "daemon ignored SIGTERM, killing");
                        child.kill()?;
                        child.wait()?;
                        break;
                    }
                    thread::sleep(STOP_POLL_INTERVAL);
                }
            }
        }

        info!(pid, "daemon has stopped");
        Ok(())
    }
}

impl Default for DaemonSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

fn daemon_bin_from_env() -> PathBuf {
    env::var_os(DAEMON_BIN_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DAEMON_BIN))
}
