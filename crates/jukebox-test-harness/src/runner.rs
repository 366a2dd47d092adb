// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Case sequencing and failure isolation.
//!
//! A [`HarnessSession`] owns the whole run: the test-root paths, the client
//! side channel, the daemon supervisor, and the pass/fail tally. Each case
//! runs `fixtures -> daemon start -> body -> daemon stop` to completion
//! before the next begins, and the daemon-running region is wrapped in a
//! scope guard so teardown happens on every exit path, panic unwind
//! included. Assertion failures are values, not unwinds: a body returns
//! `CaseError::Failed` to mark the case failed without aborting the run,
//! while any other error is treated as fatal to the whole harness.

use std::env;
use std::path::PathBuf;
use std::process::{self, ExitCode};

use anyhow::{Context, Result};
use scopeguard::ScopeGuard;
use thiserror::Error;
use tracing::{error, info};

use crate::client::ClientChannel;
use crate::fixture::{FixtureBuilder, FixtureError};
use crate::paths::TestRootPaths;
use crate::supervisor::DaemonSupervisor;

/// Fixture setup invoked before each case; the standard and empty track
/// sets in [`crate::fixture`] both have this shape.
pub type SetupFn = dyn Fn(&FixtureBuilder<'_>) -> Result<(), FixtureError>;

/// What a test body sees while the daemon is live.
pub struct CaseContext<'a> {
    pub paths: &'a TestRootPaths,
    pub client: &'a ClientChannel,
}

/// Outcome of a test body.
#[derive(Debug, Error)]
pub enum CaseError {
    /// An expectation about daemon-observed behaviour did not hold. Counted
    /// and reported, but the run continues.
    #[error("{0}")]
    Failed(String),
    /// Anything else that went wrong in the body; aborts the whole run
    /// after teardown.
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl CaseError {
    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Failed(detail.into())
    }
}

impl From<std::io::Error> for CaseError {
    fn from(err: std::io::Error) -> Self {
        Self::Fatal(err.into())
    }
}

pub type CaseResult = Result<(), CaseError>;

/// Fail the current case unless a condition holds. Expands to an early
/// return with [`CaseError::Failed`] carrying the formatted detail.
#[macro_export]
macro_rules! check {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::runner::CaseError::failed(format!($($arg)+)));
        }
    };
}

/// Counters for the whole run, mutated only by the runner.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunTally {
    pub cases_run: u32,
    pub cases_failed: u32,
}

impl RunTally {
    pub fn all_passed(&self) -> bool {
        self.cases_failed == 0
    }
}

/// One harness run: shared test root and config, a supervisor, and the
/// tally. Created once, then driven case by case.
pub struct HarnessSession {
    paths: TestRootPaths,
    client: ClientChannel,
    supervisor: DaemonSupervisor,
    tally: RunTally,
}

impl HarnessSession {
    /// Perform the once-per-run initialization: recreate the test root from
    /// scratch and write the daemon configuration every spawned daemon will
    /// read. Relative roots are resolved against the current directory.
    pub fn initialize(root: impl Into<PathBuf>, supervisor: DaemonSupervisor) -> Result<Self> {
        let root = root.into();
        let root = if root.is_absolute() {
            root
        } else {
            env::current_dir()
                .context("failed to resolve current directory for the test root")?
                .join(root)
        };
        let paths = TestRootPaths::new(root);
        let fixture = FixtureBuilder::new(&paths);
        fixture.reset_root().context("failed to reset test root")?;
        fixture
            .write_config()
            .context("failed to write daemon config")?;
        let client = ClientChannel::for_root(&paths);
        Ok(Self {
            paths,
            client,
            supervisor,
            tally: RunTally::default(),
        })
    }

    pub fn paths(&self) -> &TestRootPaths {
        &self.paths
    }

    pub fn client(&self) -> &ClientChannel {
        &self.client
    }

    pub fn tally(&self) -> RunTally {
        self.tally
    }

    pub fn is_daemon_running(&self) -> bool {
        self.supervisor.is_running()
    }

    /// Run one case: rebuild track fixtures, start the daemon, invoke the
    /// body, and stop the daemon again no matter how the body went.
    ///
    /// A `CaseError::Failed` outcome is counted and printed without
    /// propagating; any other error aborts the run after teardown. With
    /// `report` set, the summary is printed afterwards and a failing run
    /// terminates the process — the only place the harness is allowed to do
    /// so.
    pub fn run_case<F>(
        &mut self,
        body: F,
        setup: &SetupFn,
        report: bool,
        name: Option<&str>,
    ) -> Result<()>
    where
        F: FnOnce(&CaseContext<'_>) -> CaseResult,
    {
        self.tally.cases_run += 1;
        let label = name.unwrap_or("ad-hoc");
        info!(case = label, "running case");

        {
            let fixture = FixtureBuilder::new(&self.paths);
            setup(&fixture)
                .with_context(|| format!("failed to build fixtures for case {label}"))?;
        }

        self.supervisor
            .start(&self.paths, &self.client, name)
            .with_context(|| format!("failed to start daemon for case {label}"))?;

        let outcome = {
            // Covers the unwind path; the normal path defuses the guard so
            // stop errors surface as run failures.
            let supervisor = scopeguard::guard(&mut self.supervisor, |sup| {
                if let Err(err) = sup.stop() {
                    error!(error = %err, "daemon teardown failed");
                }
            });
            let ctx = CaseContext {
                paths: &self.paths,
                client: &self.client,
            };
            let outcome = body(&ctx);
            ScopeGuard::into_inner(supervisor)
                .stop()
                .with_context(|| format!("failed to stop daemon after case {label}"))?;
            outcome
        };

        match outcome {
            Ok(()) => println!(" OK {label}"),
            Err(CaseError::Failed(detail)) => {
                self.tally.cases_failed += 1;
                println!("{detail}");
                println!(" FAILED {label}");
            }
            Err(CaseError::Fatal(err)) => {
                return Err(err.context(format!("case {label} hit a non-assertion error")));
            }
        }

        if report {
            self.report();
        }
        Ok(())
    }

    /// Print the run summary and terminate the process with status 1 when
    /// any case failed. The sole sanctioned process-exit point.
    pub fn report(&self) {
        if self.tally.cases_failed > 0 {
            println!(
                "FAILED  {} of {} cases failed",
                self.tally.cases_failed, self.tally.cases_run
            );
            process::exit(1);
        }
        println!("OK  all {} cases passed", self.tally.cases_run);
    }

    /// Exit-free summary for suite drivers: prints the same lines as
    /// [`Self::report`] but hands the status back as an [`ExitCode`].
    pub fn finish(self) -> ExitCode {
        if self.tally.cases_failed > 0 {
            println!(
                "FAILED  {} of {} cases failed",
                self.tally.cases_failed, self.tally.cases_run
            );
            return ExitCode::FAILURE;
        }
        println!("OK  all {} cases passed", self.tally.cases_run);
        ExitCode::SUCCESS
    }
}
