// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Side channel for the external client library.
//!
//! Test bodies talk to the daemon through a client library the harness does
//! not implement. That library locates the daemon by reading a config-file
//! path from the environment, falling back to per-user configuration unless
//! told otherwise. The supervisor publishes this channel whenever it starts
//! a daemon so in-test client calls reach the instance under supervision.

use std::env;
use std::path::{Path, PathBuf};

use crate::paths::TestRootPaths;

/// Environment variable naming the config file the client library reads.
pub const CLIENT_CONFIG_ENV: &str = "JUKEBOXD_CONFIG";

/// Environment variable that, when set to `1`, disables the client
/// library's per-user configuration lookup.
pub const CLIENT_NO_USER_CONFIG_ENV: &str = "JUKEBOXD_NO_USER_CONFIG";

/// Process-wide configuration the client library reads before issuing
/// commands. Also available on the case context so test bodies can hand it
/// to client helpers explicitly instead of going through the environment.
#[derive(Clone, Debug)]
pub struct ClientChannel {
    config_path: PathBuf,
    per_user_lookup: bool,
}

impl ClientChannel {
    /// Channel pointing at the generated config under the given root, with
    /// per-user config lookup disabled as the fixtures require.
    pub fn for_root(paths: &TestRootPaths) -> Self {
        Self {
            config_path: paths.config_path(),
            per_user_lookup: false,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn per_user_lookup(&self) -> bool {
        self.per_user_lookup
    }

    /// Publish the channel to the environment for out-of-process client
    /// collaborators.
    pub fn publish(&self) {
        env::set_var(CLIENT_CONFIG_ENV, &self.config_path);
        env::set_var(
            CLIENT_NO_USER_CONFIG_ENV,
            if self.per_user_lookup { "0" } else { "1" },
        );
    }
}
