// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Rendering of the generated daemon configuration.
//!
//! The daemon reads a line-oriented key-value file once at startup. The
//! harness renders the whole file up front, substituting the test root into
//! the collection root, scratch path, home directory, and played-log
//! binding; everything else is a fixed literal so every run exercises the
//! daemon with identical credentials and tool bindings.

use std::path::PathBuf;

use crate::paths::TestRootPaths;

/// Account the daemon is told to accept; test bodies authenticate with the
/// same pair through the client library.
pub const USERNAME: &str = "fred";
pub const PASSWORD: &str = "fredpass";

const GAP_SECONDS: u32 = 0;
const PLUGINS_PATH: &str = "../plugins";
const DECODER_COMMAND: &str = "jukebox-decode";
const TRACKLENGTH_COMMAND: &str = "jukebox-tracklength";
const PLAYER_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav", "flac"];

// Track-number prefixes and filler words excluded from search indexing.
const STOPWORD_LINES: &[&str] = &[
    "01 02 03 04 05 06 07 08 09 10",
    "1 2 3 4 5 6 7 8 9",
    "11 12 13 14 15 16 17 18 19 20",
    "21 22 23 24 25 26 27 28 29 30",
    "the a an and to too in on of we i am as im for is",
];

/// Daemon configuration bound to one test root.
#[derive(Clone, Debug)]
pub struct DaemonConfig {
    root: PathBuf,
}

impl DaemonConfig {
    pub fn for_root(paths: &TestRootPaths) -> Self {
        Self {
            root: paths.root().to_path_buf(),
        }
    }

    /// Render the full config file contents, trailing newline included.
    pub fn render(&self) -> String {
        let root = self.root.display();
        let mut lines = vec![
            format!(r#"player *.ogg shell 'echo "$TRACK" >> {root}/played.log'"#),
            format!("home {root}"),
            format!("collection fs ASCII {root}/tracks"),
            format!("scratch {root}/scratch.ogg"),
            format!("gap {GAP_SECONDS}"),
        ];
        for words in STOPWORD_LINES {
            lines.push(format!("stopword {words}"));
        }
        lines.push(format!("username {USERNAME}"));
        lines.push(format!("password {PASSWORD}"));
        lines.push(format!("allow {USERNAME} {PASSWORD}"));
        lines.push(format!("plugins {PLUGINS_PATH}"));
        for ext in PLAYER_EXTENSIONS {
            lines.push(format!("player *.{ext} execraw {DECODER_COMMAND}"));
        }
        for ext in PLAYER_EXTENSIONS {
            lines.push(format!("tracklength *.{ext} {TRACKLENGTH_COMMAND}"));
        }
        let mut rendered = lines.join("\n");
        rendered.push('\n');
        rendered
    }
}
