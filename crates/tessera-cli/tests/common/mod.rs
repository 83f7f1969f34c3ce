//! Shared E2E test helpers for `tessera` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Environment variables that would leak host configuration into a test.
const CONFIG_VARS: &[&str] = &[
    "TESSERA_DEBUG",
    "TESSERA_RESET_ENABLED",
    "TESSERA_HOME_PAGE",
    "TESSERA_SERVLET_PATH",
    "TESSERA_DEFAULT_LOCALE",
    "RUST_LOG",
];

/// Build a Command for the `tessera` binary isolated in a tempdir.
///
/// The tempdir is both the project root and `HOME`, so neither global nor
/// project config from the host is picked up. Returns (command, _guard);
/// keep the guard alive for the test's duration.
pub fn tessera_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp dir for project root");
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("tessera");
    cmd.timeout(TIMEOUT_BASIC);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", tmp.path());
    cmd.args(["-C", tmp.path().to_str().expect("valid utf8")]);
    (cmd, tmp)
}
