//! Common test utilities for rz integration tests

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch directory serving as `$HOME` (and the XDG roots) so tests
/// never pick up the host's config files.
pub fn scratch() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// An rz invocation isolated against `home`.
pub fn rz(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rz").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_DIRS", home.path().join("data").display().to_string());
    cmd
}
