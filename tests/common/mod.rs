//! Test fixture utilities for integration tests.

pub mod harness;

use std::path::PathBuf;

/// Returns the path to the fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Returns the root of a fixture project by name.
#[allow(dead_code)]
pub fn fixture_project(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}
