//! Scratch locations for tests that write encoder output.

use std::path::PathBuf;

use tempfile::TempDir;

/// Fresh scratch directory, removed when dropped.
pub fn temp_test_dir() -> TempDir {
    tempfile::tempdir().expect("create scratch directory")
}

/// Like [`temp_test_dir`], with a recognisable name prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("create scratch directory")
}

/// A path inside `dir` whose parent directory does not exist, so creating a
/// file there fails without touching anything outside `dir`.
pub fn missing_parent_path(dir: &TempDir, file_name: &str) -> PathBuf {
    dir.path().join("does-not-exist").join(file_name)
}
