#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

const UPDATE_ENV: &str = "ALLOCSCAN_UPDATE_SNAPSHOTS";

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

/// Path of a log under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    manifest_dir().join("tests").join("fixtures").join(name)
}

/// Diagnostic lines sorted, ignoring `\r` and blank lines. Comparing these
/// checks that a scan flags the same pointers without pinning key order.
pub fn sorted_lines(output: &str) -> Vec<String> {
    let mut lines: Vec<String> = output
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .filter(|line| !line.is_empty())
        .collect();
    lines.sort();
    lines
}

/// Compare two scan outputs as sets of diagnostic lines.
pub fn assert_same_lines(actual: &str, expected: &str) {
    assert_eq!(
        sorted_lines(actual),
        sorted_lines(expected),
        "diagnostics differ.\nExpected:\n{expected}\nActual:\n{actual}"
    );
}

/// Compare scan output with `tests/snapshots/<name>` line for line.
pub fn assert_snapshot(name: &str, actual: &str) {
    check_snapshot(name, actual, |expected, actual| {
        expected.lines().eq(actual.lines())
    });
}

/// Like [`assert_snapshot`] but ignores the order of diagnostic lines, for
/// outputs whose pointer order is not part of what is being checked.
pub fn assert_snapshot_unordered(name: &str, actual: &str) {
    check_snapshot(name, actual, |expected, actual| {
        sorted_lines(expected) == sorted_lines(actual)
    });
}

fn check_snapshot(name: &str, actual: &str, same: impl Fn(&str, &str) -> bool) {
    let path = manifest_dir().join("tests").join("snapshots").join(name);
    if std::env::var(UPDATE_ENV).is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if !same(&expected, actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set {UPDATE_ENV}=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path, expected, actual
        );
    }
}
