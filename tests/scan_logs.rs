//! End-to-end scans over fixture logs.

#[path = "common/mod.rs"]
mod common;
use allocscan::{ScanError, ScanOptions, Scanner};
use common::{assert_same_lines, assert_snapshot, assert_snapshot_unordered, fixture, sorted_lines};

fn scan_fixture(name: &str, options: ScanOptions) -> (String, allocscan::ScanSummary) {
    let mut out = Vec::new();
    let summary = Scanner::new(options)
        .scan_path(fixture(name), &mut out)
        .expect("fixture scan should succeed");
    (String::from_utf8(out).expect("utf-8 output"), summary)
}

#[test]
fn full_scan_matches_golden() {
    let (out, summary) = scan_fixture("map_unmap.log", ScanOptions::full());
    assert_snapshot("scan/map_unmap_full.txt", &out);

    assert_eq!(summary.lines, 19);
    assert_eq!(summary.events, 12);
    assert_eq!(summary.reports, 2);
    assert_eq!(summary.unmaps, 1);
    assert_eq!(summary.purged, 2);
    assert_eq!(summary.diagnostics, 3);
}

#[test]
fn plain_scan_ignores_scopes_and_unmaps() {
    let (out, summary) = scan_fixture("map_unmap.log", ScanOptions::plain());
    assert_snapshot_unordered("scan/map_unmap_plain.txt", &out);
    assert_eq!(summary.reports, 1);
    assert_eq!(summary.unmaps, 0);
}

#[test]
fn stat_only_scan() {
    let (out, _) = scan_fixture("map_unmap.log", ScanOptions::stat_only());
    assert_same_lines(&out, "  0x7f0000020000 -> a (m)\n  0x7f0000001040 -> a (s)\n");
}

#[test]
fn unordered_comparison_sorts_lines() {
    assert_eq!(
        sorted_lines("  0x20 -> a (x)\r\n  0x10 -> a (x)\n\n"),
        ["  0x10 -> a (x)", "  0x20 -> a (x)"]
    );
}

#[test]
fn junk_lines_in_fixture_do_not_change_the_report() {
    let mut log = std::fs::read(fixture("map_unmap.log")).expect("read fixture");
    let at = log.iter().position(|&b| b == b'\n').expect("first line") + 1;
    let rest = log.split_off(at);
    log.extend_from_slice(b"\x1b[31m\xff\xfe allocator noise\n");
    log.extend_from_slice(&rest);

    let mut out = Vec::new();
    Scanner::new(ScanOptions::full())
        .scan(&log[..], &mut out)
        .expect("scan with junk line");
    assert_snapshot("scan/map_unmap_full.txt", &String::from_utf8(out).unwrap());
}

#[test]
fn unmapped_pointer_can_be_recreated() {
    let log = "\
Test setup: 'T1'
a,x,0x100,s1
osunmap,0x100,0x10
f,x,0x100,s2
Test cleanup: T1
";
    let (out, summary) = Scanner::new(ScanOptions::full()).scan_str(log).unwrap();
    // The purge reports the lone allocation; the free afterwards starts a
    // fresh history that is itself unbalanced.
    assert_eq!(
        out,
        "  osUnmap - removing ptrs in range [100, 110)\n\
         \x20   0x100 -> a (x)\n\
         Test: T1\n\
         \x20 0x100 -> f (x)\n"
    );
    assert_eq!(summary.purged, 1);
}

#[test]
fn cleanup_without_setup_uses_empty_name() {
    let (out, _) = Scanner::new(ScanOptions::full())
        .scan_str("a,x,1,s\nf,x,1,s\nTest cleanup: x\n")
        .unwrap();
    assert_eq!(out, "Test: \n");
}

#[test]
fn cleanup_reports_do_not_clear_state() {
    let log = "\
Test setup: 'T1'
a,x,0x10,s1
Test cleanup: T1
Test cleanup: T1
";
    let (out, _) = Scanner::new(ScanOptions::full()).scan_str(log).unwrap();
    assert_eq!(out, "Test: T1\n  0x10 -> a (x)\nTest: T1\n  0x10 -> a (x)\n");
}

#[test]
fn missing_file_is_an_io_error() {
    let mut out = Vec::new();
    let err = Scanner::new(ScanOptions::full())
        .scan_path(fixture("does_not_exist.log"), &mut out)
        .unwrap_err();
    assert!(matches!(err, ScanError::Io(_)));
}

#[test]
fn non_numeric_key_aborts_unmap() {
    let log = "a,x,heap,s1\nosunmap,0x0,0x100\n";
    let err = Scanner::new(ScanOptions::full()).scan_str(log).unwrap_err();
    assert!(matches!(err, ScanError::UnparsableKey { ref key, .. } if key == "heap"));
}

#[test]
fn diagnostics_before_error_are_kept() {
    let log = "Test setup: 'T1'\na,x,0x10,s1\nTest cleanup: T1\nosunmap,0x10\n";
    let mut out = Vec::new();
    let err = Scanner::new(ScanOptions::full())
        .scan(log.as_bytes(), &mut out)
        .unwrap_err();
    assert!(matches!(err, ScanError::MalformedUnmap { line: 4, .. }));
    assert_eq!(String::from_utf8(out).unwrap(), "Test: T1\n  0x10 -> a (x)\n");
}
