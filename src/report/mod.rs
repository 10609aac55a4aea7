//! Text rendering of diagnostics.
//!
//! ```text
//! Test: <name>
//!   <ptr> -> <stats> (<types>)
//!   acrossMove: <ptr> -> <types> -> <sources>
//!   osUnmap - removing ptrs in range [<start>, <end>)
//!     <ptr> -> <stats> (<types>)
//! ```

use std::io::{self, Write};

use crate::address::AddressRange;
use crate::checks::Violation;
use crate::session::{Finding, Report};

const REPORT_INDENT: &str = "  ";
const PURGE_INDENT: &str = "    ";

fn write_diagnostic<W: Write>(
    writer: &mut W,
    indent: &str,
    finding: &Finding,
    violation: Violation,
) -> io::Result<()> {
    let history = &finding.history;
    match violation {
        Violation::Unbalanced => writeln!(
            writer,
            "{indent}{} -> {} ({})",
            finding.pointer,
            history.stats().join(","),
            history.types().join(",")
        ),
        Violation::AcrossMove => writeln!(
            writer,
            "{indent}acrossMove: {} -> {} -> {}",
            finding.pointer,
            history.types().join(","),
            history.sources().join(",")
        ),
    }
}

/// Write a test (or end-of-input) report.
///
/// All balance diagnostics come before all move diagnostics.
pub fn write_report<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    if let Some(name) = &report.test_name {
        writeln!(writer, "Test: {name}")?;
    }

    for violation in [Violation::Unbalanced, Violation::AcrossMove] {
        for finding in report.findings.iter().filter(|f| f.has(violation)) {
            write_diagnostic(writer, REPORT_INDENT, finding, violation)?;
        }
    }
    Ok(())
}

/// Write the diagnostics for pointers removed by an unmap purge.
///
/// The range header is written once, before the first diagnostic, and not
/// at all when every removed pointer was consistent.
pub fn write_purge<W: Write>(
    writer: &mut W,
    range: AddressRange,
    removed: &[Finding],
) -> io::Result<usize> {
    let mut header_written = false;
    let mut written = 0;

    for finding in removed {
        for &violation in &finding.violations {
            if !header_written {
                writeln!(
                    writer,
                    "{REPORT_INDENT}osUnmap - removing ptrs in range {range}"
                )?;
                header_written = true;
            }
            write_diagnostic(writer, PURGE_INDENT, finding, violation)?;
            written += 1;
        }
    }

    Ok(written)
}

fn into_string(buffer: Vec<u8>) -> io::Result<String> {
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Render a report into a string (useful for tests and snapshots).
pub fn render_report(report: &Report) -> io::Result<String> {
    let mut buffer = Vec::new();
    write_report(&mut buffer, report)?;
    into_string(buffer)
}

/// Render unmap purge diagnostics into a string.
pub fn render_purge(range: AddressRange, removed: &[Finding]) -> io::Result<String> {
    let mut buffer = Vec::new();
    write_purge(&mut buffer, range, removed)?;
    into_string(buffer)
}
