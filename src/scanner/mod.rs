//! Single-pass log scanner.
//!
//! Lines are classified by [`crate::record::classify`] and fed to a
//! [`ScanSession`]; diagnostics are written to the caller's writer as soon as
//! a cleanup line or an unmap purge produces them.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::record::{classify, Directive};
use crate::report::{write_purge, write_report};
use crate::session::ScanSession;
use crate::{ScanError, ScanOptions};

/// Counters collected over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Lines read from the input.
    pub lines: usize,
    /// Event records appended to a pointer history.
    pub events: usize,
    /// Reports written (one per cleanup line, or one at end of input).
    pub reports: usize,
    /// Unmap lines processed.
    pub unmaps: usize,
    /// Pointers removed by unmap purges.
    pub purged: usize,
    /// Diagnostic lines written, headers excluded.
    pub diagnostics: usize,
}

/// Log scanner configured by [`ScanOptions`].
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Create a scanner.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Scan `reader` to the end, writing diagnostics to `out`.
    ///
    /// Lines are split on `\n` as raw bytes and decoded lossily, so stray
    /// binary output in the log is ignored like any other unrecognised line.
    /// The first malformed record aborts the scan. Diagnostics already
    /// written are not retracted.
    pub fn scan<R: BufRead, W: Write>(
        &self,
        reader: R,
        out: &mut W,
    ) -> Result<ScanSummary, ScanError> {
        let mut session = ScanSession::new(&self.options);
        let mut summary = ScanSummary::default();

        for (idx, raw) in reader.split(b'\n').enumerate() {
            let raw = raw?;
            let line = String::from_utf8_lossy(&raw);
            let line_no = idx + 1;
            summary.lines += 1;

            for directive in classify(&line, line_no, &self.options)? {
                match directive {
                    Directive::Setup { name } => session.reset(name),
                    Directive::Unmap(range) => {
                        let removed = session.purge_range(range)?;
                        summary.unmaps += 1;
                        summary.purged += removed.len();
                        summary.diagnostics += write_purge(out, range, &removed)?;
                    }
                    Directive::Event(event) => {
                        session.record(&event);
                        summary.events += 1;
                    }
                    Directive::Cleanup => {
                        debug!(test = %session.test_name(), pointers = session.len(), "test cleanup");
                        let report = session.finalize();
                        write_report(out, &report)?;
                        summary.diagnostics += report.diagnostic_count();
                        summary.reports += 1;
                    }
                }
            }
        }

        if !self.options.test_scopes {
            let report = session.finalize();
            write_report(out, &report)?;
            summary.diagnostics += report.diagnostic_count();
            summary.reports += 1;
        }

        out.flush()?;
        info!(
            lines = summary.lines,
            events = summary.events,
            reports = summary.reports,
            diagnostics = summary.diagnostics,
            "scan complete"
        );
        Ok(summary)
    }

    /// Open `path` and scan it.
    pub fn scan_path<P: AsRef<Path>, W: Write>(
        &self,
        path: P,
        out: &mut W,
    ) -> Result<ScanSummary, ScanError> {
        let file = File::open(path.as_ref())?;
        self.scan(BufReader::new(file), out)
    }

    /// Scan in-memory text and return the rendered diagnostics.
    pub fn scan_str(&self, input: &str) -> Result<(String, ScanSummary), ScanError> {
        let mut buffer = Vec::new();
        let summary = self.scan(input.as_bytes(), &mut buffer)?;
        let text = String::from_utf8_lossy(&buffer).into_owned();
        Ok((text, summary))
    }
}
