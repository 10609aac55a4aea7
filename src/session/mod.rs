//! Scan session: the per-pointer event histories accumulated between test
//! boundaries.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::address::{parse_address, AddressRange};
use crate::checks::{violations, Violation};
use crate::record::EventRecord;
use crate::{ScanError, ScanOptions};

/// Event history of one pointer.
///
/// The stat, type and source sequences are only ever appended together, so
/// they always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerHistory {
    stats: Vec<String>,
    types: Vec<String>,
    sources: Vec<String>,
}

impl PointerHistory {
    /// Append one event.
    pub fn push(&mut self, event: &EventRecord) {
        self.stats.push(event.stat.clone());
        self.types.push(event.kind.clone());
        self.sources.push(event.source.clone());
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Whether no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Allocation-stat codes in log order.
    pub fn stats(&self) -> &[String] {
        &self.stats
    }

    /// Type codes in log order.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Source identifiers in log order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

/// A pointer together with the checks its history failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Pointer key as it appeared in the log.
    pub pointer: String,
    /// Full history at the time of the check.
    pub history: PointerHistory,
    /// Failed checks, balance first. Empty when the history is consistent.
    pub violations: Vec<Violation>,
}

impl Finding {
    fn new(pointer: String, history: PointerHistory, move_check: bool) -> Self {
        let violations = violations(&history, move_check);
        Self {
            pointer,
            history,
            violations,
        }
    }

    /// Whether the history failed `violation`.
    pub fn has(&self, violation: Violation) -> bool {
        self.violations.contains(&violation)
    }
}

/// Snapshot of a session taken at a test cleanup or at end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Current test name; `None` when the scan is not test-scoped.
    pub test_name: Option<String>,
    /// Every tracked pointer in key order, including consistent ones.
    pub findings: Vec<Finding>,
}

impl Report {
    /// Number of diagnostic lines this report produces.
    pub fn diagnostic_count(&self) -> usize {
        self.findings.iter().map(|f| f.violations.len()).sum()
    }
}

/// Pointer state owned by one scan.
#[derive(Debug)]
pub struct ScanSession {
    pointers: BTreeMap<String, PointerHistory>,
    test_name: String,
    test_scopes: bool,
    move_check: bool,
}

impl ScanSession {
    /// Create an empty session.
    pub fn new(options: &ScanOptions) -> Self {
        Self {
            pointers: BTreeMap::new(),
            test_name: String::new(),
            test_scopes: options.test_scopes,
            move_check: options.move_check,
        }
    }

    /// Drop all pointer state and start the test `name`.
    pub fn reset(&mut self, name: impl Into<String>) {
        self.test_name = name.into();
        debug!(
            test = %self.test_name,
            dropped = self.pointers.len(),
            "test setup"
        );
        self.pointers.clear();
    }

    /// Append an event to its pointer's history, creating the history if new.
    pub fn record(&mut self, event: &EventRecord) {
        trace!(pointer = %event.pointer, stat = %event.stat, kind = %event.kind, "event");
        self.pointers
            .entry(event.pointer.clone())
            .or_default()
            .push(event);
    }

    /// Remove every pointer whose key lies inside `range`.
    ///
    /// Returns the removed pointers in key order with their checks applied.
    /// Fails without removing anything if any tracked key is not a number.
    pub fn purge_range(&mut self, range: AddressRange) -> Result<Vec<Finding>, ScanError> {
        let mut doomed = Vec::new();
        for key in self.pointers.keys() {
            let addr = parse_address(key).map_err(|source| ScanError::UnparsableKey {
                key: key.clone(),
                source,
            })?;
            if range.contains(addr) {
                doomed.push(key.clone());
            }
        }

        debug!(range = %range, removed = doomed.len(), "unmap purge");

        let mut removed = Vec::with_capacity(doomed.len());
        for key in doomed {
            if let Some(history) = self.pointers.remove(&key) {
                removed.push(Finding::new(key, history, self.move_check));
            }
        }
        Ok(removed)
    }

    /// Check every tracked pointer. State is left untouched.
    pub fn finalize(&self) -> Report {
        let findings = self
            .pointers
            .iter()
            .map(|(key, history)| Finding::new(key.clone(), history.clone(), self.move_check))
            .collect();

        Report {
            test_name: self.test_scopes.then(|| self.test_name.clone()),
            findings,
        }
    }

    /// Name of the current test (empty before the first setup line).
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// History of `pointer`, if tracked.
    pub fn history(&self, pointer: &str) -> Option<&PointerHistory> {
        self.pointers.get(pointer)
    }

    /// Tracked pointer keys in order.
    pub fn pointers(&self) -> impl Iterator<Item = &str> {
        self.pointers.keys().map(String::as_str)
    }

    /// Number of tracked pointers.
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    /// Whether no pointers are tracked.
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }
}
