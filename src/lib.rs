//! # Allocation Log Consistency Checks
//!
//! Scans a text log of pointer allocation/deallocation events and flags
//! pointers whose history does not add up.
//!
//! ## Checks
//!
//! 1. **Balance**: a pointer's stat codes must have even length, and exactly
//!    half of them must be allocations (`a`).
//! 2. **Move consistency**: events come in pairs `(0, 1), (2, 3), ...` and the
//!    type code must not change inside a pair.
//!
//! Test-scoped logs (`Test setup:` / `Test cleanup:`) are reported per test;
//! `osunmap` lines retire every pointer inside the unmapped range, reporting
//! the ones that were inconsistent.
//!
//! ## Usage Example
//!
//! ```
//! use allocscan::{ScanOptions, Scanner};
//!
//! let log = "Test setup: 'T1'\na,x,0x10,s1\nb,y,0x10,s2\nTest cleanup: T1\n";
//! let (out, _) = Scanner::new(ScanOptions::full()).scan_str(log)?;
//! assert_eq!(out, "Test: T1\n  acrossMove: 0x10 -> x,y -> s1,s2\n");
//! # Ok::<(), allocscan::ScanError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod address; // Address literals and unmap ranges
pub mod checks;  // Balance and move-consistency predicates
pub mod record;  // Log line classification
pub mod report;  // Diagnostic rendering
pub mod scanner; // Single-pass driver
pub mod session; // Per-pointer state between test boundaries

// Re-exports for convenience
pub use address::{parse_address, AddressError, AddressRange};
pub use checks::Violation;
pub use record::{Directive, EventRecord};
pub use scanner::{ScanSummary, Scanner};
pub use session::{Finding, PointerHistory, Report, ScanSession};

use thiserror::Error;

/// Which log features a scan honours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Reset state on `Test setup:` and report on `Test cleanup:`.
    /// When off, a single report is written at end of input.
    pub test_scopes: bool,

    /// Purge pointers inside `osunmap` ranges.
    pub unmap: bool,

    /// Run the move-consistency check in addition to the balance check.
    pub move_check: bool,
}

impl ScanOptions {
    /// Test scopes, unmap purges and both checks.
    pub fn full() -> Self {
        Self {
            test_scopes: true,
            unmap: true,
            move_check: true,
        }
    }

    /// One report over the whole log; setup, cleanup and unmap lines are ignored.
    pub fn plain() -> Self {
        Self {
            test_scopes: false,
            unmap: false,
            move_check: true,
        }
    }

    /// Like [`ScanOptions::plain`] with only the balance check.
    pub fn stat_only() -> Self {
        Self {
            move_check: false,
            ..Self::plain()
        }
    }

    /// Toggle the move-consistency check.
    pub fn with_move_check(mut self, enabled: bool) -> Self {
        self.move_check = enabled;
        self
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// Errors that abort a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Reading the log failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Event record with fewer than four fields.
    #[error("malformed event record on line {line}: '{text}'")]
    MalformedEvent {
        /// 1-based line number.
        line: usize,
        /// Offending line.
        text: String,
    },

    /// `osunmap` line without start and size fields.
    #[error("malformed osunmap record on line {line}: '{text}'")]
    MalformedUnmap {
        /// 1-based line number.
        line: usize,
        /// Offending line.
        text: String,
    },

    /// Bad numeric field in an `osunmap` line.
    #[error("invalid address on line {line}")]
    InvalidAddress {
        /// 1-based line number.
        line: usize,
        /// Parse failure.
        #[source]
        source: AddressError,
    },

    /// A tracked pointer key could not be compared against an unmap range.
    #[error("pointer key '{key}' is not a numeric address")]
    UnparsableKey {
        /// Pointer key as it appeared in the log.
        key: String,
        /// Parse failure.
        #[source]
        source: AddressError,
    },
}
