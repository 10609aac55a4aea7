//! Log line classification.
//!
//! Every line is checked against the setup, unmap, event and cleanup rules in
//! that order. The rules are not exclusive, so one line yields every directive
//! whose rule it matches.

use crate::address::{parse_address, AddressRange};
use crate::{ScanError, ScanOptions};

const SETUP_PREFIX: &str = "Test setup:";
const CLEANUP_PREFIX: &str = "Test cleanup:";
const UNMAP_PREFIX: &str = "osunmap";

/// One allocation event: `<stat>,<type>,<ptr>,<source>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Allocation-stat code (`a` marks an allocation).
    pub stat: String,
    /// Type/tag code compared across paired moves.
    pub kind: String,
    /// Pointer key, kept verbatim.
    pub pointer: String,
    /// Source/site identifier.
    pub source: String,
}

impl EventRecord {
    /// Whether `line` has the shape of an event record (second character is a comma).
    pub fn matches(line: &str) -> bool {
        line.chars().nth(1) == Some(',')
    }

    /// Split an event line into its fields. Fields past the fourth are ignored.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, ScanError> {
        let mut fields = line.split(',');
        let mut next = || {
            fields.next().ok_or_else(|| ScanError::MalformedEvent {
                line: line_no,
                text: line.to_string(),
            })
        };

        let stat = next()?.to_string();
        let kind = next()?.to_string();
        let pointer = next()?.to_string();
        let source = next()?.to_string();

        Ok(Self {
            stat,
            kind,
            pointer,
            source,
        })
    }
}

/// Action requested by a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Start of a test case; all pointer state is discarded.
    Setup {
        /// Test name with whitespace trimmed and quotes removed.
        name: String,
    },
    /// Address range released back to the OS.
    Unmap(AddressRange),
    /// Event appended to a pointer's history.
    Event(EventRecord),
    /// End of a test case; the current state is reported.
    Cleanup,
}

/// Classify one line (without its terminator). `line_no` is 1-based and only
/// used for error messages.
pub fn classify(
    line: &str,
    line_no: usize,
    options: &ScanOptions,
) -> Result<Vec<Directive>, ScanError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut directives = Vec::new();

    if options.test_scopes && line.starts_with(SETUP_PREFIX) {
        directives.push(Directive::Setup {
            name: test_name(line),
        });
    }

    if options.unmap && line.starts_with(UNMAP_PREFIX) {
        directives.push(Directive::Unmap(parse_unmap(line, line_no)?));
    }

    if EventRecord::matches(line) {
        directives.push(Directive::Event(EventRecord::parse(line, line_no)?));
    }

    if options.test_scopes && line.starts_with(CLEANUP_PREFIX) {
        directives.push(Directive::Cleanup);
    }

    Ok(directives)
}

fn test_name(line: &str) -> String {
    let rest = line.split_once(':').map(|(_, rest)| rest).unwrap_or("");
    rest.trim().replace('\'', "")
}

fn parse_unmap(line: &str, line_no: usize) -> Result<AddressRange, ScanError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 3 {
        return Err(ScanError::MalformedUnmap {
            line: line_no,
            text: line.to_string(),
        });
    }

    let address = |text: &str| {
        parse_address(text).map_err(|source| ScanError::InvalidAddress {
            line: line_no,
            source,
        })
    };

    Ok(AddressRange::new(address(fields[1])?, address(fields[2])?))
}
