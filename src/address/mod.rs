//! Numeric address literals.
//!
//! Pointer keys stay textual everywhere except when an unmap range has to be
//! matched against them, so the parser here is shared by both the `osunmap`
//! fields and the keys being tested for containment.

use std::fmt;

use thiserror::Error;

/// Errors produced while parsing an address literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Nothing left after trimming (or only a `0x` prefix).
    #[error("empty address literal")]
    Empty,

    /// Characters outside the radix.
    #[error("invalid digits in address literal '{text}'")]
    InvalidDigits {
        /// Offending literal as it appeared in the log.
        text: String,
    },

    /// Value does not fit in 64 bits.
    #[error("address literal '{text}' overflows 64 bits")]
    Overflow {
        /// Offending literal as it appeared in the log.
        text: String,
    },
}

/// Parse an address literal.
///
/// Accepts `0x`/`0X` hexadecimal and plain decimal; a leading zero does not
/// make a literal octal. Surrounding whitespace is ignored.
pub fn parse_address(text: &str) -> Result<u64, AddressError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Empty);
    }

    let (digits, radix) = split_radix(trimmed);
    if digits.is_empty() {
        return Err(AddressError::Empty);
    }
    // from_str_radix tolerates a leading '+', the log format does not.
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(AddressError::InvalidDigits {
            text: trimmed.to_string(),
        });
    }

    u64::from_str_radix(digits, radix).map_err(|_| AddressError::Overflow {
        text: trimmed.to_string(),
    })
}

fn split_radix(text: &str) -> (&str, u32) {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => (digits, 16),
        None => (text, 10),
    }
}

/// Half-open address range `[start, start + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    /// First address covered by the range.
    pub start: u64,
    /// Number of bytes covered.
    pub size: u64,
}

impl AddressRange {
    /// Construct a range from its start and size.
    pub fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }

    /// Exclusive end of the range, widened so it cannot overflow.
    pub fn end(&self) -> u128 {
        self.start as u128 + self.size as u128
    }

    /// Whether `addr` falls inside the range.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr - self.start < self.size
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:x}, {:x})", self.start, self.end())
    }
}
