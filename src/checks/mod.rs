//! Per-pointer consistency predicates.
//!
//! Both the end-of-test report and the unmap purge diagnostics go through
//! [`violations`], so a pointer is judged the same way whichever path
//! retires it.

use crate::session::PointerHistory;

/// Allocation-stat code counted by the balance check.
pub const ALLOC_CODE: char = 'a';

/// Inconsistency found in a pointer's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Odd number of stat codes, or allocations are not exactly half of them.
    Unbalanced,
    /// The type code changes inside a paired move.
    AcrossMove,
}

/// Balance check over the concatenated stat codes.
///
/// A history is balanced when its length is even and exactly half of its
/// characters are [`ALLOC_CODE`].
pub fn is_unbalanced<S: AsRef<str>>(stats: &[S]) -> bool {
    let (len, allocs) = stats
        .iter()
        .flat_map(|code| code.as_ref().chars())
        .fold((0usize, 0usize), |(len, allocs), c| {
            (len + 1, allocs + usize::from(c == ALLOC_CODE))
        });

    len % 2 != 0 || allocs != len / 2
}

/// Move-consistency check: pairs `(0, 1), (2, 3), ...` must agree.
/// A trailing unpaired element is ignored.
pub fn crosses_move<S: PartialEq>(types: &[S]) -> bool {
    types.chunks_exact(2).any(|pair| pair[0] != pair[1])
}

/// Run the checks over one pointer history, balance first.
pub fn violations(history: &PointerHistory, move_check: bool) -> Vec<Violation> {
    let mut found = Vec::new();
    if is_unbalanced(history.stats()) {
        found.push(Violation::Unbalanced);
    }
    if move_check && crosses_move(history.types()) {
        found.push(Violation::AcrossMove);
    }
    found
}
