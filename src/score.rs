//! Similarity scoring over comparison outcomes
//!
//! Aggregates per-field outcomes into one overall percentage:
//! `round(100 * matched / comparable)` where comparable fields are those
//! with a value in both documents (`Match` or `Conflict`). Fields missing
//! from both or present in only one are excluded from the denominator.

use crate::compare::ComparisonOutcome;

/// Overall similarity of two documents, as an integer percent in [0, 100].
///
/// Returns `None` when no field is comparable: "not applicable" is a
/// distinct state from 0% (total disagreement) and 100% (total agreement).
/// Rounding is round-half-up, so 1 match out of 8 comparable is 13, not 12.
pub fn similarity<'a, I>(outcomes: I) -> Option<u8>
where
    I: IntoIterator<Item = &'a ComparisonOutcome>,
{
    let mut matched: u32 = 0;
    let mut comparable: u32 = 0;
    for outcome in outcomes {
        if outcome.is_comparable() {
            comparable += 1;
            if outcome.is_match() {
                matched += 1;
            }
        }
    }
    if comparable == 0 {
        return None;
    }
    // round-half-up in integer arithmetic
    Some(((200 * matched + comparable) / (2 * comparable)) as u8)
}
