//! Value comparison for the diff
//!
//! Two non-absent values are equal when their normalized strings match, or
//! when either side is a decoded number, the other parses as one, and they
//! agree within a relative tolerance.

use crate::domain::record::FieldValue;

/// Relative tolerance of numeric comparison
pub const NUMERIC_TOLERANCE: f64 = 1e-9;

/// Compare two field values by logical content
///
/// Sequences never compare equal; callers route them to "not analyzed".
pub fn values_equal(before: &FieldValue, after: &FieldValue) -> bool {
    let (Some(left), Some(right)) = (before.normalized(), after.normalized()) else {
        return false;
    };

    if left == right {
        return true;
    }

    let numeric = match (before.as_number(), after.as_number()) {
        (Some(a), Some(b)) => Some((a, b)),
        (Some(a), None) => right.parse::<f64>().ok().map(|b| (a, b)),
        (None, Some(b)) => left.parse::<f64>().ok().map(|a| (a, b)),
        (None, None) => None,
    };

    numeric.is_some_and(|(a, b)| is_close(a, b))
}

/// `|a - b| <= tol × max(|a|, |b|)`
fn is_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= NUMERIC_TOLERANCE * a.abs().max(b.abs())
}
