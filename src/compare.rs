//! Per-field comparison and outcome classification
//!
//! Compares the two documents' values for a single field. Equality is
//! tested on normalized values; the outcome carries the original raw
//! values as candidates. The outcome is an explicit tagged variant rather
//! than the "is this value an object" shape dispatch of loosely typed
//! consumers.

use serde::Serialize;

use crate::catalog::FieldKind;
use crate::normalize::normalize;

/// Classification of one field across both documents, with its candidate
/// value(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    /// Both documents agree under normalization; one authoritative value
    /// (document 1's raw spelling survives).
    Match { value: String },
    /// Both documents provide a value and they disagree.
    Conflict {
        document_1: String,
        document_2: String,
    },
    /// Only document 1 provides a value.
    OnlyInFirst { value: String },
    /// Only document 2 provides a value.
    OnlyInSecond { value: String },
    /// Neither document provides a value.
    MissingInBoth,
}

impl ComparisonOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, ComparisonOutcome::Match { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ComparisonOutcome::Conflict { .. })
    }

    /// Comparable outcomes are the similarity-score denominator: both
    /// documents weighed in, whether they agreed or not.
    pub fn is_comparable(&self) -> bool {
        matches!(
            self,
            ComparisonOutcome::Match { .. } | ComparisonOutcome::Conflict { .. }
        )
    }
}

/// Classify one field's values from both documents.
///
/// Rules, in order:
/// 1. both absent -> `MissingInBoth`
/// 2. exactly one absent -> `OnlyInFirst` / `OnlyInSecond`
/// 3. normalized-equal -> `Match` (candidate = document 1's raw value)
/// 4. otherwise -> `Conflict` with both raw candidates
///
/// Total over its domain; absence means the document did not supply the
/// field at all, which is distinct from an empty string.
pub fn compare(kind: FieldKind, v1: Option<&str>, v2: Option<&str>) -> ComparisonOutcome {
    match (v1, v2) {
        (None, None) => ComparisonOutcome::MissingInBoth,
        (Some(v), None) => ComparisonOutcome::OnlyInFirst {
            value: v.to_string(),
        },
        (None, Some(v)) => ComparisonOutcome::OnlyInSecond {
            value: v.to_string(),
        },
        (Some(a), Some(b)) => {
            if normalize(Some(a), kind) == normalize(Some(b), kind) {
                ComparisonOutcome::Match {
                    value: a.to_string(),
                }
            } else {
                ComparisonOutcome::Conflict {
                    document_1: a.to_string(),
                    document_2: b.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_absent() {
        assert_eq!(
            compare(FieldKind::FreeText, None, None),
            ComparisonOutcome::MissingInBoth
        );
    }

    #[test]
    fn test_one_sided_values() {
        assert_eq!(
            compare(FieldKind::FreeText, Some("Ann"), None),
            ComparisonOutcome::OnlyInFirst {
                value: "Ann".to_string()
            }
        );
        assert_eq!(
            compare(FieldKind::FreeText, None, Some("Ann")),
            ComparisonOutcome::OnlyInSecond {
                value: "Ann".to_string()
            }
        );
    }

    #[test]
    fn test_match_keeps_first_raw_value() {
        let outcome = compare(FieldKind::FreeText, Some("Jane Doe"), Some("jane   doe"));
        assert_eq!(
            outcome,
            ComparisonOutcome::Match {
                value: "Jane Doe".to_string()
            }
        );
    }

    #[test]
    fn test_same_raw_value_always_matches() {
        for v in ["Ann", "  ann ", "1990-05-01", ""] {
            assert!(
                compare(FieldKind::FreeText, Some(v), Some(v)).is_match(),
                "expected Match for {v:?}"
            );
        }
    }

    #[test]
    fn test_conflict_carries_both_candidates() {
        let outcome = compare(FieldKind::FreeText, Some("Ann"), Some("Anne"));
        assert_eq!(
            outcome,
            ComparisonOutcome::Conflict {
                document_1: "Ann".to_string(),
                document_2: "Anne".to_string(),
            }
        );
    }

    #[test]
    fn test_date_kind_ignores_separators() {
        assert!(compare(FieldKind::Date, Some("1990-05-01"), Some("1990/05/01")).is_match());
        assert!(compare(FieldKind::Date, Some("1990-05-01"), Some("1990-05-02")).is_conflict());
    }

    #[test]
    fn test_empty_string_is_present() {
        // Empty is a present value: it matches another empty, it does not
        // degrade to a missing side.
        assert!(compare(FieldKind::FreeText, Some(""), Some(" ")).is_match());
        assert_eq!(
            compare(FieldKind::FreeText, Some(""), None),
            ComparisonOutcome::OnlyInFirst {
                value: String::new()
            }
        );
    }
}
