//! Field value normalization for comparison
//!
//! Canonicalizes raw field values before equality testing:
//! - trim and collapse whitespace
//! - case-fold (all kinds)
//! - strip non-alphanumeric separators (date kind only)
//!
//! Normalization is internal to comparison: candidate values surfaced to
//! the operator and persisted are always the raw source values.

use crate::catalog::FieldKind;

/// Normalize a raw field value for equality testing.
///
/// Absent input stays absent; presence is never manufactured (an empty
/// string normalizes to an empty string, not to absence). Pure and total:
/// any text is valid input.
///
/// # Examples
///
/// ```
/// use id_reconcile::catalog::FieldKind;
/// use id_reconcile::normalize::normalize;
///
/// assert_eq!(normalize(Some("  Jane   Doe "), FieldKind::FreeText), Some("jane doe".to_string()));
/// assert_eq!(normalize(Some("1990-05-01"), FieldKind::Date), Some("19900501".to_string()));
/// assert_eq!(normalize(None, FieldKind::FreeText), None);
/// ```
pub fn normalize(value: Option<&str>, kind: FieldKind) -> Option<String> {
    let raw = value?;
    let folded = match kind {
        FieldKind::FreeText | FieldKind::EnumLike => raw
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect::<Vec<_>>()
            .join(" "),
        FieldKind::Date => raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(|c| c.to_lowercase())
            .collect(),
    };
    Some(folded)
}
