//! Field catalog configuration
//!
//! The catalog is the contract surface of the engine: a fixed, ordered list
//! of identity-document fields with a normalization kind per field. It is
//! process-wide configuration, never derived from input documents. Fields
//! present in an input but absent from the catalog are ignored; catalog
//! fields absent from both inputs degrade to "missing in both".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for one semantic field of an identity document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
    pub fn new(key: impl Into<String>) -> Self {
        FieldKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        FieldKey(s.to_string())
    }
}

/// How a field's value is canonicalized before comparison.
///
/// The kind affects normalization only; candidate values shown to the
/// operator are always the raw source values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Trim and case-fold.
    FreeText,
    /// Strip non-alphanumeric separators and case-fold, so
    /// "1990-05-01" and "1990/05/01" compare equal.
    Date,
    /// Closed value set (sex, card type); trim and case-fold.
    EnumLike,
}

/// One catalog entry: a field key with its normalization kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: FieldKey,
    #[serde(default = "FieldSpec::default_kind")]
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        FieldSpec {
            key: FieldKey::new(key),
            kind,
        }
    }

    fn default_kind() -> FieldKind {
        FieldKind::FreeText
    }
}

/// Ordered set of fields the engine reconciles.
///
/// Order is significant: consolidation output and canonical records
/// preserve catalog order. Duplicate keys in a configured catalog keep the
/// first occurrence; deserialization routes through the same dedupe, so a
/// repeated key in a JSON catalog file cannot produce two entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct FieldCatalog {
    fields: Vec<FieldSpec>,
}

impl From<Vec<FieldSpec>> for FieldCatalog {
    fn from(specs: Vec<FieldSpec>) -> Self {
        FieldCatalog::from_specs(specs)
    }
}

impl From<FieldCatalog> for Vec<FieldSpec> {
    fn from(catalog: FieldCatalog) -> Self {
        catalog.fields
    }
}

impl FieldCatalog {
    pub fn from_specs(specs: Vec<FieldSpec>) -> Self {
        let mut fields: Vec<FieldSpec> = Vec::with_capacity(specs.len());
        for spec in specs {
            if !fields.iter().any(|f| f.key == spec.key) {
                fields.push(spec);
            }
        }
        FieldCatalog { fields }
    }

    /// The identity-card field set, in persistence column order.
    pub fn identity_card() -> Self {
        use FieldKind::*;
        FieldCatalog::from_specs(vec![
            FieldSpec::new("issuing_country", FreeText),
            FieldSpec::new("authority", FreeText),
            FieldSpec::new("card_type", EnumLike),
            FieldSpec::new("full_name", FreeText),
            FieldSpec::new("surname", FreeText),
            FieldSpec::new("sex", EnumLike),
            FieldSpec::new("date_of_birth", Date),
            FieldSpec::new("age", FreeText),
            FieldSpec::new("nationality", FreeText),
            FieldSpec::new("id_number", FreeText),
            FieldSpec::new("issuing_date", Date),
            FieldSpec::new("expiry_date", Date),
            FieldSpec::new("signature_present", EnumLike),
        ])
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.fields.iter().any(|f| &f.key == key)
    }

    /// Normalization kind for a key, or `None` for out-of-catalog keys.
    pub fn kind_of(&self, key: &FieldKey) -> Option<FieldKind> {
        self.fields.iter().find(|f| &f.key == key).map(|f| f.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.iter().map(|f| &f.key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        FieldCatalog::identity_card()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_card_catalog_order() {
        let catalog = FieldCatalog::identity_card();
        let keys: Vec<&str> = catalog.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.first(), Some(&"issuing_country"));
        assert_eq!(keys.last(), Some(&"signature_present"));
        assert_eq!(catalog.len(), 13);
    }

    #[test]
    fn test_kind_lookup() {
        let catalog = FieldCatalog::identity_card();
        assert_eq!(
            catalog.kind_of(&FieldKey::from("date_of_birth")),
            Some(FieldKind::Date)
        );
        assert_eq!(
            catalog.kind_of(&FieldKey::from("full_name")),
            Some(FieldKind::FreeText)
        );
        assert_eq!(catalog.kind_of(&FieldKey::from("not_a_field")), None);
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let catalog = FieldCatalog::from_specs(vec![
            FieldSpec::new("sex", FieldKind::EnumLike),
            FieldSpec::new("sex", FieldKind::FreeText),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.kind_of(&FieldKey::from("sex")),
            Some(FieldKind::EnumLike)
        );
    }

    #[test]
    fn test_deserialized_duplicate_keys_keep_first() {
        let json = r#"[
            {"key": "sex", "kind": "enum_like"},
            {"key": "sex", "kind": "free_text"}
        ]"#;
        let catalog: FieldCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.kind_of(&FieldKey::from("sex")),
            Some(FieldKind::EnumLike)
        );
    }

    #[test]
    fn test_catalog_from_json_config() {
        let json = r#"[
            {"key": "full_name", "kind": "free_text"},
            {"key": "date_of_birth", "kind": "date"},
            {"key": "notes"}
        ]"#;
        let catalog: FieldCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.kind_of(&FieldKey::from("notes")),
            Some(FieldKind::FreeText)
        );
    }
}
