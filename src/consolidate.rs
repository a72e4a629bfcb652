//! Consolidation of two document field-mappings
//!
//! Walks the catalog in order, classifies every field across both
//! documents, and computes the overall similarity score. Document fields
//! outside the catalog are deliberately dropped: the catalog is the
//! contract surface shared with the rendering layer, so unknown keys from
//! a drifting upstream parser are logged and ignored rather than smuggled
//! into the output.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::catalog::{FieldCatalog, FieldKey};
use crate::compare::{compare, ComparisonOutcome};
use crate::score::similarity;

/// A parsed document as a flat field mapping. A key absent from the map
/// means the document did not supply that field.
pub type DocumentFields = HashMap<FieldKey, String>;

/// One consolidated entry: a catalog key with its classified outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidatedField {
    pub key: FieldKey,
    #[serde(flatten)]
    pub outcome: ComparisonOutcome,
}

/// Immutable result of one upload event: every catalog field classified,
/// in catalog order, plus the similarity score. A new upload replaces the
/// whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consolidation {
    fields: Vec<ConsolidatedField>,
    similarity: Option<u8>,
}

impl Consolidation {
    /// Entries in catalog order; exactly one per catalog key.
    pub fn fields(&self) -> &[ConsolidatedField] {
        &self.fields
    }

    pub fn outcome(&self, key: &FieldKey) -> Option<&ComparisonOutcome> {
        self.fields
            .iter()
            .find(|f| &f.key == key)
            .map(|f| &f.outcome)
    }

    /// Similarity percent, or `None` when no field was comparable.
    pub fn similarity(&self) -> Option<u8> {
        self.similarity
    }

    /// Wire view of the consolidated fields: a JSON object in catalog
    /// order whose values are scalars, except `Conflict` fields which
    /// become `{"document_1": .., "document_2": ..}`. Consumers dispatch
    /// on that shape to render a choice control, so it must not change.
    pub fn details(&self) -> ConsolidatedDetails<'_> {
        ConsolidatedDetails(&self.fields)
    }
}

/// Serializes consolidated fields in the shape the form layer expects.
pub struct ConsolidatedDetails<'a>(&'a [ConsolidatedField]);

impl Serialize for ConsolidatedDetails<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Candidates<'a> {
            document_1: &'a str,
            document_2: &'a str,
        }

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            match &field.outcome {
                ComparisonOutcome::Match { value }
                | ComparisonOutcome::OnlyInFirst { value }
                | ComparisonOutcome::OnlyInSecond { value } => {
                    map.serialize_entry(&field.key, value)?;
                }
                ComparisonOutcome::Conflict {
                    document_1,
                    document_2,
                } => {
                    map.serialize_entry(
                        &field.key,
                        &Candidates {
                            document_1,
                            document_2,
                        },
                    )?;
                }
                ComparisonOutcome::MissingInBoth => {
                    map.serialize_entry(&field.key, &Option::<&str>::None)?;
                }
            }
        }
        map.end()
    }
}

/// Compare two documents over the catalog.
///
/// Pure and stateless: identical inputs yield identical output, and
/// concurrent invocations for different document pairs need no
/// coordination. Empty or missing maps are valid input; every catalog
/// field then degrades to `MissingInBoth`.
pub fn consolidate(
    doc1: &DocumentFields,
    doc2: &DocumentFields,
    catalog: &FieldCatalog,
) -> Consolidation {
    for key in doc1.keys().chain(doc2.keys()) {
        if !catalog.contains(key) {
            debug!(field = %key, "dropping out-of-catalog field");
        }
    }

    let fields: Vec<ConsolidatedField> = catalog
        .iter()
        .map(|spec| ConsolidatedField {
            key: spec.key.clone(),
            outcome: compare(
                spec.kind,
                doc1.get(&spec.key).map(String::as_str),
                doc2.get(&spec.key).map(String::as_str),
            ),
        })
        .collect();

    let similarity = similarity(fields.iter().map(|f| &f.outcome));

    Consolidation { fields, similarity }
}
