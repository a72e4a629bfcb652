//! Operator resolution of a consolidated document pair
//!
//! [`ResolutionState`] is the mutable record between consolidation and
//! persistence: seeded with the engine's per-field decisions, edited by
//! the operator, and consumed exactly once by [`ResolutionState::finalize`].
//! Each reconciliation session owns its own instance; isolation is by
//! instance, not locking.
//!
//! Lifecycle: `Empty -> Seeded -> (set)* -> Finalized`, where a reseed
//! from any phase returns to `Seeded` and discards prior edits (a fresh
//! upload supersedes an in-progress reconciliation).

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::catalog::{FieldCatalog, FieldKey};
use crate::compare::ComparisonOutcome;
use crate::consolidate::Consolidation;
use crate::error::ResolutionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Empty,
    Seeded,
    Finalized,
}

#[derive(Debug, Clone)]
struct ResolutionEntry {
    key: FieldKey,
    outcome: ComparisonOutcome,
    chosen: Option<String>,
}

impl ResolutionEntry {
    /// `MissingInBoth` fields may legitimately finalize without a value;
    /// everything else must be decided (in practice only `Conflict` can
    /// remain undecided, since one-sided fields are auto-filled at seed).
    fn blocks_finalize(&self) -> bool {
        self.chosen.is_none() && !matches!(self.outcome, ComparisonOutcome::MissingInBoth)
    }
}

/// Mutable per-session record of operator choices, keyed by catalog field.
#[derive(Debug, Clone)]
pub struct ResolutionState {
    catalog: FieldCatalog,
    entries: Vec<ResolutionEntry>,
    phase: Phase,
}

impl ResolutionState {
    pub fn new(catalog: FieldCatalog) -> Self {
        ResolutionState {
            catalog,
            entries: Vec::new(),
            phase: Phase::Empty,
        }
    }

    /// Seed the record from a consolidation, replacing any prior record in
    /// full. Auto-fill rule per outcome: `Match` and one-sided outcomes
    /// fill the single candidate; `Conflict` and `MissingInBoth` start
    /// undecided.
    pub fn seed(&mut self, consolidation: &Consolidation) {
        self.entries = consolidation
            .fields()
            .iter()
            .map(|field| {
                let chosen = match &field.outcome {
                    ComparisonOutcome::Match { value }
                    | ComparisonOutcome::OnlyInFirst { value }
                    | ComparisonOutcome::OnlyInSecond { value } => Some(value.clone()),
                    ComparisonOutcome::Conflict { .. } | ComparisonOutcome::MissingInBoth => None,
                };
                ResolutionEntry {
                    key: field.key.clone(),
                    outcome: field.outcome.clone(),
                    chosen,
                }
            })
            .collect();
        self.phase = Phase::Seeded;
    }

    /// Set the chosen value for a field, overriding any auto-filled value.
    ///
    /// No validation beyond catalog membership: the operator may pick one
    /// of the candidates, type a corrected value, or clear a field to the
    /// empty string.
    pub fn set(
        &mut self,
        key: &FieldKey,
        value: impl Into<String>,
    ) -> Result<(), ResolutionError> {
        match self.phase {
            Phase::Empty => return Err(ResolutionError::NotSeeded),
            Phase::Finalized => return Err(ResolutionError::AlreadyFinalized),
            Phase::Seeded => {}
        }
        if !self.catalog.contains(key) {
            return Err(ResolutionError::UnknownField { key: key.clone() });
        }
        match self.entries.iter_mut().find(|e| &e.key == key) {
            Some(entry) => {
                entry.chosen = Some(value.into());
                Ok(())
            }
            // seeded from a consolidation over a different catalog
            None => Err(ResolutionError::UnknownField { key: key.clone() }),
        }
    }

    /// Keys that would currently block [`Self::finalize`].
    pub fn unresolved(&self) -> Vec<&FieldKey> {
        self.entries
            .iter()
            .filter(|e| e.blocks_finalize())
            .map(|e| &e.key)
            .collect()
    }

    /// Consume the record into a canonical record for persistence.
    ///
    /// Fails with [`ResolutionError::UnresolvedConflict`] listing every
    /// undecided field; no partial record is produced. Succeeding moves
    /// the state to `Finalized`, so a second call without a reseed fails.
    pub fn finalize(&mut self) -> Result<CanonicalRecord, ResolutionError> {
        let record = self.build_record()?;
        self.phase = Phase::Finalized;
        Ok(record)
    }

    /// Build the canonical record without consuming the state, so a caller
    /// can hand it to a collaborator first and only mark the record
    /// consumed once that call succeeds.
    pub(crate) fn build_record(&self) -> Result<CanonicalRecord, ResolutionError> {
        match self.phase {
            Phase::Empty => return Err(ResolutionError::NotSeeded),
            Phase::Finalized => return Err(ResolutionError::AlreadyFinalized),
            Phase::Seeded => {}
        }
        let blocking: Vec<FieldKey> = self
            .entries
            .iter()
            .filter(|e| e.blocks_finalize())
            .map(|e| e.key.clone())
            .collect();
        if !blocking.is_empty() {
            debug!(count = blocking.len(), "finalize blocked by unresolved fields");
            return Err(ResolutionError::UnresolvedConflict { keys: blocking });
        }
        Ok(CanonicalRecord {
            values: self
                .entries
                .iter()
                .map(|e| (e.key.clone(), e.chosen.clone()))
                .collect(),
        })
    }
}

/// The final, fully-resolved field mapping submitted for persistence.
///
/// Values are in catalog order; `None` marks a field missing from both
/// documents that the operator accepted as having no value. Serializes as
/// a flat JSON object with `null` for absent values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    values: Vec<(FieldKey, Option<String>)>,
}

impl CanonicalRecord {
    /// Build a record directly from a caller-supplied mapping, keeping
    /// only catalog keys (extra keys in an edit payload are deliberately
    /// ignored; the catalog is authoritative).
    pub fn from_values<I, V>(pairs: I, catalog: &FieldCatalog) -> Self
    where
        I: IntoIterator<Item = (FieldKey, Option<V>)>,
        V: Into<String>,
    {
        let mut supplied: Vec<(FieldKey, Option<String>)> = Vec::new();
        for (key, value) in pairs {
            if catalog.contains(&key) {
                supplied.push((key, value.map(Into::into)));
            } else {
                debug!(field = %key, "dropping out-of-catalog field from record");
            }
        }
        let values = catalog
            .keys()
            .map(|key| {
                let value = supplied
                    .iter()
                    .find(|(k, _)| k == key)
                    .and_then(|(_, v)| v.clone());
                (key.clone(), value)
            })
            .collect();
        CanonicalRecord { values }
    }

    pub fn get(&self, key: &FieldKey) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, Option<&str>)> {
        self.values.iter().map(|(k, v)| (k, v.as_deref()))
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
