//! One reconciliation session from upload to submission
//!
//! [`ReconciliationSession`] owns the state of a single operator's
//! reconciliation: the latest consolidation and the resolution record
//! seeded from it. Concurrent sessions are isolated by giving each its
//! own instance; nothing here is shared. Cancelling a session is simply
//! dropping it.

use crate::catalog::{FieldCatalog, FieldKey};
use crate::consolidate::{consolidate, Consolidation, DocumentFields};
use crate::error::ReconcileError;
use crate::persistence::CanonicalRecordStore;
use crate::resolution::{CanonicalRecord, ResolutionState};

pub struct ReconciliationSession {
    catalog: FieldCatalog,
    consolidation: Option<Consolidation>,
    resolution: ResolutionState,
}

impl ReconciliationSession {
    pub fn new(catalog: FieldCatalog) -> Self {
        ReconciliationSession {
            resolution: ResolutionState::new(catalog.clone()),
            catalog,
            consolidation: None,
        }
    }

    /// Consolidate a freshly uploaded document pair and reseed the
    /// resolution record, discarding any in-progress edits.
    pub fn upload(&mut self, doc1: &DocumentFields, doc2: &DocumentFields) -> &Consolidation {
        let result = consolidate(doc1, doc2, &self.catalog);
        self.resolution.seed(&result);
        self.consolidation.insert(result)
    }

    /// Latest consolidation, if any upload happened.
    pub fn consolidation(&self) -> Option<&Consolidation> {
        self.consolidation.as_ref()
    }

    /// Record an operator's choice for a field.
    pub fn set(&mut self, key: &FieldKey, value: impl Into<String>) -> Result<(), ReconcileError> {
        self.resolution.set(key, value)?;
        Ok(())
    }

    /// Finalize the record and hand it to the persistence collaborator.
    ///
    /// Fails without touching the store while conflicts remain. A store
    /// failure propagates unchanged and leaves the record resolved but
    /// unconsumed, so the operator can retry submission without redoing
    /// any edits; the record is only marked finalized once the store
    /// accepts it.
    pub async fn submit(
        &mut self,
        store: &dyn CanonicalRecordStore,
    ) -> Result<CanonicalRecord, ReconcileError> {
        let record = self.resolution.build_record()?;
        store.save(&record).await?;
        Ok(self.resolution.finalize()?)
    }
}
