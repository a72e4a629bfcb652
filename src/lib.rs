//! Field-level reconciliation of two parsed identity documents
//!
//! Given two independently parsed documents (each a flat mapping of
//! semantic fields), the engine classifies every catalog field as agreed,
//! conflicted, one-sided, or missing, scores overall similarity, and
//! tracks operator resolution until exactly one canonical value per field
//! exists for persistence.
//!
//! Pipeline:
//!
//! ```text
//! two field maps -> consolidate -> {consolidated fields, similarity}
//!                -> ResolutionState::seed -> operator set() calls
//!                -> finalize -> CanonicalRecord -> store
//! ```
//!
//! Document parsing/OCR, transport, and persistence are collaborators
//! behind interfaces; the engine itself is pure and synchronous.

pub mod catalog;
pub mod compare;
pub mod consolidate;
pub mod error;
pub mod normalize;
pub mod persistence;
pub mod resolution;
pub mod score;
pub mod session;

#[cfg(feature = "server")]
pub mod api;

pub use catalog::{FieldCatalog, FieldKey, FieldKind, FieldSpec};
pub use compare::ComparisonOutcome;
pub use consolidate::{consolidate, Consolidation, DocumentFields};
pub use error::{ReconcileError, ResolutionError};
pub use resolution::{CanonicalRecord, ResolutionState};
pub use score::similarity;
pub use session::ReconciliationSession;
