//! Error taxonomy for the reconciliation engine
//!
//! Engine errors are deliberately few: the comparison pipeline is total
//! over its inputs, so failures only arise at the resolution boundary
//! (caller bugs and unresolved operator decisions) and from collaborators
//! (persistence), which are propagated unchanged.

use thiserror::Error;

use crate::catalog::FieldKey;

/// Errors raised by [`crate::resolution::ResolutionState`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// A key outside the configured catalog was supplied. This indicates
    /// a caller or configuration bug, not an operator mistake; no state
    /// is mutated.
    #[error("unknown field '{key}' is not in the catalog")]
    UnknownField { key: FieldKey },

    /// Finalize was called while conflicted fields were still undecided.
    /// Carries every offending key so the caller can re-prompt.
    #[error("unresolved conflicts remain: {}", keys_list(.keys))]
    UnresolvedConflict { keys: Vec<FieldKey> },

    /// The record has not been seeded from a consolidation yet.
    #[error("resolution record has not been seeded")]
    NotSeeded,

    /// Finalize was called twice without an intervening reseed; the
    /// canonical record is consumed exactly once per upload event.
    #[error("resolution record was already finalized")]
    AlreadyFinalized,
}

fn keys_list(keys: &[FieldKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top-level error for callers driving a whole reconciliation session.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Collaborator failure (persistence, transport) passed through
    /// without retry or suppression.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] anyhow::Error),
}
