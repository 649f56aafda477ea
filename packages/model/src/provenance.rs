//! Content provenance.
//!
//! Every id is namespaced by its prefix: `gen_sec_*` / `gen_tbl_*` for
//! machine-generated sections and tables, `user_<kind>_*` for user-owned
//! elements. The prefix is the wire contract; this module decodes it once
//! into a [`Provenance`] value so the rest of the codebase never does
//! string inspection of its own.
//!
//! Every mutation entry point calls a guard before doing any text
//! scanning, so disallowed or malformed targets are rejected before any
//! work is spent or any edit could be applied.

use thiserror::Error;

pub const GENERATED_SECTION_PREFIX: &str = "gen_sec_";
pub const GENERATED_TABLE_PREFIX: &str = "gen_tbl_";
pub const USER_PREFIX: &str = "user_";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvenanceError {
    #[error("operation `{operation}` is not permitted on {provenance} content `{id}`")]
    ProvenanceViolation {
        id: String,
        operation: String,
        provenance: Provenance,
    },

    #[error("id `{0}` matches no recognized provenance scheme")]
    MalformedId(String),
}

/// Ownership class of a content id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Created by the generation step; read-only thereafter.
    Generated,
    /// Created and edited by explicit user actions.
    User,
}

impl Provenance {
    /// Decode the ownership class from an id's prefix.
    pub fn of(id: &str) -> Result<Provenance, ProvenanceError> {
        if is_generated_id(id) {
            Ok(Provenance::Generated)
        } else if is_user_id(id) {
            Ok(Provenance::User)
        } else {
            Err(ProvenanceError::MalformedId(id.to_string()))
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Generated => write!(f, "machine-generated"),
            Provenance::User => write!(f, "user-owned"),
        }
    }
}

/// True for `gen_sec_*` and `gen_tbl_*` ids with a non-empty suffix.
pub fn is_generated_id(id: &str) -> bool {
    id.strip_prefix(GENERATED_SECTION_PREFIX)
        .or_else(|| id.strip_prefix(GENERATED_TABLE_PREFIX))
        .is_some_and(|suffix| !suffix.is_empty())
}

/// True for `user_<kind>_*` ids where both the kind and the suffix are
/// non-empty.
pub fn is_user_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix(USER_PREFIX) else {
        return false;
    };
    match rest.split_once('_') {
        Some((kind, suffix)) => !kind.is_empty() && !suffix.is_empty(),
        None => false,
    }
}

/// Whether an id matches either recognized scheme.
pub fn validate_id_prefix(id: &str) -> bool {
    is_generated_id(id) || is_user_id(id)
}

/// Reject `operation` if `id` is machine-generated (or malformed).
///
/// Call this before mutating content on behalf of a user action: generated
/// content is only ever replaced wholesale by re-generation, never edited.
pub fn guard_generated_content(id: &str, operation: &str) -> Result<(), ProvenanceError> {
    match Provenance::of(id)? {
        Provenance::Generated => Err(ProvenanceError::ProvenanceViolation {
            id: id.to_string(),
            operation: operation.to_string(),
            provenance: Provenance::Generated,
        }),
        Provenance::User => Ok(()),
    }
}

/// Reject `operation` if `id` is user-owned (or malformed). The inverse
/// guard, for operations reserved to the generation pipeline.
pub fn guard_user_content(id: &str, operation: &str) -> Result<(), ProvenanceError> {
    match Provenance::of(id)? {
        Provenance::User => Err(ProvenanceError::ProvenanceViolation {
            id: id.to_string(),
            operation: operation.to_string(),
            provenance: Provenance::User,
        }),
        Provenance::Generated => Ok(()),
    }
}
