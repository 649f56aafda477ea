//! Error types for the editor

use itinera_engine::EngineError;
use itinera_model::{MigrationError, ProvenanceError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Provenance error: {0}")]
    Provenance(#[from] ProvenanceError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("No element with id `{0}` in the current structure")]
    UnknownElement(String),

    #[error("Id `{0}` belongs to no known component family")]
    UnknownTagFamily(String),

    #[error("An element with id `{0}` already exists")]
    DuplicateElement(String),
}
