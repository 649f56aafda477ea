//! # Itinera Model
//!
//! Typed content model for converted travel documents.
//!
//! A converted document has two halves with different ownership rules:
//! machine-generated content (sections, tables extracted from the upload)
//! is read-only after generation, while user elements (flight itineraries,
//! hotel lists) are created and edited through explicit user actions. The
//! [`SeparatedStructure`] aggregate keeps the halves apart and carries an
//! explicit render order in `layout`.
//!
//! Ownership is encoded in the id itself (`gen_sec_*`, `gen_tbl_*`,
//! `user_<kind>_*`); the [`provenance`] module decodes that prefix once at
//! the model boundary, and the [`migration`] module upgrades the legacy
//! flat aggregate to the separated one.

pub mod migration;
pub mod provenance;
pub mod structure;

pub use migration::{
    is_legacy_structure, is_separated_structure, migrate_to_separated_structure, migrate_value,
    MigrationError,
};
pub use provenance::{
    guard_generated_content, guard_user_content, is_generated_id, is_user_id, validate_id_prefix,
    Provenance, ProvenanceError,
};
pub use structure::{
    BBox, Block, BlockKind, GeneratedContent, Image, LayoutViolation, Section, SeparatedStructure,
    Structure, Table, UserContent, UserElement, UserElementKind,
};
