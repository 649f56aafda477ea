use itinera_model::ProvenanceError;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Provenance(#[from] ProvenanceError),

    /// The requested region is absent from the source. Read paths report
    /// this as `Ok(None)` instead; only operations that require the target
    /// to exist surface it as an error.
    #[error("no <{tag}> region with id `{id}` found in source")]
    NotFound { tag: String, id: String },

    /// The located region has mismatched opening/closing tags. This is a
    /// data-integrity bug in the upstream generator; the operation is
    /// aborted with no edit applied.
    #[error("unbalanced <{tag}> tags in region `{id}`")]
    TagImbalance { tag: String, id: String },

    #[error("record index {index} out of range ({len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Removing the last record would leave an empty required array, which
    /// is an invalid document state; the whole region must be removed
    /// instead.
    #[error("cannot remove the last remaining record; remove the whole section instead")]
    LastRecordViolation,

    #[error("attribute `{0}` not found in region")]
    MissingAttribute(String),
}
