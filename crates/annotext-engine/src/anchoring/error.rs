use thiserror::Error;

use crate::mapping::MappingError;
use crate::models::AnnotationId;
use crate::persisted::{PersistedRange, StoreError};

#[derive(Debug, Error)]
pub enum DetachError {
    #[error("No {kind} property {literal:?} on {range}")]
    NotFound {
        range: PersistedRange,
        kind: String,
        literal: String,
    },

    #[error("{matches} {kind} properties {literal:?} on {range}, refusing to pick one")]
    Ambiguous {
        range: PersistedRange,
        kind: String,
        literal: String,
        matches: usize,
    },

    #[error(transparent)]
    Store(StoreError),
}

#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("Selection is empty")]
    EmptySelection,

    #[error("Selection covers no visible text")]
    EmptySpan,

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Failed to attach annotation: {0}")]
    Attach(StoreError),

    #[error("Failed to detach annotation: {0}")]
    Detach(#[from] DetachError),

    #[error("Unknown annotation {0}")]
    UnknownAnnotation(AnnotationId),

    #[error(transparent)]
    Store(StoreError),
}
