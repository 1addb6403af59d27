use crate::persisted::{PersistedRange, Property};

/// Session-unique handle for an annotation. Survives updates only by being re-issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(u64);

impl AnnotationId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed literal attached to the canonical span `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub start: usize,
    pub end: usize,
    /// Style name, also the last segment of the persisted property name.
    pub kind: String,
    pub literal: String,
    /// Persisted text of the span when the annotation was created or loaded.
    pub text: String,
    pub range: PersistedRange,
}

/// User input for a new or replacement annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDraft {
    pub kind: String,
    pub literal: String,
    /// Target range for an update. `None` keeps the range being replaced.
    pub range: Option<PersistedRange>,
}

impl AnnotationDraft {
    pub fn new(kind: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            literal: literal.into(),
            range: None,
        }
    }

    pub fn with_range(mut self, range: PersistedRange) -> Self {
        self.range = Some(range);
        self
    }

    /// The persisted property an annotation made from this draft carries.
    pub fn property(&self) -> Property {
        Property::typed(&self.kind, &self.literal)
    }
}
