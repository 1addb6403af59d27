pub mod anchoring;
pub mod mapping;
pub mod models;
pub mod parsing;
pub mod persisted;
pub mod render;
pub mod session;
pub mod styles;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use anchoring::{AnchorError, AnnotationAnchor, DetachError, LoadReport, Selection};
pub use mapping::{MappingError, advance_visible, forward_offset, inverse_offset, snap_to_word_boundary};
pub use models::{Annotation, AnnotationDraft, AnnotationId, DocumentModel};
pub use parsing::{ParseError, convert, convert_bytes, convert_reader};
pub use persisted::{MemoryStore, PackageStore, PersistedDocument, PersistedRange, Property, StoreError};
pub use render::{Direction, Navigable, RenderedTree, TextPosition, project};
pub use session::{Session, SessionError};
pub use styles::StyleResolver;
