pub mod annotation;
pub mod document;
pub mod format;

pub use annotation::{Annotation, AnnotationDraft, AnnotationId};
pub use document::*;
pub use format::*;
