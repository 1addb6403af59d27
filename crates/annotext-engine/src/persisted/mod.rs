//! The canonical, durable side of a document.
//!
//! A [`PersistedDocument`] exposes the document's visible text addressed by
//! character offsets, and a set of properties attached to spans of it.
//! [`PackageStore`] keeps the properties inside the `.docx` package itself;
//! [`MemoryStore`] keeps everything in memory.

mod markup;
mod memory;
mod package_store;

use thiserror::Error;

pub use memory::MemoryStore;
pub use package_store::{ANNOTATIONS_PART, PackageStore};

use crate::parsing::ParseError;

/// Prefix of every annotation property name.
pub const TYPE_URI_BASE: &str = "https://annotext.dev/types/";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Package error: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid annotation markup at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Range {start}..{end} is outside the document text ({len} characters)")]
    OutOfRange { start: usize, end: usize, len: usize },

    #[error("Range {start}..{end} is empty")]
    EmptyRange { start: usize, end: usize },

    #[error("{property} is already attached to {range}")]
    DuplicateProperty {
        range: PersistedRange,
        property: Property,
    },

    #[error("{property} is not attached to {range}")]
    PropertyNotFound {
        range: PersistedRange,
        property: Property,
    },

    #[error("Document is open read-only")]
    ReadOnly,

    #[error("Malformed annotation markup: {0}")]
    Malformed(String),
}

/// A validated span `[start, end)` of the canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersistedRange {
    start: usize,
    end: usize,
}

impl PersistedRange {
    /// Checks `start < end <= len`.
    pub(crate) fn checked(start: usize, end: usize, len: usize) -> Result<Self, StoreError> {
        if end > len {
            return Err(StoreError::OutOfRange { start, end, len });
        }
        if start >= end {
            return Err(StoreError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for PersistedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A named literal attached to a span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    /// Absolute URI naming the property type.
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Property for an annotation of style `kind`.
    pub fn typed(kind: &str, literal: &str) -> Self {
        Self::new(format!("{TYPE_URI_BASE}{kind}"), literal)
    }

    /// Last path segment of the name.
    pub fn kind(&self) -> &str {
        let path = self.name.split(['?', '#']).next().unwrap_or(&self.name);
        path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> {:?}", self.name, self.value)
    }
}

/// A span together with every property attached to it, in attach order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSpan {
    pub range: PersistedRange,
    pub properties: Vec<Property>,
}

pub trait PersistedDocument {
    /// The canonical text.
    fn text(&self) -> &str;

    /// Validates `[start, end)` against the canonical text.
    fn range(&self, start: usize, end: usize) -> Result<PersistedRange, StoreError>;

    fn range_text(&self, range: PersistedRange) -> Result<String, StoreError>;

    fn properties(&self, range: PersistedRange) -> Vec<Property>;

    fn attach(&mut self, range: PersistedRange, property: Property) -> Result<(), StoreError>;

    fn detach(&mut self, range: PersistedRange, property: &Property) -> Result<(), StoreError>;

    /// Every span carrying at least one property, in persisted order.
    fn annotated_spans(&self) -> Vec<AnnotatedSpan>;

    fn save(&mut self) -> Result<(), StoreError>;

    fn is_writable(&self) -> bool;
}

/// Canonical text and its character count, shared by the store implementations.
#[derive(Debug, Clone, Default)]
pub(crate) struct CanonicalText {
    text: String,
    len: usize,
}

impl CanonicalText {
    pub(crate) fn new(text: String) -> Self {
        let len = text.chars().count();
        Self { text, len }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn range(&self, start: usize, end: usize) -> Result<PersistedRange, StoreError> {
        PersistedRange::checked(start, end, self.len)
    }

    pub(crate) fn slice(&self, range: PersistedRange) -> Result<String, StoreError> {
        // ranges may come from another store
        let range = self.range(range.start, range.end)?;
        Ok(self
            .text
            .chars()
            .skip(range.start)
            .take(range.len())
            .collect())
    }
}

/// Properties per span, kept in the order spans were first annotated.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SpanTable {
    spans: Vec<AnnotatedSpan>,
}

impl SpanTable {
    pub(crate) fn spans(&self) -> &[AnnotatedSpan] {
        &self.spans
    }

    pub(crate) fn properties(&self, range: PersistedRange) -> Vec<Property> {
        self.spans
            .iter()
            .find(|span| span.range == range)
            .map(|span| span.properties.clone())
            .unwrap_or_default()
    }

    pub(crate) fn attach(
        &mut self,
        range: PersistedRange,
        property: Property,
    ) -> Result<(), StoreError> {
        match self.spans.iter_mut().find(|span| span.range == range) {
            Some(span) if span.properties.contains(&property) => {
                Err(StoreError::DuplicateProperty { range, property })
            }
            Some(span) => {
                span.properties.push(property);
                Ok(())
            }
            None => {
                self.spans.push(AnnotatedSpan {
                    range,
                    properties: vec![property],
                });
                Ok(())
            }
        }
    }

    pub(crate) fn detach(
        &mut self,
        range: PersistedRange,
        property: &Property,
    ) -> Result<(), StoreError> {
        let not_found = || StoreError::PropertyNotFound {
            range,
            property: property.clone(),
        };
        let index = self
            .spans
            .iter()
            .position(|span| span.range == range)
            .ok_or_else(not_found)?;
        let span = &mut self.spans[index];
        let at = span
            .properties
            .iter()
            .position(|p| p == property)
            .ok_or_else(not_found)?;
        span.properties.remove(at);
        if span.properties.is_empty() {
            self.spans.remove(index);
        }
        Ok(())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
