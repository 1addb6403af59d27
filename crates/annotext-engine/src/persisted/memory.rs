use super::{
    AnnotatedSpan, CanonicalText, PersistedDocument, PersistedRange, Property, SpanTable,
    StoreError,
};

/// A store without a backing file. `save` only clears the unsaved flag.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    text: CanonicalText,
    spans: SpanTable,
    writable: bool,
    unsaved: bool,
}

impl MemoryStore {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: CanonicalText::new(text.into()),
            spans: SpanTable::default(),
            writable: true,
            unsaved: false,
        }
    }

    pub fn read_only(text: impl Into<String>) -> Self {
        Self {
            writable: false,
            ..Self::new(text)
        }
    }

    /// Whether the span table changed since the last save.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.writable {
            Ok(())
        } else {
            Err(StoreError::ReadOnly)
        }
    }
}

impl PersistedDocument for MemoryStore {
    fn text(&self) -> &str {
        self.text.as_str()
    }

    fn range(&self, start: usize, end: usize) -> Result<PersistedRange, StoreError> {
        self.text.range(start, end)
    }

    fn range_text(&self, range: PersistedRange) -> Result<String, StoreError> {
        self.text.slice(range)
    }

    fn properties(&self, range: PersistedRange) -> Vec<Property> {
        self.spans.properties(range)
    }

    fn attach(&mut self, range: PersistedRange, property: Property) -> Result<(), StoreError> {
        self.check_writable()?;
        self.spans.attach(range, property)?;
        self.unsaved = true;
        Ok(())
    }

    fn detach(&mut self, range: PersistedRange, property: &Property) -> Result<(), StoreError> {
        self.check_writable()?;
        self.spans.detach(range, property)?;
        self.unsaved = true;
        Ok(())
    }

    fn annotated_spans(&self) -> Vec<AnnotatedSpan> {
        self.spans.spans().to_vec()
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.check_writable()?;
        self.unsaved = false;
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.writable
    }
}
