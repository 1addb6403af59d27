use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::{
    AnnotatedSpan, CanonicalText, PersistedDocument, PersistedRange, Property, SpanTable,
    StoreError, markup,
};
use crate::parsing;

/// Package part holding the serialized span table.
pub const ANNOTATIONS_PART: &str = "annotext/annotations.xml";

/// A `.docx` package whose annotations are stored in [`ANNOTATIONS_PART`].
///
/// The package is read into memory on open. `save` rewrites the file, copying
/// every other entry unchanged.
#[derive(Debug)]
pub struct PackageStore {
    path: PathBuf,
    package: Vec<u8>,
    text: CanonicalText,
    spans: SpanTable,
    writable: bool,
    unsaved: bool,
}

impl PackageStore {
    pub fn open<P: AsRef<Path>>(path: P, writable: bool) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let package = std::fs::read(path)?;
        let text = parsing::convert_bytes(&package)?.visible_text();
        Self::from_package(path, package, text, writable)
    }

    /// Builds a store from package bytes already in memory. `text` must be
    /// the visible text of the package's main document.
    pub fn from_package(
        path: impl Into<PathBuf>,
        package: Vec<u8>,
        text: String,
        writable: bool,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let text = CanonicalText::new(text);
        let spans = match read_entry(&package, ANNOTATIONS_PART)? {
            Some(xml) => markup::read(&xml, &text)?,
            None => SpanTable::default(),
        };
        log::debug!(
            "Opened {} with {} annotated spans{}",
            path.display(),
            spans.spans().len(),
            if writable { "" } else { " (read-only)" }
        );

        Ok(Self {
            path,
            package,
            text,
            spans,
            writable,
            unsaved: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

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

impl PersistedDocument for PackageStore {
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

        let annotations = if self.spans.is_empty() {
            None
        } else {
            Some(markup::write(&self.spans)?)
        };
        let package = rewrite(&self.package, annotations.as_deref())?;

        let staging = self.path.with_extension("annotext-save");
        std::fs::write(&staging, &package)?;
        std::fs::rename(&staging, &self.path)?;

        self.package = package;
        self.unsaved = false;
        log::info!(
            "Saved {} annotated spans to {}",
            self.spans.spans().len(),
            self.path.display()
        );
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.writable
    }
}

fn read_entry(package: &[u8], name: &str) -> Result<Option<Vec<u8>>, StoreError> {
    let mut archive = ZipArchive::new(Cursor::new(package))?;
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

/// Copies every entry except the annotations part, then appends `annotations` if any.
fn rewrite(package: &[u8], annotations: Option<&[u8]>) -> Result<Vec<u8>, StoreError> {
    let mut archive = ZipArchive::new(Cursor::new(package))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        if entry.name() == ANNOTATIONS_PART {
            continue;
        }
        writer.raw_copy_file(entry)?;
    }

    if let Some(xml) = annotations {
        writer.start_file(ANNOTATIONS_PART, SimpleFileOptions::default())?;
        writer.write_all(xml)?;
    }

    Ok(writer.finish()?.into_inner())
}
