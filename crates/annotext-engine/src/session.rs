//! One open document: its model, rendered tree and annotations.

use std::path::{Path, PathBuf};

use annotext_config::StyleSet;
use thiserror::Error;

use crate::anchoring::{AnchorError, AnnotationAnchor, LoadReport, Selection};
use crate::models::{Annotation, AnnotationDraft, AnnotationId, DocumentModel};
use crate::parsing::{self, ParseError};
use crate::persisted::{PackageStore, PersistedDocument, StoreError};
use crate::render::{RenderedTree, project};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read document: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Anchor(#[from] AnchorError),
}

/// Owns everything derived from one `.docx` file. Opening another document
/// means dropping this session and opening a new one.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    model: DocumentModel,
    tree: RenderedTree,
    anchor: AnnotationAnchor<PackageStore>,
    styles: StyleSet,
    changed: bool,
    load_report: LoadReport,
}

impl Session {
    pub fn open<P: AsRef<Path>>(path: P, styles: StyleSet) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let package = std::fs::read(&path).map_err(ParseError::from)?;
        let model = parsing::convert_bytes(&package)?;
        let mut tree = project(&model);

        let store = PackageStore::from_package(&path, package, model.visible_text(), true)?;
        let mut anchor = AnnotationAnchor::new(store);
        let load_report = anchor.load_existing(&mut tree, &styles);

        log::info!(
            "Opened {}: {} paragraphs, {} annotations",
            path.display(),
            model.paragraph_count(),
            anchor.annotations().len()
        );

        Ok(Self {
            path,
            model,
            tree,
            anchor,
            styles,
            changed: false,
            load_report,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    pub fn tree(&self) -> &RenderedTree {
        &self.tree
    }

    pub fn anchor(&self) -> &AnnotationAnchor<PackageStore> {
        &self.anchor
    }

    pub fn styles(&self) -> &StyleSet {
        &self.styles
    }

    /// What happened to the annotations already stored in the document.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.anchor.annotations()
    }

    pub fn annotations_by_style(&self) -> Vec<(&str, Vec<&Annotation>)> {
        self.anchor.by_style()
    }

    /// Whether annotations changed since the document was opened or saved.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn insert(
        &mut self,
        selection: Selection,
        draft: AnnotationDraft,
    ) -> Result<Annotation, SessionError> {
        let annotation = self
            .anchor
            .insert(&mut self.tree, &self.styles, selection, draft)?;
        self.changed = true;
        Ok(annotation)
    }

    pub fn remove(&mut self, id: AnnotationId) -> Result<(), SessionError> {
        if self.anchor.get(id).is_none() {
            return Ok(());
        }
        self.anchor.remove(&mut self.tree, &self.styles, id)?;
        self.changed = true;
        Ok(())
    }

    pub fn update(
        &mut self,
        id: AnnotationId,
        draft: AnnotationDraft,
    ) -> Result<Annotation, SessionError> {
        let annotation = self
            .anchor
            .update(&mut self.tree, &self.styles, id, draft)?;
        self.changed = true;
        Ok(annotation)
    }

    /// Re-applies the current styles to every overlay.
    pub fn restyle(&mut self) {
        self.anchor.restyle_all(&mut self.tree, &self.styles);
    }

    /// Swaps in an edited style set and restyles every overlay with it.
    pub fn set_styles(&mut self, styles: StyleSet) {
        self.styles = styles;
        self.restyle();
    }

    pub fn save(&mut self) -> Result<(), SessionError> {
        self.anchor.save()?;
        self.changed = false;
        log::info!("Saved {}", self.path.display());
        Ok(())
    }

    /// Saves pending changes and releases the document.
    pub fn close(mut self) -> Result<(), SessionError> {
        if self.changed && self.anchor.store().is_writable() {
            self.save()?;
        }
        log::info!("Closed {}", self.path.display());
        Ok(())
    }
}
