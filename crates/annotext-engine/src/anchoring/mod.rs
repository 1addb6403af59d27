//! Annotations anchored in both the persisted document and the rendered tree.
//!
//! Every operation writes the persisted document first and touches the
//! rendered tree only once that write succeeded, so a failure never leaves an
//! overlay without a persisted property or the other way around.

mod error;

use std::collections::HashMap;

use annotext_config::DEFAULT_STYLE;

pub use error::{AnchorError, DetachError};

use crate::mapping::{advance_visible, forward_offset, inverse_offset, snap_to_word_boundary};
use crate::models::{Annotation, AnnotationDraft, AnnotationId};
use crate::persisted::{PersistedDocument, PersistedRange, Property, StoreError};
use crate::render::{Direction, InlineId, Navigable, RenderedTree, TextPosition};
use crate::styles::StyleResolver;

/// A user selection in the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl Selection {
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self { start, end }
    }
}

/// Outcome of [`AnnotationAnchor::load_existing`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub placed: usize,
    /// Annotations kept in the collection without an overlay because their
    /// start lies past the rendered text.
    pub unplaced: Vec<AnnotationId>,
}

/// Owns the annotation collection of one document and the overlay of each
/// annotation in its rendered tree.
#[derive(Debug)]
pub struct AnnotationAnchor<S> {
    store: S,
    annotations: Vec<Annotation>,
    overlays: HashMap<AnnotationId, InlineId>,
    last_id: u64,
}

impl<S: PersistedDocument> AnnotationAnchor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            annotations: Vec::new(),
            overlays: HashMap::new(),
            last_id: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        self.store.save()
    }

    /// Annotations in creation order; updates keep their index.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn overlay_of(&self, id: AnnotationId) -> Option<InlineId> {
        self.overlays.get(&id).copied()
    }

    /// Annotations grouped by style, groups ordered by first appearance.
    pub fn by_style(&self) -> Vec<(&str, Vec<&Annotation>)> {
        let mut groups: Vec<(&str, Vec<&Annotation>)> = Vec::new();
        for annotation in &self.annotations {
            match groups.iter_mut().find(|(kind, _)| *kind == annotation.kind) {
                Some((_, members)) => members.push(annotation),
                None => groups.push((&annotation.kind, vec![annotation])),
            }
        }
        groups
    }

    /// Annotates the canonical text under `selection`.
    ///
    /// Trailing whitespace in the selection is left out of the annotation and
    /// stays in the tree as it was.
    pub fn insert<R: StyleResolver + ?Sized>(
        &mut self,
        tree: &mut RenderedTree,
        styles: &R,
        selection: Selection,
        draft: AnnotationDraft,
    ) -> Result<Annotation, AnchorError> {
        let end = tree
            .insertion_position(selection.end, Direction::Backward)
            .filter(|end| *end > selection.start)
            .ok_or(AnchorError::EmptySelection)?;
        let end = if tree
            .text_between(selection.start, end)
            .ends_with(char::is_whitespace)
        {
            tree.next_insertion_position(end, Direction::Backward)
                .filter(|end| *end >= selection.start)
                .unwrap_or(selection.start)
        } else {
            end
        };

        let start_offset = canonical_offset(tree, selection.start)?;
        let end_offset = canonical_offset(tree, end)?;
        if end_offset <= start_offset {
            return Err(AnchorError::EmptySpan);
        }

        let range = self
            .store
            .range(start_offset, end_offset)
            .map_err(AnchorError::Store)?;
        let text = self.store.range_text(range).map_err(AnchorError::Store)?;
        self.store
            .attach(range, draft.property())
            .map_err(AnchorError::Attach)?;

        let annotation = Annotation {
            id: self.issue_id(),
            start: start_offset,
            end: end_offset,
            kind: draft.kind,
            literal: draft.literal,
            text,
            range,
        };
        // the overlay starts at the first character of the span, not at
        // whatever structure the selection began in
        let start = inverse_offset(tree, TextPosition(0), start_offset).unwrap_or(selection.start);
        self.place(tree, styles, &annotation, start, end, &annotation.text);

        log::debug!(
            "Inserted annotation {} {} {}",
            annotation.id,
            annotation.kind,
            annotation.range
        );
        self.annotations.push(annotation.clone());
        Ok(annotation)
    }

    /// Detaches the annotation and turns its overlay back into plain text.
    /// Unknown ids are ignored.
    pub fn remove<R: StyleResolver + ?Sized>(
        &mut self,
        tree: &mut RenderedTree,
        styles: &R,
        id: AnnotationId,
    ) -> Result<(), AnchorError> {
        let Some(index) = self.index_of(id) else {
            log::debug!("Ignoring removal of unknown annotation {id}");
            return Ok(());
        };
        let property = matching_property(&self.store, &self.annotations[index])?;
        self.store
            .detach(self.annotations[index].range, &property)
            .map_err(DetachError::Store)?;

        let annotation = self.annotations.remove(index);
        self.unplace(tree, styles, &annotation);
        log::debug!("Removed annotation {id}");
        Ok(())
    }

    /// Replaces the annotation with `draft`, on `draft.range` if given and on
    /// the same range otherwise. The replacement gets a new id and keeps the
    /// index of the annotation it replaces. On the same range it also keeps
    /// the overlay; a moved annotation gets a new overlay over its new span.
    pub fn update<R: StyleResolver + ?Sized>(
        &mut self,
        tree: &mut RenderedTree,
        styles: &R,
        id: AnnotationId,
        draft: AnnotationDraft,
    ) -> Result<Annotation, AnchorError> {
        let index = self
            .index_of(id)
            .ok_or(AnchorError::UnknownAnnotation(id))?;
        let old = &self.annotations[index];
        let old_property = matching_property(&self.store, old)?;
        let old_range = old.range;
        let range = draft.range.unwrap_or(old_range);
        let text = self.store.range_text(range).map_err(AnchorError::Store)?;

        self.store
            .detach(old_range, &old_property)
            .map_err(DetachError::Store)?;
        if let Err(err) = self.store.attach(range, draft.property()) {
            if let Err(rollback) = self.store.attach(old_range, old_property) {
                log::warn!("Could not restore annotation {id} after a failed update: {rollback}");
            }
            return Err(AnchorError::Attach(err));
        }

        let updated = Annotation {
            id: self.issue_id(),
            start: range.start(),
            end: range.end(),
            kind: draft.kind,
            literal: draft.literal,
            text,
            range,
        };
        let old = std::mem::replace(&mut self.annotations[index], updated.clone());
        if range == old_range {
            if let Some(inline) = self.overlays.remove(&id) {
                if let Some(overlay) = tree.overlay_mut(inline) {
                    overlay.tooltip = Some(updated.literal.clone());
                    styles.apply_style(&updated, overlay, &updated.kind);
                }
                self.overlays.insert(updated.id, inline);
            }
        } else {
            self.unplace(tree, styles, &old);
            match span_positions(tree, range) {
                Some((start, end)) => {
                    let visual = tree.visible_text(start, end);
                    self.place(tree, styles, &updated, start, end, &visual);
                }
                None => log::warn!(
                    "Annotation {} moved to {range}, past the end of the rendered text",
                    updated.id
                ),
            }
        }

        log::debug!("Updated annotation {id} to {}", updated.id);
        Ok(updated)
    }

    /// Rebuilds the collection and overlays from the properties already in
    /// the persisted document.
    pub fn load_existing<R: StyleResolver + ?Sized>(
        &mut self,
        tree: &mut RenderedTree,
        styles: &R,
    ) -> LoadReport {
        let mut report = LoadReport::default();

        for span in self.store.annotated_spans() {
            let text = match self.store.range_text(span.range) {
                Ok(text) => text,
                Err(err) => {
                    log::warn!("Skipping stored span {}: {err}", span.range);
                    continue;
                }
            };

            for property in span.properties {
                let annotation = Annotation {
                    id: self.issue_id(),
                    start: span.range.start(),
                    end: span.range.end(),
                    kind: property.kind().to_string(),
                    literal: property.value,
                    text: text.clone(),
                    range: span.range,
                };

                match locate(tree, &annotation) {
                    Some((start, end)) => {
                        let visual = tree.visible_text(start, end);
                        self.place(tree, styles, &annotation, start, end, &visual);
                        report.placed += 1;
                    }
                    None => {
                        log::warn!(
                            "Annotation {} ({} {}) lies past the end of the rendered text",
                            annotation.id,
                            annotation.kind,
                            annotation.range
                        );
                        report.unplaced.push(annotation.id);
                    }
                }
                self.annotations.push(annotation);
            }
        }

        log::debug!(
            "Loaded {} annotations, {} unplaced",
            self.annotations.len(),
            report.unplaced.len()
        );
        report
    }

    /// Re-applies the style of every overlay, after the style set changed.
    pub fn restyle_all<R: StyleResolver + ?Sized>(&self, tree: &mut RenderedTree, styles: &R) {
        for annotation in &self.annotations {
            let Some(&inline) = self.overlays.get(&annotation.id) else {
                continue;
            };
            if let Some(overlay) = tree.overlay_mut(inline) {
                styles.apply_style(annotation, overlay, &annotation.kind);
            }
        }
    }

    fn place<R: StyleResolver + ?Sized>(
        &mut self,
        tree: &mut RenderedTree,
        styles: &R,
        annotation: &Annotation,
        start: TextPosition,
        end: TextPosition,
        text: &str,
    ) {
        let inline = tree.replace_with_overlay(start, end, text, Some(annotation.literal.clone()));
        if let Some(overlay) = tree.overlay_mut(inline) {
            styles.apply_style(annotation, overlay, &annotation.kind);
        }
        self.overlays.insert(annotation.id, inline);
    }

    /// Turns the annotation's overlay back into default-styled text and hands
    /// characters it sat on back to the overlays beneath it.
    fn unplace<R: StyleResolver + ?Sized>(
        &mut self,
        tree: &mut RenderedTree,
        styles: &R,
        annotation: &Annotation,
    ) {
        let Some(inline) = self.overlays.remove(&annotation.id) else {
            return;
        };
        if let Some(overlay) = tree.overlay_mut(inline) {
            overlay.tooltip = None;
            styles.apply_style(annotation, overlay, DEFAULT_STYLE);
        }
        tree.release_overlay(inline);
    }

    fn index_of(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }

    fn issue_id(&mut self) -> AnnotationId {
        self.last_id += 1;
        AnnotationId::from_raw(self.last_id)
    }
}

fn canonical_offset(tree: &RenderedTree, position: TextPosition) -> Result<usize, AnchorError> {
    Ok(forward_offset(tree, TextPosition(0), position)?)
}

/// Tree positions around the canonical span of `range`.
fn span_positions(
    tree: &RenderedTree,
    range: PersistedRange,
) -> Option<(TextPosition, TextPosition)> {
    let start = inverse_offset(tree, TextPosition(0), range.start())?;
    let end = advance_visible(tree, start, range.len())?;
    Some((start, end))
}

/// Finds where a persisted annotation sits in the tree.
fn locate(tree: &RenderedTree, annotation: &Annotation) -> Option<(TextPosition, TextPosition)> {
    let from = inverse_offset(tree, tree.start(), annotation.start)?;
    // snapping would pull a span that begins with whitespace back onto the previous word
    let start = if annotation.text.starts_with(char::is_whitespace) {
        from
    } else {
        snap_to_word_boundary(tree, from)?.0
    };
    let mut end = advance_visible(tree, start, annotation.text.chars().count())?;
    if !tree.text_between(start, end).contains(&annotation.text) {
        if let Some(next) = tree.next_insertion_position(end, Direction::Forward) {
            end = next;
        }
    }
    Some((start, end))
}

/// The one persisted property on the annotation's range with its kind and literal.
fn matching_property<S: PersistedDocument>(
    store: &S,
    annotation: &Annotation,
) -> Result<Property, DetachError> {
    let mut matches = store
        .properties(annotation.range)
        .into_iter()
        .filter(|p| p.kind() == annotation.kind && p.value == annotation.literal);
    let first = matches.next();
    let others = matches.count();

    match first {
        Some(property) if others == 0 => Ok(property),
        Some(_) => Err(DetachError::Ambiguous {
            range: annotation.range,
            kind: annotation.kind.clone(),
            literal: annotation.literal.clone(),
            matches: others + 1,
        }),
        None => Err(DetachError::NotFound {
            range: annotation.range,
            kind: annotation.kind.clone(),
            literal: annotation.literal.clone(),
        }),
    }
}
