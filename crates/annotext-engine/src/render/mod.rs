//! The rendered tree: a flat stream of structural and character symbols built
//! from a [`DocumentModel`](crate::models::DocumentModel) for display and
//! selection.
//!
//! Positions sit *between* symbols. A position is an insertion position when
//! a caret could be placed there: right after a character, a line break, an
//! embedded object, or the opening of a paragraph.

mod overlay;
mod projector;

pub use overlay::{Overlay, OverlayStyle};
pub use projector::project;

use crate::models::{Image, RunFormat};

/// Index of a gap between two symbols of a [`RenderedTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition(pub usize);

impl TextPosition {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// What lies next to a position in a given direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerContext {
    /// A visible character.
    Text,
    /// A structural symbol, line break or embedded object.
    Boundary,
    /// The edge of the content.
    None,
}

/// Navigation over a sequence of positions.
///
/// Word snapping and offset mapping are written against this trait so they
/// can run over synthetic character sequences as well as a [`RenderedTree`].
pub trait Navigable {
    fn start(&self) -> TextPosition;
    fn end(&self) -> TextPosition;
    fn is_insertion_position(&self, position: TextPosition) -> bool;
    fn pointer_context(&self, position: TextPosition, direction: Direction) -> PointerContext;
    /// Neighbouring position, insertion or not.
    fn next_context_position(
        &self,
        position: TextPosition,
        direction: Direction,
    ) -> Option<TextPosition>;
    /// Up to `count` characters of the text run adjacent to `position`, nearest first.
    fn peek_run_text(&self, position: TextPosition, direction: Direction, count: usize) -> String;
    /// Text between two positions. Line breaks and paragraph ends read as `'\n'`.
    fn text_between(&self, from: TextPosition, to: TextPosition) -> String;

    fn next_insertion_position(
        &self,
        position: TextPosition,
        direction: Direction,
    ) -> Option<TextPosition> {
        let mut current = self.next_context_position(position, direction)?;
        while !self.is_insertion_position(current) {
            current = self.next_context_position(current, direction)?;
        }
        Some(current)
    }

    /// `position` itself if a caret can go there, otherwise the next one in `direction`.
    fn insertion_position(
        &self,
        position: TextPosition,
        direction: Direction,
    ) -> Option<TextPosition> {
        if self.is_insertion_position(position) {
            Some(position)
        } else {
            self.next_insertion_position(position, direction)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Paragraph,
    List,
    ListItem,
    Table,
    Row,
    Cell,
}

/// Handle of an inline (run, tab or overlay) that owns characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Open(NodeKind),
    Close(NodeKind),
    Char {
        ch: char,
        inline: InlineId,
        /// Overlays this character still belongs to underneath `inline`,
        /// outermost first.
        covered: Vec<InlineId>,
    },
    LineBreak,
    Object(Image),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedInline {
    Run(RunFormat),
    Tab(RunFormat),
    Overlay(Overlay),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedTree {
    symbols: Vec<Symbol>,
    inlines: Vec<RenderedInline>,
}

impl RenderedTree {
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn inline(&self, id: InlineId) -> Option<&RenderedInline> {
        self.inlines.get(id.0)
    }

    /// All text of the tree, as [`Navigable::text_between`] reads it.
    pub fn text(&self) -> String {
        self.text_between(TextPosition(0), self.end())
    }

    /// Only the characters between two positions, without line breaks.
    pub fn visible_text(&self, from: TextPosition, to: TextPosition) -> String {
        let end = to.0.min(self.symbols.len());
        let start = from.0.min(end);
        self.symbols[start..end]
            .iter()
            .filter_map(|symbol| match symbol {
                Symbol::Char { ch, .. } => Some(*ch),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    pub(crate) fn add_inline(&mut self, inline: RenderedInline) -> InlineId {
        self.inlines.push(inline);
        InlineId(self.inlines.len() - 1)
    }

    fn symbol_before(&self, position: TextPosition) -> Option<&Symbol> {
        position
            .0
            .checked_sub(1)
            .and_then(|i| self.symbols.get(i))
    }

    fn symbol_after(&self, position: TextPosition) -> Option<&Symbol> {
        self.symbols.get(position.0)
    }

    fn adjacent(&self, position: TextPosition, direction: Direction) -> Option<&Symbol> {
        match direction {
            Direction::Forward => self.symbol_after(position),
            Direction::Backward => self.symbol_before(position),
        }
    }
}

impl Navigable for RenderedTree {
    fn start(&self) -> TextPosition {
        self.insertion_position(TextPosition(0), Direction::Forward)
            .unwrap_or(TextPosition(0))
    }

    fn end(&self) -> TextPosition {
        TextPosition(self.symbols.len())
    }

    fn is_insertion_position(&self, position: TextPosition) -> bool {
        matches!(
            self.symbol_before(position),
            Some(
                Symbol::Char { .. }
                    | Symbol::LineBreak
                    | Symbol::Object(_)
                    | Symbol::Open(NodeKind::Paragraph)
            )
        )
    }

    fn pointer_context(&self, position: TextPosition, direction: Direction) -> PointerContext {
        match self.adjacent(position, direction) {
            Some(Symbol::Char { .. }) => PointerContext::Text,
            Some(_) => PointerContext::Boundary,
            None => PointerContext::None,
        }
    }

    fn next_context_position(
        &self,
        position: TextPosition,
        direction: Direction,
    ) -> Option<TextPosition> {
        match direction {
            Direction::Forward if position.0 < self.symbols.len() => {
                Some(TextPosition(position.0 + 1))
            }
            Direction::Backward if position.0 > 0 => Some(TextPosition(position.0 - 1)),
            _ => None,
        }
    }

    fn peek_run_text(&self, position: TextPosition, direction: Direction, count: usize) -> String {
        let Some(Symbol::Char { inline, .. }) = self.adjacent(position, direction) else {
            return String::new();
        };
        let owner = *inline;
        let mut out = String::new();
        let mut current = position;
        while out.chars().count() < count {
            match self.adjacent(current, direction) {
                Some(Symbol::Char { ch, inline, .. }) if *inline == owner => out.push(*ch),
                _ => break,
            }
            match self.next_context_position(current, direction) {
                Some(next) => current = next,
                None => break,
            }
        }
        out
    }

    fn text_between(&self, from: TextPosition, to: TextPosition) -> String {
        let end = to.0.min(self.symbols.len());
        let start = from.0.min(end);
        self.symbols[start..end]
            .iter()
            .filter_map(|symbol| match symbol {
                Symbol::Char { ch, .. } => Some(*ch),
                Symbol::LineBreak | Symbol::Close(NodeKind::Paragraph) => Some('\n'),
                _ => None,
            })
            .collect()
    }
}
