use annotext_config::{DEFAULT_STYLE, FontStretch, FontStyle, FontWeight, Preset};

use super::{InlineId, RenderedInline, RenderedTree, Symbol, TextPosition};
use crate::models::Color;

/// An inline wrapping the span of one annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Shown on hover; the annotation literal, or `None` once detached.
    pub tooltip: Option<String>,
    pub style: OverlayStyle,
}

/// Display formatting of an overlay, resolved from a style preset.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    /// Name of the preset this was resolved from.
    pub name: String,
    pub foreground: Color,
    pub background: Color,
    pub font_family: String,
    pub font_size: f32,
    pub font_style: FontStyle,
    pub weight: FontWeight,
    pub stretch: FontStretch,
}

impl OverlayStyle {
    /// Colors that fail to parse fall back to black on white.
    pub fn from_preset(name: &str, preset: &Preset) -> Self {
        Self {
            name: name.to_string(),
            foreground: Color::parse(&preset.foreground).unwrap_or(Color::BLACK),
            background: Color::parse(&preset.background).unwrap_or(Color::WHITE),
            font_family: preset.font_family.clone(),
            font_size: preset.font_size,
            font_style: preset.style,
            weight: preset.weight,
            stretch: preset.stretch,
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from_preset(DEFAULT_STYLE, &Preset::builtin_default())
    }
}

impl RenderedTree {
    /// Replaces the characters and line breaks in `[start, end)` with `text`
    /// owned by a new overlay. Structural symbols and objects in the range
    /// stay where they are.
    ///
    /// Overlays that owned the replaced characters keep them underneath the
    /// new one and get them back from [`release_overlay`](Self::release_overlay).
    pub fn replace_with_overlay(
        &mut self,
        start: TextPosition,
        end: TextPosition,
        text: &str,
        tooltip: Option<String>,
    ) -> InlineId {
        let id = self.add_inline(RenderedInline::Overlay(Overlay {
            tooltip,
            style: OverlayStyle::default(),
        }));

        let len = self.symbols.len();
        let start = start.0.min(len);
        let end = end.0.clamp(start, len);

        let mut beneath = Vec::new();
        let mut kept = Vec::new();
        for symbol in self.symbols.drain(start..end) {
            match symbol {
                Symbol::Char {
                    inline,
                    mut covered,
                    ..
                } => {
                    if matches!(self.inlines.get(inline.0), Some(RenderedInline::Overlay(_))) {
                        covered.push(inline);
                    }
                    beneath.push(covered);
                }
                Symbol::LineBreak => {}
                other => kept.push(other),
            }
        }

        let mut beneath = beneath.into_iter();
        let replacement: Vec<Symbol> = text
            .chars()
            .map(|ch| Symbol::Char {
                ch,
                inline: id,
                covered: beneath.next().unwrap_or_default(),
            })
            .chain(kept)
            .collect();
        self.symbols.splice(start..start, replacement);

        log::debug!(
            "overlay {:?} placed at {start} over {} chars",
            id,
            text.chars().count()
        );
        id
    }

    /// Hands the overlay's characters back to the overlays it was placed
    /// over. Characters it took from plain text stay with it.
    pub fn release_overlay(&mut self, id: InlineId) {
        let mut returned = 0;
        for symbol in &mut self.symbols {
            let Symbol::Char { inline, covered, .. } = symbol else {
                continue;
            };
            if *inline == id {
                if let Some(beneath) = covered.pop() {
                    *inline = beneath;
                    returned += 1;
                }
            } else {
                covered.retain(|owner| *owner != id);
            }
        }
        log::debug!("overlay {id:?} released, {returned} chars handed back");
    }

    pub fn overlay(&self, id: InlineId) -> Option<&Overlay> {
        match self.inlines.get(id.0) {
            Some(RenderedInline::Overlay(overlay)) => Some(overlay),
            _ => None,
        }
    }

    pub fn overlay_mut(&mut self, id: InlineId) -> Option<&mut Overlay> {
        match self.inlines.get_mut(id.0) {
            Some(RenderedInline::Overlay(overlay)) => Some(overlay),
            _ => None,
        }
    }

    /// The characters the overlay wraps, including those a later overlay
    /// currently sits on.
    pub fn overlay_text(&self, id: InlineId) -> String {
        self.symbols
            .iter()
            .filter(|symbol| wraps(symbol, id))
            .filter_map(|symbol| match symbol {
                Symbol::Char { ch, .. } => Some(*ch),
                _ => None,
            })
            .collect()
    }

    /// Positions before the first and after the last character of the overlay.
    pub fn overlay_range(&self, id: InlineId) -> Option<(TextPosition, TextPosition)> {
        let first = self.symbols.iter().position(|s| wraps(s, id))?;
        let last = self.symbols.iter().rposition(|s| wraps(s, id))?;
        Some((TextPosition(first), TextPosition(last + 1)))
    }
}

fn wraps(symbol: &Symbol, id: InlineId) -> bool {
    matches!(symbol, Symbol::Char { inline, covered, .. } if *inline == id || covered.contains(&id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, DocumentModel, Inline, Paragraph, Run};
    use crate::render::{Navigable, project};
    use pretty_assertions::assert_eq;

    fn hello() -> RenderedTree {
        project(&DocumentModel {
            blocks: vec![Block::Paragraph(Paragraph {
                inlines: vec![
                    Inline::Run(Run {
                        text: "Hello".to_string(),
                        ..Default::default()
                    }),
                    Inline::Break,
                    Inline::Run(Run {
                        text: "world.".to_string(),
                        ..Default::default()
                    }),
                ],
                ..Paragraph::new(0.0)
            })],
        })
    }

    #[test]
    fn overlay_replaces_characters_and_breaks() {
        let mut tree = hello();

        // "o" of Hello through "w" of world, across the line break
        let id = tree.replace_with_overlay(
            TextPosition(5),
            TextPosition(8),
            "ow",
            Some("lit".to_string()),
        );

        assert_eq!(tree.text(), "Helloworld.\n");
        assert_eq!(tree.overlay_text(id), "ow");
        assert_eq!(
            tree.overlay_range(id),
            Some((TextPosition(5), TextPosition(7)))
        );
        assert_eq!(tree.overlay(id).unwrap().tooltip.as_deref(), Some("lit"));
        assert_eq!(tree.overlay(id).unwrap().style.name, DEFAULT_STYLE);
    }

    #[test]
    fn overlay_keeps_positions_of_plain_text() {
        let mut tree = hello();
        let before = tree.end();

        tree.replace_with_overlay(TextPosition(1), TextPosition(6), "Hello", None);

        assert_eq!(tree.end(), before);
        assert_eq!(tree.text(), "Hello\nworld.\n");
    }

    #[test]
    fn later_overlay_nests_inside_earlier_one() {
        let mut tree = hello();
        let outer = tree.replace_with_overlay(TextPosition(1), TextPosition(6), "Hello", None);

        let inner = tree.replace_with_overlay(TextPosition(2), TextPosition(4), "el", None);

        assert_eq!(tree.overlay_text(outer), "Hello");
        assert_eq!(tree.overlay_text(inner), "el");
        assert_eq!(
            tree.overlay_range(outer),
            Some((TextPosition(1), TextPosition(6)))
        );
        assert_eq!(tree.text(), "Hello\nworld.\n");
    }

    #[test]
    fn released_overlay_hands_characters_back() {
        let mut tree = hello();
        let outer = tree.replace_with_overlay(TextPosition(1), TextPosition(6), "Hello", None);
        let inner = tree.replace_with_overlay(TextPosition(2), TextPosition(4), "el", None);

        tree.release_overlay(inner);

        assert_eq!(tree.overlay_text(outer), "Hello");
        assert_eq!(tree.overlay_text(inner), "");
        let owners: Vec<InlineId> = tree.symbols()[1..6]
            .iter()
            .filter_map(|symbol| match symbol {
                Symbol::Char { inline, .. } => Some(*inline),
                _ => None,
            })
            .collect();
        assert_eq!(owners, vec![outer; 5]);
    }

    #[test]
    fn releasing_the_outer_overlay_leaves_the_inner_one() {
        let mut tree = hello();
        let outer = tree.replace_with_overlay(TextPosition(1), TextPosition(6), "Hello", None);
        let inner = tree.replace_with_overlay(TextPosition(2), TextPosition(4), "el", None);

        tree.release_overlay(outer);

        // plain characters stay with the released overlay
        assert_eq!(tree.overlay_text(outer), "Hlo");
        assert_eq!(tree.overlay_text(inner), "el");
        tree.release_overlay(inner);
        assert_eq!(tree.overlay_text(inner), "el");
    }

    #[test]
    fn only_overlays_are_returned() {
        let tree = hello();

        assert!(tree.overlay(InlineId(0)).is_none());
        assert!(tree.overlay(InlineId(99)).is_none());
    }

    #[test]
    fn unparseable_preset_colors_fall_back() {
        let preset = Preset {
            foreground: "chartreuse-ish".to_string(),
            background: "#FFFF00".to_string(),
            ..Preset::builtin_default()
        };

        let style = OverlayStyle::from_preset("Note", &preset);

        assert_eq!(style.foreground, Color::BLACK);
        assert_eq!(style.background, Color::rgb(0xFF, 0xFF, 0));
    }
}
