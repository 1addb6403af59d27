//! Applies `w:rPr` children to a run's format.

use quick_xml::events::BytesStart;

use super::names::Tag;
use super::xml::{attr, on_off};
use crate::models::{BaselineShift, Color, RunFormat, TextDirection, Underline, UnderlineStyle};

pub(crate) fn apply(tag: Tag, e: &BytesStart<'_>, format: &mut RunFormat) {
    match tag {
        Tag::Bold => format.bold = on_off(e),
        Tag::Italic => format.italic = on_off(e),
        Tag::Strike => format.strike = on_off(e),
        Tag::Underline => {
            format.underline = attr(e, b"val")
                .as_deref()
                .and_then(UnderlineStyle::from_ooxml)
                .map(|style| Underline {
                    style,
                    color: attr(e, b"color").as_deref().and_then(Color::parse),
                });
        }
        Tag::VertAlign => {
            format.baseline = match attr(e, b"val").as_deref() {
                Some("subscript") => BaselineShift::Subscript,
                Some("superscript") => BaselineShift::Superscript,
                _ => BaselineShift::Baseline,
            };
        }
        Tag::Color => {
            // "auto" leaves the inherited color in place
            format.foreground = attr(e, b"val").as_deref().and_then(Color::parse);
        }
        Tag::Highlight => {
            format.background = attr(e, b"val").as_deref().and_then(Color::named);
        }
        Tag::Fonts => {
            if let Some(family) = attr(e, b"ascii") {
                format.font_family = Some(family);
            }
        }
        Tag::Size => {
            if let Some(half_points) = attr(e, b"val").and_then(|v| v.parse::<u32>().ok()) {
                // half-points to display points
                format.font_size = Some(half_points as f32 * 2.0 / 3.0);
            }
        }
        Tag::RightToLeft => {
            format.direction = if on_off(e) {
                TextDirection::RightToLeft
            } else {
                TextDirection::LeftToRight
            };
        }
        _ => {}
    }
}
