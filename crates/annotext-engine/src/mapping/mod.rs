//! Conversion between canonical character offsets and rendered positions.
//!
//! Canonical offsets count visible characters only. Walking the rendered tree
//! one insertion step at a time, a step counts when it lands right after
//! visible text and the text it crossed is not just line breaks.

mod word_break;

pub use word_break::snap_to_word_boundary;

use thiserror::Error;

use crate::render::{Direction, Navigable, PointerContext, TextPosition};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("position {to} precedes position {from}")]
    OutOfRange { from: usize, to: usize },
}

/// Number of visible characters between `from` and `to`.
pub fn forward_offset<N: Navigable + ?Sized>(
    nav: &N,
    from: TextPosition,
    to: TextPosition,
) -> Result<usize, MappingError> {
    if to < from {
        return Err(MappingError::OutOfRange {
            from: from.index(),
            to: to.index(),
        });
    }

    let mut count = 0;
    let mut current = from;
    while let Some(next) = nav.next_insertion_position(current, Direction::Forward) {
        if next > to {
            break;
        }
        if crosses_visible_text(nav, current, next) {
            count += 1;
        }
        current = next;
    }
    Ok(count)
}

/// Position right before the visible character `offset` characters after
/// `from`. `None` when the content ends first.
pub fn inverse_offset<N: Navigable + ?Sized>(
    nav: &N,
    from: TextPosition,
    offset: usize,
) -> Option<TextPosition> {
    let mut current = nav.insertion_position(from, Direction::Forward)?;
    let mut counted = 0;
    loop {
        if counted >= offset
            && nav.pointer_context(current, Direction::Forward) == PointerContext::Text
        {
            return Some(current);
        }
        let next = nav.next_insertion_position(current, Direction::Forward)?;
        if crosses_visible_text(nav, current, next) {
            counted += 1;
        }
        current = next;
    }
}

/// Moves forward across exactly `count` visible characters and stops right
/// after the last one.
pub fn advance_visible<N: Navigable + ?Sized>(
    nav: &N,
    from: TextPosition,
    count: usize,
) -> Option<TextPosition> {
    let mut current = from;
    let mut counted = 0;
    while counted < count {
        let next = nav.next_insertion_position(current, Direction::Forward)?;
        if crosses_visible_text(nav, current, next) {
            counted += 1;
        }
        current = next;
    }
    Some(current)
}

fn crosses_visible_text<N: Navigable + ?Sized>(
    nav: &N,
    current: TextPosition,
    next: TextPosition,
) -> bool {
    let crossed = nav.text_between(current, next);
    let breaks_only = !crossed.is_empty() && crossed.chars().all(|ch| ch == '\n');
    !breaks_only && nav.pointer_context(next, Direction::Backward) == PointerContext::Text
}
