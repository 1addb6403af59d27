use crate::render::{Direction, Navigable, PointerContext, TextPosition};

/// Range of the word around `position`.
///
/// Scans forward to the end of the word, then backward from there to its
/// start, so a position already at a word start still yields that word.
pub fn snap_to_word_boundary<N: Navigable + ?Sized>(
    nav: &N,
    position: TextPosition,
) -> Option<(TextPosition, TextPosition)> {
    let end = boundary_in_direction(nav, position, Direction::Forward)?;
    let start = boundary_in_direction(nav, end, Direction::Backward)?;
    Some((start, end))
}

fn boundary_in_direction<N: Navigable + ?Sized>(
    nav: &N,
    position: TextPosition,
    direction: Direction,
) -> Option<TextPosition> {
    let mut current = nav.insertion_position(position, direction)?;
    while !is_next_to_word_break(nav, current, direction) {
        current = nav.next_insertion_position(current, direction)?;
    }
    Some(current)
}

fn is_next_to_word_break<N: Navigable + ?Sized>(
    nav: &N,
    position: TextPosition,
    direction: Direction,
) -> bool {
    // next to an object or a block edge
    if nav.pointer_context(position, direction) != PointerContext::Text {
        return true;
    }
    let ahead = nav.peek_run_text(position, direction, 1).chars().next();
    let behind = nav
        .peek_run_text(position, direction.opposite(), 1)
        .chars()
        .next();
    ahead.is_some_and(char::is_whitespace) && !behind.is_some_and(char::is_whitespace)
}
