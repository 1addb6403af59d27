//! The streaming pass over the main document part.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::ParseError;
use super::media::ImageSource;
use super::names::{Names, Tag};
use super::state::ParserState;
use super::xml::{resolve_entity, xml_error};
use crate::models::DocumentModel;

/// Converts the main document part in a single forward pass.
///
/// `mc:Fallback` subtrees are skipped whole: they repeat the content of the
/// preceding `mc:Choice` for older consumers.
pub(crate) fn read_document(
    part: &str,
    xml: &[u8],
    images: &mut dyn ImageSource,
) -> Result<DocumentModel, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut names = Names::default();
    let mut state = ParserState::new(images);
    let mut skip_depth = 0usize;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|err| xml_error(part, reader.buffer_position(), err))?
        {
            Event::Start(e) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                } else {
                    if state.depth() == 0 {
                        names.learn(&e);
                    }
                    match names.tag(e.name().as_ref()) {
                        Tag::Fallback => skip_depth = 1,
                        tag => state.start(tag, &e)?,
                    }
                }
            }
            Event::Empty(e) => {
                if skip_depth == 0 {
                    match names.tag(e.name().as_ref()) {
                        Tag::Fallback => {}
                        tag => {
                            state.start(tag, &e)?;
                            state.end()?;
                        }
                    }
                }
            }
            Event::End(_) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                } else {
                    state.end()?;
                }
            }
            Event::Text(t) if skip_depth == 0 => {
                let text = t
                    .decode()
                    .map_err(|err| xml_error(part, reader.buffer_position(), err))?;
                state.text(&text);
            }
            Event::CData(t) if skip_depth == 0 => {
                let text = reader
                    .decoder()
                    .decode(&t)
                    .map_err(|err| xml_error(part, reader.buffer_position(), err))?;
                state.text(&text);
            }
            Event::GeneralRef(r) if skip_depth == 0 => {
                let name = r
                    .decode()
                    .map_err(|err| xml_error(part, reader.buffer_position(), err))?;
                match resolve_entity(&name) {
                    Some(resolved) => state.text(&resolved),
                    None => log::debug!("Ignoring unknown entity &{name}; in {part}"),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    state.finish()
}
