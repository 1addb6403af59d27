//! Serialized form of the span table.
//!
//! ```xml
//! <annotations xmlns="https://annotext.dev/2024/annotations">
//!   <span start="0" end="5">
//!     <property name="https://annotext.dev/types/Note">greeting</property>
//!   </span>
//! </annotations>
//! ```

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{CanonicalText, Property, SpanTable, StoreError};
use crate::parsing::xml::{attr, local_name, resolve_entity};

pub(crate) const NAMESPACE: &str = "https://annotext.dev/2024/annotations";

pub(crate) fn write(table: &SpanTable) -> Result<Vec<u8>, StoreError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    let mut root = BytesStart::new("annotations");
    root.push_attribute(("xmlns", NAMESPACE));
    writer.write_event(Event::Start(root))?;

    for span in table.spans() {
        let start = span.range.start().to_string();
        let end = span.range.end().to_string();
        let mut element = BytesStart::new("span");
        element.push_attribute(("start", start.as_str()));
        element.push_attribute(("end", end.as_str()));
        writer.write_event(Event::Start(element))?;

        for property in &span.properties {
            let mut element = BytesStart::new("property");
            element.push_attribute(("name", property.name.as_str()));
            writer.write_event(Event::Start(element))?;
            writer.write_event(Event::Text(BytesText::new(&property.value)))?;
            writer.write_event(Event::End(BytesEnd::new("property")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("span")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("annotations")))?;
    Ok(writer.into_inner().into_inner())
}

/// Reads a span table, validating every range against `text`.
///
/// Spans that no longer fit the text, and repeated properties, are dropped
/// with a warning so one stale annotation does not make the whole document
/// unreadable.
pub(crate) fn read(xml: &[u8], text: &CanonicalText) -> Result<SpanTable, StoreError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut table = SpanTable::default();
    let mut span: Option<(usize, usize)> = None;
    let mut property: Option<(String, String)> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if local_name(e.name().as_ref()) == b"span" =>
            {
                span = Some((number(&e, b"start")?, number(&e, b"end")?));
            }
            Ok(Event::Start(e)) if local_name(e.name().as_ref()) == b"property" => {
                let name = attr(&e, b"name")
                    .ok_or_else(|| StoreError::Malformed("property without a name".into()))?;
                property = Some((name, String::new()));
            }
            Ok(Event::Text(t)) => {
                if let Some((_, value)) = property.as_mut() {
                    let decoded = t
                        .decode()
                        .map_err(|err| StoreError::Malformed(err.to_string()))?;
                    value.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some((_, value)) = property.as_mut() {
                    let name = r
                        .decode()
                        .map_err(|err| StoreError::Malformed(err.to_string()))?;
                    let resolved = resolve_entity(&name).ok_or_else(|| {
                        StoreError::Malformed(format!("unknown entity &{name};"))
                    })?;
                    value.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) if local_name(e.name().as_ref()) == b"property" => {
                if let Some((name, value)) = property.take() {
                    let (start, end) = span.ok_or_else(|| {
                        StoreError::Malformed("property outside of a span".into())
                    })?;
                    let attached = text
                        .range(start, end)
                        .and_then(|range| table.attach(range, Property::new(name.clone(), value)));
                    if let Err(err) = attached {
                        log::warn!("Dropping stored annotation {name}: {err}");
                    }
                }
            }
            Ok(Event::End(e)) if local_name(e.name().as_ref()) == b"span" => span = None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(StoreError::Xml {
                    position: reader.buffer_position(),
                    message: err.to_string(),
                });
            }
        }
        buf.clear();
    }

    Ok(table)
}

fn number(e: &BytesStart<'_>, name: &[u8]) -> Result<usize, StoreError> {
    let field = String::from_utf8_lossy(name);
    let raw = attr(e, name)
        .ok_or_else(|| StoreError::Malformed(format!("span without a {field} offset")))?;
    raw.trim()
        .parse()
        .map_err(|_| StoreError::Malformed(format!("span {field} offset {raw:?} is not a number")))
}
