//! Small helpers shared by the readers of package parts.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::ParseError;

/// Strips any namespace prefix from a qualified name.
pub(crate) fn local_name(raw: &[u8]) -> &[u8] {
    raw.rsplit(|b| *b == b':').next().unwrap_or(raw)
}

/// Splits `prefix:local`, with an empty prefix for unqualified names.
pub(crate) fn split_name(raw: &[u8]) -> (&[u8], &[u8]) {
    match raw.iter().position(|b| *b == b':') {
        Some(i) => (&raw[..i], &raw[i + 1..]),
        None => (&[], raw),
    }
}

/// Value of the first attribute whose local name is `name`, unescaped.
pub(crate) fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == name)
        .and_then(|a| {
            let raw = std::str::from_utf8(&a.value).ok()?;
            let value = quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw));
            Some(value.into_owned())
        })
}

/// OOXML on/off property: absent value or `1`/`on`/`true` switch it on.
pub(crate) fn on_off(e: &BytesStart<'_>) -> bool {
    match attr(e, b"val") {
        None => true,
        Some(v) => matches!(v.as_str(), "1" | "on" | "true"),
    }
}

/// Resolves a general entity reference such as `amp` or `#x9`.
pub(crate) fn resolve_entity(name: &str) -> Option<String> {
    let escaped = format!("&{name};");
    quick_xml::escape::unescape(&escaped)
        .ok()
        .map(Cow::into_owned)
}

pub(crate) fn xml_error(part: &str, position: u64, err: impl std::fmt::Display) -> ParseError {
    ParseError::Xml {
        part: part.to_string(),
        position,
        message: err.to_string(),
    }
}

/// Calls `f` with the local name of every start or empty element of `xml`.
pub(crate) fn scan_elements<F>(part: &str, xml: &[u8], mut f: F) -> Result<(), ParseError>
where
    F: FnMut(&[u8], &BytesStart<'_>),
{
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => f(local_name(e.name().as_ref()), &e),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(xml_error(part, reader.buffer_position(), err)),
        }
        buf.clear();
    }
    Ok(())
}
