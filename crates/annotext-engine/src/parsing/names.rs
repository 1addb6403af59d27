//! Classification of main-document element names.

use quick_xml::events::BytesStart;

use super::xml::{local_name, split_name};

const WORDPROCESSING_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const STRICT_WORDPROCESSING_NS: &[u8] = b"http://purl.oclc.org/ooxml/wordprocessingml/main";

/// Elements the converter reacts to. Everything else is [`Tag::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Body,
    Paragraph,
    ParagraphProps,
    Indent,
    Justification,
    NumberingProps,
    NumberingId,
    NumberingLevel,
    Run,
    RunProps,
    Text,
    Tab,
    Break,
    CarriageReturn,
    Bold,
    Italic,
    Underline,
    Strike,
    VertAlign,
    Color,
    Highlight,
    Fonts,
    Size,
    RightToLeft,
    Table,
    GridColumn,
    Row,
    Cell,
    CellProps,
    GridSpan,
    Blip,
    Fallback,
    Other,
}

/// Maps qualified names to tags using the prefix the document binds to the
/// wordprocessing namespace.
#[derive(Debug, Clone)]
pub(crate) struct Names {
    word_prefix: Vec<u8>,
}

impl Default for Names {
    fn default() -> Self {
        Self {
            word_prefix: b"w".to_vec(),
        }
    }
}

impl Names {
    /// Picks up namespace declarations from the document element.
    pub(crate) fn learn(&mut self, root: &BytesStart<'_>) {
        for attr in root.attributes().flatten() {
            let key = attr.key.as_ref();
            let Some(prefix) = key.strip_prefix(b"xmlns:") else {
                continue;
            };
            let uri: &[u8] = &attr.value;
            if uri == WORDPROCESSING_NS || uri == STRICT_WORDPROCESSING_NS {
                self.word_prefix = prefix.to_vec();
            }
        }
    }

    pub(crate) fn tag(&self, qname: &[u8]) -> Tag {
        let (prefix, local) = split_name(qname);
        if prefix != self.word_prefix.as_slice() {
            return match local_name(qname) {
                b"blip" => Tag::Blip,
                b"Fallback" => Tag::Fallback,
                _ => Tag::Other,
            };
        }
        match local {
            b"body" => Tag::Body,
            b"p" => Tag::Paragraph,
            b"pPr" => Tag::ParagraphProps,
            b"ind" => Tag::Indent,
            b"jc" => Tag::Justification,
            b"numPr" => Tag::NumberingProps,
            b"numId" => Tag::NumberingId,
            b"ilvl" => Tag::NumberingLevel,
            b"r" => Tag::Run,
            b"rPr" => Tag::RunProps,
            b"t" => Tag::Text,
            b"tab" => Tag::Tab,
            b"br" => Tag::Break,
            b"cr" => Tag::CarriageReturn,
            b"b" => Tag::Bold,
            b"i" => Tag::Italic,
            b"u" => Tag::Underline,
            b"strike" => Tag::Strike,
            b"vertAlign" => Tag::VertAlign,
            b"color" => Tag::Color,
            b"highlight" => Tag::Highlight,
            b"rFonts" => Tag::Fonts,
            b"sz" => Tag::Size,
            b"rtl" => Tag::RightToLeft,
            b"tbl" => Tag::Table,
            b"gridCol" => Tag::GridColumn,
            b"tr" => Tag::Row,
            b"tc" => Tag::Cell,
            b"tcPr" => Tag::CellProps,
            b"gridSpan" => Tag::GridSpan,
            _ => Tag::Other,
        }
    }
}
