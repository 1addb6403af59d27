//! Test helpers: in-memory `.docx` packages and a synthetic navigable text.

use std::io::{Cursor, Write};
use std::path::PathBuf;

use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::models::{Block, DocumentModel, Inline, Paragraph, Run};
use crate::render::{Direction, Navigable, PointerContext, TextPosition};

pub const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const IMAGE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Builds a minimal but valid word-processing package.
#[derive(Debug, Default)]
pub struct DocxBuilder {
    body: String,
    relationships: Vec<(String, String)>,
    parts: Vec<(String, Vec<u8>)>,
    skip_root_relationships: bool,
    skip_main_part: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A body paragraph holding one plain run.
    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            quick_xml::escape::escape(text)
        ));
        self
    }

    /// Appends raw body markup.
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// A paragraph whose only content is a picture referencing `rel_id`.
    pub fn picture(self, rel_id: &str) -> Self {
        self.raw(&format!(
            r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        ))
    }

    /// Registers an image part under `word/` and its relationship.
    pub fn image(mut self, rel_id: &str, target: &str, bytes: Vec<u8>) -> Self {
        self.relationships
            .push((rel_id.to_string(), target.to_string()));
        self.parts.push((format!("word/{target}"), bytes));
        self
    }

    pub fn part(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.parts.push((name.to_string(), bytes));
        self
    }

    pub fn without_root_relationships(mut self) -> Self {
        self.skip_root_relationships = true;
        self
    }

    pub fn without_main_part(mut self) -> Self {
        self.skip_main_part = true;
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{WORD_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            self.body
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, bytes: &[u8]| {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(bytes).unwrap();
        };

        add("[Content_Types].xml", content_types().as_bytes());
        if !self.skip_root_relationships {
            add(
                "_rels/.rels",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{OFFICE_DOCUMENT_REL}" Target="word/document.xml"/></Relationships>"#
                )
                .as_bytes(),
            );
        }
        if !self.skip_main_part {
            add("word/document.xml", self.document_xml().as_bytes());
        }
        let rels: String = self
            .relationships
            .iter()
            .map(|(id, target)| {
                format!(r#"<Relationship Id="{id}" Type="{IMAGE_REL}" Target="{target}"/>"#)
            })
            .collect();
        add(
            "word/_rels/document.xml.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            )
            .as_bytes(),
        );
        for (name, bytes) in &self.parts {
            add(name, bytes);
        }

        zip.finish().unwrap().into_inner()
    }

    /// Writes the package into `dir` and returns its path.
    pub fn write_to(&self, dir: &TempDir, file_name: &str) -> PathBuf {
        let path = dir.path().join(file_name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

fn content_types() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="jpeg" ContentType="image/jpeg"/><Override PartName="/word/document.xml" ContentType="{MAIN_CONTENT_TYPE}"/></Types>"#
    )
}

/// A solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// A model of plain paragraphs. `'\n'` inside a paragraph becomes a line break.
pub fn text_model(paragraphs: &[&str]) -> DocumentModel {
    let blocks = paragraphs
        .iter()
        .map(|text| {
            let mut inlines = Vec::new();
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    inlines.push(Inline::Break);
                }
                if !line.is_empty() {
                    inlines.push(Inline::Run(Run {
                        text: line.to_string(),
                        ..Default::default()
                    }));
                }
            }
            Block::Paragraph(Paragraph {
                inlines,
                ..Paragraph::new(30.0)
            })
        })
        .collect();
    DocumentModel { blocks }
}

/// A synthetic [`Navigable`] over a string.
///
/// `'{'` and `'}'` open and close a paragraph, `'\n'` is a line break and
/// every other character is visible text, so `"{ab}{cd}"` navigates like two
/// rendered paragraphs. The position after `'}'` is not an insertion position.
#[derive(Debug)]
pub struct CharSequence {
    symbols: Vec<char>,
}

impl CharSequence {
    pub fn new(text: &str) -> Self {
        Self {
            symbols: text.chars().collect(),
        }
    }

    fn adjacent(&self, position: TextPosition, direction: Direction) -> Option<char> {
        match direction {
            Direction::Forward => self.symbols.get(position.0).copied(),
            Direction::Backward => position
                .0
                .checked_sub(1)
                .and_then(|i| self.symbols.get(i).copied()),
        }
    }
}

fn is_visible(ch: char) -> bool {
    !matches!(ch, '{' | '}' | '\n')
}

impl Navigable for CharSequence {
    fn start(&self) -> TextPosition {
        self.insertion_position(TextPosition(0), Direction::Forward)
            .unwrap_or(TextPosition(0))
    }

    fn end(&self) -> TextPosition {
        TextPosition(self.symbols.len())
    }

    fn is_insertion_position(&self, position: TextPosition) -> bool {
        position.0 <= self.symbols.len()
            && self.adjacent(position, Direction::Backward).is_some_and(|ch| ch != '}')
    }

    fn pointer_context(&self, position: TextPosition, direction: Direction) -> PointerContext {
        match self.adjacent(position, direction) {
            Some(ch) if is_visible(ch) => PointerContext::Text,
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
        let mut out = String::new();
        let mut current = position;
        while out.chars().count() < count {
            match self.adjacent(current, direction) {
                Some(ch) if is_visible(ch) => out.push(ch),
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
            .filter_map(|&ch| match ch {
                '{' => None,
                '}' => Some('\n'),
                ch => Some(ch),
            })
            .collect()
    }
}
