// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog while the band plays on.";

#[allow(dead_code)]
pub fn generate_docx(paragraphs: usize) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..paragraphs {
        match i % 4 {
            0 => body.push_str(&format!(
                r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Section {i}</w:t></w:r></w:p>"#
            )),
            1 => body.push_str(&format!(
                r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{PARAGRAPH} </w:t></w:r><w:r><w:tab/><w:t>tail</w:t><w:br/><w:t>next line</w:t></w:r></w:p>"#
            )),
            2 => body.push_str(&format!(
                r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell {i}</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>{PARAGRAPH}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#
            )),
            _ => body.push_str(&format!(
                r#"<w:p><w:r><w:rPr><w:i/><w:color w:val="1F4E79"/></w:rPr><w:t>{PARAGRAPH}</w:t></w:r></w:p>"#
            )),
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut add = |name: &str, content: &str| {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    };
    add(
        "[Content_Types].xml",
        r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#,
    );
    add(
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#,
    );
    add(
        "word/document.xml",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        ),
    );
    zip.finish().unwrap().into_inner()
}
