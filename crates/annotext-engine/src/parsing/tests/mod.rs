//! Integration tests for the parsing module.
//!
//! Packages are assembled in memory with [`DocxBuilder`]; expectations are
//! written against the model outline.

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::models::{Block, Color, Inline};
use crate::parsing::{ParseError, convert, convert_bytes};
use crate::tests::{DocxBuilder, png_bytes};

fn outline(builder: DocxBuilder) -> String {
    convert_bytes(&builder.build()).unwrap().outline()
}

fn numbered(num_id: &str, level: u32, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="{level}"/><w:numId w:val="{num_id}"/></w:numPr></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#
    )
}

fn cell(text: &str) -> String {
    format!("<w:tc><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc>")
}

// Paragraph formatting

#[test]
fn paragraph_defaults_and_overrides() {
    let doc = DocxBuilder::new()
        .raw(r#"<w:p><w:pPr><w:jc w:val="center"/><w:ind w:firstLine="472"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="36"/></w:rPr><w:t>Title</w:t></w:r></w:p>"#)
        .raw(r#"<w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:rPr><w:i/><w:color w:val="FF0000"/></w:rPr><w:t>world</w:t></w:r><w:r><w:t>.</w:t></w:r></w:p>"#);

    insta::assert_snapshot!(outline(doc), @r#"
    paragraph indent=20.0 align=Center
      run "Title" bold size=24.0
    paragraph indent=30.0 align=Left
      run "Hello "
      run "world" italic color=#FF0000
      run "."
    "#);
}

#[test]
fn unknown_alignment_keeps_left() {
    let doc = DocxBuilder::new().raw(
        r#"<w:p><w:pPr><w:jc w:val="distribute"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#,
    );

    assert_eq!(
        outline(doc),
        "paragraph indent=30.0 align=Left\n  run \"x\"\n"
    );
}

#[test]
fn paragraph_mark_properties_do_not_format_runs() {
    let doc = DocxBuilder::new().raw(
        r#"<w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>plain</w:t></w:r></w:p>"#,
    );

    assert_eq!(
        outline(doc),
        "paragraph indent=30.0 align=Left\n  run \"plain\"\n"
    );
}

// Inline content

#[test]
fn breaks_tabs_and_preserved_space() {
    let doc = DocxBuilder::new().raw(
        r#"<w:p><w:r><w:t>line one</w:t><w:br/><w:t>line two</w:t><w:tab/><w:t>x</w:t></w:r><w:r><w:t xml:space="preserve"></w:t></w:r></w:p>"#,
    );

    insta::assert_snapshot!(outline(doc), @r#"
    paragraph indent=30.0 align=Left
      run "line one"
      break
      run "line two"
      tab
      run "x"
      run " "
    "#);
}

#[test]
fn text_split_by_break_keeps_run_format() {
    let model = convert_bytes(
        &DocxBuilder::new()
            .raw(r#"<w:p><w:r><w:rPr><w:highlight w:val="cyan"/></w:rPr><w:t>a</w:t><w:cr/><w:t>b</w:t></w:r></w:p>"#)
            .build(),
    )
    .unwrap();

    let Block::Paragraph(p) = &model.blocks[0] else {
        panic!("expected a paragraph");
    };
    let backgrounds: Vec<_> = p
        .inlines
        .iter()
        .filter_map(|i| match i {
            Inline::Run(run) => Some(run.format.background),
            _ => None,
        })
        .collect();
    assert_eq!(backgrounds, vec![Some(Color::rgb(0, 0xFF, 0xFF)); 2]);
}

#[test]
fn entities_are_decoded_into_text() {
    let model = convert_bytes(
        &DocxBuilder::new()
            .raw("<w:p><w:r><w:t>Fish &amp; chips &#x263A;</w:t></w:r></w:p>")
            .build(),
    )
    .unwrap();

    assert_eq!(model.visible_text(), "Fish & chips \u{263A}");
}

#[test]
fn deleted_and_field_code_text_is_not_visible() {
    let model = convert_bytes(
        &DocxBuilder::new()
            .raw(r#"<w:p><w:del><w:r><w:delText>gone</w:delText></w:r></w:del><w:r><w:instrText> PAGE </w:instrText></w:r><w:ins><w:r><w:t>new</w:t></w:r></w:ins></w:p>"#)
            .build(),
    )
    .unwrap();

    assert_eq!(model.visible_text(), "new");
}

// Placeholder pruning

#[test]
fn placeholder_paragraphs_are_pruned() {
    let doc = DocxBuilder::new()
        .raw("<w:p/>")
        .raw("<w:p><w:r><w:br/></w:r></w:p>")
        .raw(r#"<w:p><w:r><w:t xml:space="preserve"> </w:t></w:r></w:p>"#)
        .raw("<w:p><w:r></w:r></w:p>")
        .paragraph("kept");

    insta::assert_snapshot!(outline(doc), @r#"
    paragraph indent=30.0 align=Left
    paragraph indent=30.0 align=Left
      run "kept"
    "#);
}

// Lists

#[test]
fn lists_group_by_numbering_id() {
    let doc = DocxBuilder::new()
        .raw(&numbered("3", 0, "one"))
        .raw(&numbered("3", 1, "two"))
        .raw(&numbered("4", 0, "other"))
        .paragraph("after")
        .raw(&numbered("4", 0, "again"));

    insta::assert_snapshot!(outline(doc), @r#"
    list id=3
      item level=0 margin=20.0
        paragraph indent=0.0 align=Left
          run "one"
      item level=1 margin=40.0
        paragraph indent=0.0 align=Left
          run "two"
    list id=4
      item level=0 margin=20.0
        paragraph indent=0.0 align=Left
          run "other"
    paragraph indent=30.0 align=Left
      run "after"
    list id=4
      item level=0 margin=20.0
        paragraph indent=0.0 align=Left
          run "again"
    "#);
}

#[test]
fn numbering_id_zero_is_not_a_list() {
    let doc = DocxBuilder::new().raw(&numbered("0", 0, "plain"));

    assert_eq!(
        outline(doc),
        "paragraph indent=30.0 align=Left\n  run \"plain\"\n"
    );
}

// Tables

#[test]
fn table_last_cell_absorbs_remaining_columns() {
    let doc = DocxBuilder::new().raw(&format!(
        r#"<w:tbl><w:tblGrid><w:gridCol/><w:gridCol/><w:gridCol/></w:tblGrid><w:tr>{}{}</w:tr><w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>wide</w:t></w:r></w:p></w:tc>{}</w:tr><w:tr>{}{}{}</w:tr></w:tbl>"#,
        cell("a"),
        cell("b"),
        cell("c"),
        cell("x"),
        cell("y"),
        cell("z"),
    ));

    insta::assert_snapshot!(outline(doc), @r#"
    table columns=3
      row
        cell span=1
          paragraph indent=0.0 align=Left
            run "a"
        cell span=2
          paragraph indent=0.0 align=Left
            run "b"
      row
        cell span=2
          paragraph indent=0.0 align=Left
            run "wide"
        cell span=1
          paragraph indent=0.0 align=Left
            run "c"
      row
        cell span=1
          paragraph indent=0.0 align=Left
            run "x"
        cell span=1
          paragraph indent=0.0 align=Left
            run "y"
        cell span=1
          paragraph indent=0.0 align=Left
            run "z"
    "#);
}

#[test]
fn nested_table_and_list_stay_inside_cell() {
    let doc = DocxBuilder::new().raw(&format!(
        r#"<w:tbl><w:tblGrid><w:gridCol/></w:tblGrid><w:tr><w:tc>{}<w:tbl><w:tblGrid><w:gridCol/></w:tblGrid><w:tr>{}</w:tr></w:tbl></w:tc></w:tr></w:tbl>"#,
        numbered("7", 0, "item"),
        cell("inner"),
    ));

    insta::assert_snapshot!(outline(doc), @r#"
    table columns=1
      row
        cell span=1
          list id=7
            item level=0 margin=20.0
              paragraph indent=0.0 align=Left
                run "item"
          table columns=1
            row
              cell span=1
                paragraph indent=0.0 align=Left
                  run "inner"
    "#);
}

// Images

#[test]
fn images_follow_their_paragraph() {
    let doc = DocxBuilder::new()
        .image("rIdImg1", "media/pic.png", png_bytes(4, 3))
        .paragraph("before")
        .picture("rIdImg1");

    insta::assert_snapshot!(outline(doc), @r#"
    paragraph indent=30.0 align=Left
      run "before"
    image word/media/pic.png 4x3 scale=0.8
    "#);
}

#[test]
fn images_in_tables_are_scaled_down() {
    let doc = DocxBuilder::new()
        .image("rIdImg1", "media/pic.png", png_bytes(2, 2))
        .raw(r#"<w:tbl><w:tblGrid><w:gridCol/></w:tblGrid><w:tr><w:tc>"#)
        .picture("rIdImg1")
        .raw("</w:tc></w:tr></w:tbl>");

    insta::assert_snapshot!(outline(doc), @r"
    table columns=1
      row
        cell span=1
          image word/media/pic.png 2x2 scale=0.5
    ");
}

#[test]
fn undecodable_image_is_skipped() {
    let doc = DocxBuilder::new()
        .image("rIdImg1", "media/pic.png", b"garbage".to_vec())
        .picture("rIdImg1")
        .paragraph("still here");

    assert_eq!(
        outline(doc),
        "paragraph indent=30.0 align=Left\n  run \"still here\"\n"
    );
}

#[test]
fn fallback_content_is_skipped() {
    let doc = DocxBuilder::new().raw(
        r#"<mc:AlternateContent><mc:Choice Requires="w14"><w:p><w:r><w:t>choice</w:t></w:r></w:p></mc:Choice><mc:Fallback><w:p><w:r><w:t>fallback</w:t></w:r></w:p></mc:Fallback></mc:AlternateContent>"#,
    );

    let model = convert_bytes(&doc.build()).unwrap();

    assert_eq!(model.visible_text(), "choice");
}

// Failures

#[test]
fn not_a_package() {
    let err = convert_bytes(b"plain text, not a zip").unwrap_err();

    assert!(matches!(err, ParseError::Package(_)), "got {err:?}");
}

#[test]
fn missing_main_part() {
    let err = convert_bytes(&DocxBuilder::new().without_main_part().build()).unwrap_err();

    assert!(matches!(err, ParseError::MissingMainPart), "got {err:?}");
}

#[test]
fn missing_package_relationships() {
    let err = convert_bytes(&DocxBuilder::new().without_root_relationships().build()).unwrap_err();

    assert!(matches!(err, ParseError::MissingMainPart), "got {err:?}");
}

#[test]
fn malformed_main_part() {
    let err = convert_bytes(&DocxBuilder::new().raw("<w:p><w:r></w:p>").build()).unwrap_err();

    assert!(matches!(err, ParseError::Xml { .. }), "got {err:?}");
    assert!(err.to_string().contains("word/document.xml"));
}

#[test]
fn convert_from_file() {
    let dir = TempDir::new().unwrap();
    let path = DocxBuilder::new()
        .paragraph("Hello world.")
        .write_to(&dir, "hello.docx");

    let model = convert(&path).unwrap();

    assert_eq!(model.visible_text(), "Hello world.");
}

#[test]
fn convert_missing_file() {
    let dir = TempDir::new().unwrap();

    let err = convert(dir.path().join("nope.docx")).unwrap_err();

    assert!(matches!(err, ParseError::Io(_)), "got {err:?}");
}
