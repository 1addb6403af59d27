//! Parser state for the main document part.
//!
//! Every start tag pushes one [`Frame`] and every end tag pops one, so the
//! stack mirrors the element nesting. Containers (body, table, row, cell,
//! paragraph, run, text) carry their half-built content in the frame itself;
//! property elements only push a marker.

use quick_xml::events::BytesStart;

use super::ParseError;
use super::media::ImageSource;
use super::names::Tag;
use super::run_props;
use super::xml::attr;
use crate::models::{
    Alignment, Block, Cell, DEFAULT_TEXT_INDENT, DocumentModel, Image, Inline, LIST_LEVEL_MARGIN,
    List, ListItem, PAGE_IMAGE_SCALE, Paragraph, Row, Run, RunFormat, TABLE_IMAGE_SCALE, Table,
};

/// Word writes `w:ind/@w:firstLine` in twips; this brings it to display units.
const TWIPS_PER_INDENT_UNIT: f32 = 23.6;
/// `w:numId` value that switches numbering off.
const NO_NUMBERING: &str = "0";

#[derive(Debug, Default)]
struct ListRef {
    id: Option<String>,
    level: u32,
}

#[derive(Debug)]
struct ParagraphBuilder {
    paragraph: Paragraph,
    list: Option<ListRef>,
    images: Vec<Image>,
}

#[derive(Debug, Default)]
struct RunBuilder {
    format: RunFormat,
    text: String,
    inlines: Vec<Inline>,
}

impl RunBuilder {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.inlines.push(Inline::Run(Run {
                text: std::mem::take(&mut self.text),
                format: self.format.clone(),
            }));
        }
    }

    fn push(&mut self, inline: Inline) {
        self.flush_text();
        self.inlines.push(inline);
    }

    /// A run that produced nothing still leaves an empty run behind.
    fn finish(mut self) -> Vec<Inline> {
        self.flush_text();
        if self.inlines.is_empty() {
            self.inlines.push(Inline::Run(Run {
                text: String::new(),
                format: self.format,
            }));
        }
        self.inlines
    }
}

#[derive(Debug, Default)]
struct CellBuilder {
    grid_span: Option<usize>,
    blocks: Vec<Block>,
}

#[derive(Debug)]
enum Frame {
    Body(Vec<Block>),
    Table(Table),
    Row(Vec<CellBuilder>),
    Cell(CellBuilder),
    Paragraph(ParagraphBuilder),
    Run(RunBuilder),
    Text { preserve: bool, has_text: bool },
    Element(Tag),
}

pub(crate) struct ParserState<'a> {
    frames: Vec<Frame>,
    images: &'a mut dyn ImageSource,
    body: Option<Vec<Block>>,
}

impl<'a> ParserState<'a> {
    pub(crate) fn new(images: &'a mut dyn ImageSource) -> Self {
        Self {
            frames: Vec::new(),
            images,
            body: None,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn start(&mut self, tag: Tag, e: &BytesStart<'_>) -> Result<(), ParseError> {
        let frame = match tag {
            Tag::Body => Frame::Body(Vec::new()),
            Tag::Table => Frame::Table(Table::default()),
            Tag::Row => Frame::Row(Vec::new()),
            Tag::Cell => Frame::Cell(CellBuilder::default()),
            Tag::Paragraph => {
                let indent = if self.in_table() {
                    0.0
                } else {
                    DEFAULT_TEXT_INDENT
                };
                Frame::Paragraph(ParagraphBuilder {
                    paragraph: Paragraph::new(indent),
                    list: None,
                    images: Vec::new(),
                })
            }
            Tag::Run if self.in_paragraph() => Frame::Run(RunBuilder::default()),
            Tag::Text if self.parent_is_run() => Frame::Text {
                preserve: attr(e, b"space").is_some_and(|v| v == "preserve"),
                has_text: false,
            },
            _ => {
                self.apply_property(tag, e);
                Frame::Element(tag)
            }
        };
        self.frames.push(frame);
        Ok(())
    }

    pub(crate) fn text(&mut self, text: &str) {
        if let Some(Frame::Text { has_text, .. }) = self.frames.last_mut() {
            *has_text |= !text.is_empty();
        } else {
            return;
        }
        if let Some(run) = self.run_mut() {
            run.text.push_str(text);
        }
    }

    pub(crate) fn end(&mut self) -> Result<(), ParseError> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| ParseError::Malformed("unexpected closing tag".to_string()))?;

        match frame {
            Frame::Body(blocks) => self.body = Some(blocks),
            Frame::Text { preserve, has_text } => {
                // an empty preserved text node stands for a single space
                if preserve
                    && !has_text
                    && let Some(run) = self.run_mut()
                {
                    run.text.push(' ');
                }
            }
            Frame::Run(run) => {
                let inlines = run.finish();
                if let Some(builder) = self.paragraph_mut() {
                    builder.paragraph.inlines.extend(inlines);
                }
            }
            Frame::Paragraph(builder) => self.place_paragraph(builder)?,
            Frame::Cell(cell) => match self.frames.last_mut() {
                Some(Frame::Row(cells)) => cells.push(cell),
                _ => return Err(ParseError::Malformed("table cell outside of a row".into())),
            },
            Frame::Row(cells) => self.close_row(cells)?,
            Frame::Table(table) => self.container_blocks()?.push(Block::Table(table)),
            Frame::Element(_) => {}
        }
        Ok(())
    }

    /// Finishes the pass and prunes placeholder paragraphs.
    pub(crate) fn finish(self) -> Result<DocumentModel, ParseError> {
        if !self.frames.is_empty() {
            return Err(ParseError::Malformed(format!(
                "{} element(s) left open at end of document",
                self.frames.len()
            )));
        }
        let blocks = self
            .body
            .ok_or_else(|| ParseError::Malformed("document has no body".to_string()))?;
        let mut model = DocumentModel { blocks };
        model.prune_placeholders();
        Ok(model)
    }

    fn apply_property(&mut self, tag: Tag, e: &BytesStart<'_>) {
        let parent = self.parent_tag();
        match (parent, tag) {
            (Some(Tag::ParagraphProps), Tag::Indent) => {
                let first_line = attr(e, b"firstLine").and_then(|v| v.parse::<f32>().ok());
                if let (Some(first_line), Some(builder)) = (first_line, self.paragraph_mut()) {
                    builder.paragraph.indent = first_line / TWIPS_PER_INDENT_UNIT;
                }
            }
            (Some(Tag::ParagraphProps), Tag::Justification) => {
                let alignment = attr(e, b"val").as_deref().and_then(Alignment::from_ooxml);
                if let (Some(alignment), Some(builder)) = (alignment, self.paragraph_mut()) {
                    builder.paragraph.alignment = alignment;
                }
            }
            (Some(Tag::ParagraphProps), Tag::NumberingProps) => {
                if let Some(builder) = self.paragraph_mut() {
                    builder.list.get_or_insert_with(ListRef::default);
                }
            }
            (Some(Tag::NumberingProps), Tag::NumberingId) => {
                if let Some(list) = self.paragraph_mut().and_then(|b| b.list.as_mut()) {
                    list.id = attr(e, b"val");
                }
            }
            (Some(Tag::NumberingProps), Tag::NumberingLevel) => {
                let level = attr(e, b"val").and_then(|v| v.parse::<u32>().ok());
                if let (Some(level), Some(list)) =
                    (level, self.paragraph_mut().and_then(|b| b.list.as_mut()))
                {
                    list.level = level;
                }
            }
            (Some(Tag::RunProps), _) if self.run_props_belong_to_run() => {
                if let Some(run) = self.run_mut() {
                    run_props::apply(tag, e, &mut run.format);
                }
            }
            (Some(Tag::CellProps), Tag::GridSpan) => {
                let span = attr(e, b"val").and_then(|v| v.parse::<usize>().ok());
                if let Some(Frame::Cell(cell)) = self.nearest(|f| matches!(f, Frame::Cell(_))) {
                    cell.grid_span = span;
                }
            }
            (_, Tag::GridColumn) => {
                if let Some(Frame::Table(table)) = self.nearest(|f| matches!(f, Frame::Table(_))) {
                    table.columns += 1;
                }
            }
            (_, Tag::Tab) if self.parent_is_run() => {
                if let Some(run) = self.run_mut() {
                    run.push(Inline::Tab);
                }
            }
            (_, Tag::Break | Tag::CarriageReturn) if self.parent_is_run() => {
                if let Some(run) = self.run_mut() {
                    run.push(Inline::Break);
                }
            }
            (_, Tag::Blip) => self.load_image(e),
            _ => {}
        }
    }

    fn load_image(&mut self, e: &BytesStart<'_>) {
        let Some(rel_id) = attr(e, b"embed") else {
            return;
        };
        let scale = if self.in_table() {
            TABLE_IMAGE_SCALE
        } else {
            PAGE_IMAGE_SCALE
        };
        let Some(loaded) = self.images.load(&rel_id) else {
            return;
        };
        let image = Image {
            relationship_id: rel_id,
            part_name: loaded.part_name,
            width: loaded.width,
            height: loaded.height,
            scale,
        };
        match self.paragraph_mut() {
            Some(builder) => builder.images.push(image),
            None => log::debug!("Ignoring image {} outside of a paragraph", image.part_name),
        }
    }

    fn place_paragraph(&mut self, builder: ParagraphBuilder) -> Result<(), ParseError> {
        let ParagraphBuilder {
            mut paragraph,
            list,
            images,
        } = builder;
        let blocks = self.container_blocks()?;

        let list = list.and_then(|l| match l.id {
            Some(id) if id != NO_NUMBERING => Some((id, l.level)),
            _ => None,
        });
        let Some((id, level)) = list else {
            blocks.push(Block::Paragraph(paragraph));
            blocks.extend(images.into_iter().map(Block::Image));
            return Ok(());
        };

        paragraph.indent = 0.0;
        let mut item_blocks = vec![Block::Paragraph(paragraph)];
        item_blocks.extend(images.into_iter().map(Block::Image));
        let item = ListItem {
            level,
            margin: (level + 1) as f32 * LIST_LEVEL_MARGIN,
            blocks: item_blocks,
        };
        match blocks.last_mut() {
            Some(Block::List(current)) if current.id == id => current.items.push(item),
            _ => blocks.push(Block::List(List {
                id,
                items: vec![item],
            })),
        }
        Ok(())
    }

    /// The last cell absorbs whatever grid columns the earlier cells leave over.
    fn close_row(&mut self, cells: Vec<CellBuilder>) -> Result<(), ParseError> {
        let Some(Frame::Table(table)) = self.frames.last_mut() else {
            return Err(ParseError::Malformed("table row outside of a table".into()));
        };
        let count = cells.len();
        let mut consumed = 0;
        let mut row = Row::default();
        for (i, cell) in cells.into_iter().enumerate() {
            let column_span = if i + 1 == count {
                table.columns.saturating_sub(consumed).max(1)
            } else {
                cell.grid_span.unwrap_or(1).max(1)
            };
            consumed += column_span;
            row.cells.push(Cell {
                column_span,
                blocks: cell.blocks,
            });
        }
        table.rows.push(row);
        Ok(())
    }

    fn container_blocks(&mut self) -> Result<&mut Vec<Block>, ParseError> {
        for frame in self.frames.iter_mut().rev() {
            match frame {
                Frame::Cell(cell) => return Ok(&mut cell.blocks),
                Frame::Body(blocks) => return Ok(blocks),
                _ => {}
            }
        }
        Err(ParseError::Malformed(
            "block content outside of the document body".to_string(),
        ))
    }

    fn nearest(&mut self, pred: impl Fn(&Frame) -> bool) -> Option<&mut Frame> {
        self.frames.iter_mut().rev().find(|f| pred(f))
    }

    fn paragraph_mut(&mut self) -> Option<&mut ParagraphBuilder> {
        match self.nearest(|f| matches!(f, Frame::Paragraph(_))) {
            Some(Frame::Paragraph(builder)) => Some(builder),
            _ => None,
        }
    }

    fn run_mut(&mut self) -> Option<&mut RunBuilder> {
        match self.nearest(|f| matches!(f, Frame::Run(_))) {
            Some(Frame::Run(run)) => Some(run),
            _ => None,
        }
    }

    fn in_paragraph(&self) -> bool {
        self.frames.iter().any(|f| matches!(f, Frame::Paragraph(_)))
    }

    fn in_table(&self) -> bool {
        self.frames.iter().any(|f| matches!(f, Frame::Cell(_)))
    }

    fn parent_tag(&self) -> Option<Tag> {
        match self.frames.last()? {
            Frame::Element(tag) => Some(*tag),
            _ => None,
        }
    }

    fn parent_is_run(&self) -> bool {
        matches!(self.frames.last(), Some(Frame::Run(_)))
    }

    /// `w:rPr` also appears under `w:pPr` for the paragraph mark; only direct
    /// run properties count.
    fn run_props_belong_to_run(&self) -> bool {
        let n = self.frames.len();
        n >= 2 && matches!(self.frames[n - 2], Frame::Run(_))
    }
}
