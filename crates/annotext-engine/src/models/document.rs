use std::fmt::Write;

use super::format::{Alignment, BaselineShift, RunFormat, TextDirection};

/// Default first-line indent of a body paragraph.
pub const DEFAULT_TEXT_INDENT: f32 = 30.0;
/// Left margin added per list nesting level.
pub const LIST_LEVEL_MARGIN: f32 = 20.0;
/// Fraction of the page an image may occupy outside of tables.
pub const PAGE_IMAGE_SCALE: f32 = 0.8;
/// Fraction of the cell an image may occupy inside a table.
pub const TABLE_IMAGE_SCALE: f32 = 0.5;

/// The converted document: a tree of blocks in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentModel {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    List(List),
    Image(Image),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub indent: f32,
    pub alignment: Alignment,
    pub inlines: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(Run),
    Break,
    Tab,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    pub text: String,
    pub format: RunFormat,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: usize,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub column_span: usize,
    pub blocks: Vec<Block>,
}

/// Consecutive paragraphs sharing one numbering id.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub id: String,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub level: u32,
    pub margin: f32,
    pub blocks: Vec<Block>,
}

/// A decoded embedded picture. Only its geometry is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub relationship_id: String,
    pub part_name: String,
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl Paragraph {
    pub fn new(indent: f32) -> Self {
        Self {
            indent,
            alignment: Alignment::Left,
            inlines: Vec::new(),
        }
    }

    /// Paragraphs holding nothing but one blank run (and any line breaks) are
    /// artifacts of the source markup and are dropped after conversion.
    pub fn is_placeholder(&self) -> bool {
        let mut blank_runs = 0;
        for inline in &self.inlines {
            match inline {
                Inline::Run(run) if run.text.trim().is_empty() => blank_runs += 1,
                Inline::Break => {}
                Inline::Run(_) | Inline::Tab => return false,
            }
        }
        blank_runs == 1 || (blank_runs == 0 && !self.inlines.is_empty())
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Run(run) => out.push_str(&run.text),
                Inline::Tab => out.push('\t'),
                Inline::Break => {}
            }
        }
        out
    }
}

impl DocumentModel {
    /// Removes placeholder paragraphs from every container.
    pub fn prune_placeholders(&mut self) {
        prune_blocks(&mut self.blocks);
    }

    /// Every visible character in document order. Line breaks and block
    /// boundaries contribute nothing, tabs contribute `'\t'`.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        visit_paragraphs(&self.blocks, &mut |p| out.push_str(&p.text()));
        out
    }

    pub fn paragraph_count(&self) -> usize {
        let mut count = 0;
        visit_paragraphs(&self.blocks, &mut |_| count += 1);
        count
    }

    /// Indented, line-per-node description of the tree.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            write_block(&mut out, block, 0);
        }
        out
    }
}

fn prune_blocks(blocks: &mut Vec<Block>) {
    blocks.retain(|block| !matches!(block, Block::Paragraph(p) if p.is_placeholder()));
    for block in blocks.iter_mut() {
        match block {
            Block::Table(table) => {
                for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                    prune_blocks(&mut cell.blocks);
                }
            }
            Block::List(list) => {
                for item in &mut list.items {
                    prune_blocks(&mut item.blocks);
                }
            }
            Block::Paragraph(_) | Block::Image(_) => {}
        }
    }
}

fn visit_paragraphs<F: FnMut(&Paragraph)>(blocks: &[Block], f: &mut F) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => f(p),
            Block::Table(table) => {
                for cell in table.rows.iter().flat_map(|row| row.cells.iter()) {
                    visit_paragraphs(&cell.blocks, f);
                }
            }
            Block::List(list) => {
                for item in &list.items {
                    visit_paragraphs(&item.blocks, f);
                }
            }
            Block::Image(_) => {}
        }
    }
}

fn write_block(out: &mut String, block: &Block, depth: usize) {
    let pad = "  ".repeat(depth);
    match block {
        Block::Paragraph(p) => {
            let _ = writeln!(
                out,
                "{pad}paragraph indent={:.1} align={:?}",
                p.indent, p.alignment
            );
            for inline in &p.inlines {
                write_inline(out, inline, depth + 1);
            }
        }
        Block::Table(table) => {
            let _ = writeln!(out, "{pad}table columns={}", table.columns);
            for row in &table.rows {
                let _ = writeln!(out, "{pad}  row");
                for cell in &row.cells {
                    let _ = writeln!(out, "{pad}    cell span={}", cell.column_span);
                    for block in &cell.blocks {
                        write_block(out, block, depth + 3);
                    }
                }
            }
        }
        Block::List(list) => {
            let _ = writeln!(out, "{pad}list id={}", list.id);
            for item in &list.items {
                let _ = writeln!(
                    out,
                    "{pad}  item level={} margin={:.1}",
                    item.level, item.margin
                );
                for block in &item.blocks {
                    write_block(out, block, depth + 2);
                }
            }
        }
        Block::Image(image) => {
            let _ = writeln!(
                out,
                "{pad}image {} {}x{} scale={:.1}",
                image.part_name, image.width, image.height, image.scale
            );
        }
    }
}

fn write_inline(out: &mut String, inline: &Inline, depth: usize) {
    let pad = "  ".repeat(depth);
    match inline {
        Inline::Run(run) => {
            let _ = write!(out, "{pad}run {:?}", run.text);
            write_format(out, &run.format);
            out.push('\n');
        }
        Inline::Break => {
            let _ = writeln!(out, "{pad}break");
        }
        Inline::Tab => {
            let _ = writeln!(out, "{pad}tab");
        }
    }
}

fn write_format(out: &mut String, format: &RunFormat) {
    if format.bold {
        out.push_str(" bold");
    }
    if format.italic {
        out.push_str(" italic");
    }
    if let Some(underline) = &format.underline {
        let _ = write!(out, " underline={:?}", underline.style);
        if let Some(color) = underline.color {
            let _ = write!(out, "({color})");
        }
    }
    if format.strike {
        out.push_str(" strike");
    }
    match format.baseline {
        BaselineShift::Baseline => {}
        BaselineShift::Subscript => out.push_str(" sub"),
        BaselineShift::Superscript => out.push_str(" super"),
    }
    if let Some(color) = format.foreground {
        let _ = write!(out, " color={color}");
    }
    if let Some(color) = format.background {
        let _ = write!(out, " highlight={color}");
    }
    if let Some(family) = &format.font_family {
        let _ = write!(out, " font={family:?}");
    }
    if let Some(size) = format.font_size {
        let _ = write!(out, " size={size:.1}");
    }
    if format.direction == TextDirection::RightToLeft {
        out.push_str(" rtl");
    }
}
