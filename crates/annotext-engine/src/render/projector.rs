use super::{NodeKind, RenderedInline, RenderedTree, Symbol};
use crate::models::{Block, DocumentModel, Inline, Paragraph};

/// Builds a fresh rendered tree from the model.
///
/// Every visible character of the model becomes exactly one `Char` symbol, in
/// document order, so canonical offsets can be counted on the tree.
pub fn project(model: &DocumentModel) -> RenderedTree {
    let mut tree = RenderedTree::default();
    for block in &model.blocks {
        project_block(&mut tree, block);
    }
    tree
}

fn project_block(tree: &mut RenderedTree, block: &Block) {
    match block {
        Block::Paragraph(paragraph) => project_paragraph(tree, paragraph),
        Block::Image(image) => {
            // images are shown in a paragraph of their own
            tree.push(Symbol::Open(NodeKind::Paragraph));
            tree.push(Symbol::Object(image.clone()));
            tree.push(Symbol::Close(NodeKind::Paragraph));
        }
        Block::List(list) => {
            tree.push(Symbol::Open(NodeKind::List));
            for item in &list.items {
                tree.push(Symbol::Open(NodeKind::ListItem));
                for block in &item.blocks {
                    project_block(tree, block);
                }
                tree.push(Symbol::Close(NodeKind::ListItem));
            }
            tree.push(Symbol::Close(NodeKind::List));
        }
        Block::Table(table) => {
            tree.push(Symbol::Open(NodeKind::Table));
            for row in &table.rows {
                tree.push(Symbol::Open(NodeKind::Row));
                for cell in &row.cells {
                    tree.push(Symbol::Open(NodeKind::Cell));
                    for block in &cell.blocks {
                        project_block(tree, block);
                    }
                    tree.push(Symbol::Close(NodeKind::Cell));
                }
                tree.push(Symbol::Close(NodeKind::Row));
            }
            tree.push(Symbol::Close(NodeKind::Table));
        }
    }
}

fn project_paragraph(tree: &mut RenderedTree, paragraph: &Paragraph) {
    tree.push(Symbol::Open(NodeKind::Paragraph));
    for inline in &paragraph.inlines {
        match inline {
            Inline::Run(run) => {
                let id = tree.add_inline(RenderedInline::Run(run.format.clone()));
                for ch in run.text.chars() {
                    tree.push(Symbol::Char {
                        ch,
                        inline: id,
                        covered: Vec::new(),
                    });
                }
            }
            Inline::Tab => {
                let id = tree.add_inline(RenderedInline::Tab(Default::default()));
                tree.push(Symbol::Char {
                    ch: '\t',
                    inline: id,
                    covered: Vec::new(),
                });
            }
            Inline::Break => tree.push(Symbol::LineBreak),
        }
    }
    tree.push(Symbol::Close(NodeKind::Paragraph));
}
