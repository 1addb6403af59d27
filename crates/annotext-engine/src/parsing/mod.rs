//! Conversion of `.docx` packages into a [`DocumentModel`].
//!
//! The package is opened, its main document part located through the package
//! relationships, and the part streamed once through [`reader`]. Pictures are
//! resolved through the part's own relationships and decoded to learn their
//! size; a picture that cannot be decoded is skipped with a warning.

mod error;
mod media;
mod names;
pub mod package;
mod reader;
mod run_props;
mod state;
pub(crate) mod xml;

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

pub use error::ParseError;
use package::Package;

use crate::models::DocumentModel;

/// Converts the document at `path`.
pub fn convert<P: AsRef<Path>>(path: P) -> Result<DocumentModel, ParseError> {
    let file = File::open(path.as_ref())?;
    convert_reader(BufReader::new(file))
}

pub fn convert_bytes(bytes: &[u8]) -> Result<DocumentModel, ParseError> {
    convert_reader(Cursor::new(bytes))
}

/// Converts a package read from `reader`. The package is released before returning.
pub fn convert_reader<R: Read + Seek>(reader: R) -> Result<DocumentModel, ParseError> {
    let mut package = Package::open(reader)?;
    let main_part = package.main_part_name()?;
    let xml = match package.read_part(&main_part) {
        Ok(xml) => xml,
        Err(ParseError::MissingPart(_)) => return Err(ParseError::MissingMainPart),
        Err(err) => return Err(err),
    };
    let relationships = package.relationships(&main_part)?;

    let mut images = media::PackageImages {
        package: &mut package,
        relationships,
    };
    let model = reader::read_document(&main_part, &xml, &mut images)?;
    log::debug!(
        "Converted {main_part}: {} blocks, {} paragraphs",
        model.blocks.len(),
        model.paragraph_count()
    );
    Ok(model)
}
