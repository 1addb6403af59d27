#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot open document package: {0}")]
    Package(#[from] zip::result::ZipError),
    #[error("Document package has no main document part")]
    MissingMainPart,
    #[error("Part not found in package: {0}")]
    MissingPart(String),
    #[error("XML error in {part} at byte {position}: {message}")]
    Xml {
        part: String,
        position: u64,
        message: String,
    },
    #[error("Malformed document: {0}")]
    Malformed(String),
}
