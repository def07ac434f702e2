use thiserror::Error;

/// Fatal failure to read a document package. Recoverable problems inside the
/// package (bad images, odd numbering definitions) never surface here.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not a valid docx archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read package: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required part: {0}")]
    MissingPart(String),

    #[error("malformed xml in {part}: {message}")]
    Xml { part: String, message: String },
}
