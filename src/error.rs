use thiserror::Error;

/// Run-level failures. Pattern misses and name collisions never end up here.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("FileNotFound: {0}")]
    FileNotFound(String),
    #[error("EncryptedPDF: {0}")]
    EncryptedPdf(String),
    #[error("ParseError: {0}")]
    Parse(String),
    #[error("SerializeFailed: {name}: {message}")]
    Serialize { name: String, message: String },
    #[error("ArchiveError: {0}")]
    Archive(String),
    #[error("Cancelled after {processed} of {total} groups")]
    Cancelled { processed: usize, total: usize },
}

impl From<zip::result::ZipError> for SplitError {
    fn from(e: zip::result::ZipError) -> Self {
        SplitError::Archive(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum TextError {
    #[error("lopdf: {0}")]
    Lopdf(String),
    #[error("pdftotext: {0}")]
    Poppler(String),
}
