//! Error types for pdfdiff library.

use std::io;
use thiserror::Error;

use crate::model::DocumentRole;

/// Result type alias for pdfdiff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting or comparing PDFs.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header names a version we do not recognise.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF structure could not be decoded.
    #[error("PDF decode error: {0}")]
    Decode(String),

    /// The document is encrypted and the engine cannot open it.
    #[error("Document is encrypted")]
    Encrypted,

    /// The decode engine failed to initialise or is not registered.
    #[error("PDF engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Extraction of one of the compared documents failed.
    #[error("Failed to extract the {document} PDF: {source}")]
    Extraction {
        /// Which document failed
        document: DocumentRole,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A background extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Task(String),

    /// Error while rendering a report.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Tag this error with the document whose extraction produced it.
    pub fn for_document(self, document: DocumentRole) -> Self {
        match self {
            err @ Error::Extraction { .. } => err,
            other => Error::Extraction {
                document,
                source: Box::new(other),
            },
        }
    }

    /// True when the bytes could not be opened as a PDF.
    ///
    /// Covers non-PDF content, corrupt structure, and unsupported encryption.
    pub fn is_decode_error(&self) -> bool {
        match self {
            Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::Decode(_)
            | Error::Encrypted => true,
            Error::Extraction { source, .. } => source.is_decode_error(),
            _ => false,
        }
    }

    /// The document whose extraction failed, if known.
    pub fn document(&self) -> Option<DocumentRole> {
        match self {
            Error::Extraction { document, .. } => Some(*document),
            _ => None,
        }
    }

    /// Short message suitable for end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::EngineUnavailable(_) => ENGINE_UNAVAILABLE_MESSAGE,
            Error::Extraction { source, .. } => source.user_message(),
            _ => PROCESSING_FAILED_MESSAGE,
        }
    }
}

const PROCESSING_FAILED_MESSAGE: &str =
    "We couldn\u{2019}t process those PDFs. Please try different files.";
const ENGINE_UNAVAILABLE_MESSAGE: &str =
    "PDF engine failed to load. Please try again, or use a different engine.";

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Decode(err.to_string()),
        }
    }
}
