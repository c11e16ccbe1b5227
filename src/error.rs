//! Error types for the PDF tools library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF tools library
#[derive(Error, Debug)]
pub enum Error {
    /// Source bytes are not a readable PDF document
    #[error("Failed to decode PDF: {0}")]
    Decode(#[source] lopdf::Error),

    /// A numeric parameter could not be parsed
    #[error("Invalid number: {0}")]
    Range(String),

    /// Overlay and target page have different page boxes
    #[error(
        "Overlay size {overlay_width}x{overlay_height} does not match page size {page_width}x{page_height}"
    )]
    FormatMismatch {
        overlay_width: f32,
        overlay_height: f32,
        page_width: f32,
        page_height: f32,
    },

    /// Page number outside the document (strict indexing only)
    #[error("Page {number} does not exist (document has {page_count} pages)")]
    PageOutOfRange { number: u32, page_count: usize },

    /// Unknown option value
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Operation received the wrong number of input documents
    #[error("Expected {expected} input document(s), got {actual}")]
    InputCount { expected: usize, actual: usize },

    /// No input documents at all
    #[error("No input documents provided")]
    NoInputs,

    /// Page handle belongs to a different document than the one supplied
    #[error("Page belongs to document {page_document}, not document {source_document}")]
    ForeignPage {
        page_document: usize,
        source_document: usize,
    },

    /// Imported object numbers would not fit in a 32-bit object id
    #[error("Document {document} has object numbers too large to import")]
    ObjectIdOverflow { document: usize },

    /// PDF processing error while assembling or serializing
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),
}
