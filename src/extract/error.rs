//! Errors raised by individual extraction backends.
//!
//! These never escape an extractor: every tier converts its error into a log
//! line with `to_string()` and falls through.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from a single extraction backend.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("{backend} error: {message}")]
    #[diagnostic(
        code(docmeta::extract::open),
        help("The document could not be opened. Verify the file is not corrupted or truncated.")
    )]
    Open {
        backend: &'static str,
        message: String,
    },

    #[error("Could not decrypt PDF: {message}")]
    #[diagnostic(
        code(docmeta::extract::decrypt),
        help("Only PDFs encrypted with an empty user password can be read.")
    )]
    Decrypt { message: String },

    #[error("{backend} panicked while parsing the document")]
    #[diagnostic(
        code(docmeta::extract::panic),
        help("The parser crashed on malformed input; another backend will be tried.")
    )]
    Panicked { backend: &'static str },

    #[error("PDF to image conversion failed: {message}")]
    #[diagnostic(
        code(docmeta::extract::rasterize),
        help("Install poppler-utils so that `pdftoppm` is on PATH, or set `ocr.pdftoppm_cmd`.")
    )]
    Rasterize { message: String },

    #[error("tesseract error: {message}")]
    #[diagnostic(
        code(docmeta::extract::ocr),
        help("Check that tesseract is installed and `ocr.tesseract_cmd` points at it.")
    )]
    Ocr { message: String },

    #[error("invalid DOCX archive: {message}")]
    #[diagnostic(
        code(docmeta::extract::docx),
        help("DOCX files are ZIP archives containing word/document.xml.")
    )]
    Docx { message: String },

    #[error("image decode error: {message}")]
    #[diagnostic(
        code(docmeta::extract::image),
        help("Supported image formats are PNG and JPEG.")
    )]
    Image { message: String },

    #[error("{source}")]
    #[diagnostic(
        code(docmeta::extract::io),
        help("A filesystem operation failed. Check file paths and permissions.")
    )]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Convenience alias for backend results.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
