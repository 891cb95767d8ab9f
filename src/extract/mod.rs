//! Text extraction, one extractor per input format.
//!
//! Every extractor implements [`TextExtractor`] and returns an
//! [`ExtractionResult`]: the text plus an append-only log of each step it
//! attempted. Extractors never fail outright; backend errors end up in the log.
//! [`extractor_for()`] picks the extractor for a [`DocumentKind`].

pub mod docx;
pub mod error;
pub mod image;
pub mod pdf;
pub mod text;

use std::path::Path;

use crate::ocr::OcrEngine;

/// Log line used whenever the OCR engine probe failed.
pub const OCR_UNAVAILABLE: &str = "OCR not available - Tesseract not configured";

/// Input formats the pipeline knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Image,
    PlainText,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Image => "image",
            Self::PlainText => "text",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the document kind from a file extension (case-insensitive).
pub fn detect_kind(path: &Path) -> Option<DocumentKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(DocumentKind::Pdf),
        "docx" => Some(DocumentKind::Docx),
        "png" | "jpg" | "jpeg" => Some(DocumentKind::Image),
        "txt" => Some(DocumentKind::PlainText),
        _ => None,
    }
}

/// Text pulled out of a document together with its diagnostic log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    /// Extracted text, or a fallback message when `placeholder` is set.
    pub text: String,
    /// Every attempted step in chronological order.
    pub log: Vec<String>,
    /// `text` is a failure message standing in for document content.
    pub placeholder: bool,
}

impl ExtractionResult {
    pub fn extracted(text: impl Into<String>, log: Vec<String>) -> Self {
        Self {
            text: text.into(),
            log,
            placeholder: false,
        }
    }

    /// No text, only the log of what was tried.
    pub fn empty(log: Vec<String>) -> Self {
        Self::extracted(String::new(), log)
    }

    /// Extraction failed; `message` takes the place of the text.
    pub fn placeholder(message: impl Into<String>, log: Vec<String>) -> Self {
        Self {
            text: message.into(),
            log,
            placeholder: true,
        }
    }

    /// The document's own text: empty when `text` is a placeholder.
    pub fn content(&self) -> &str {
        if self.placeholder { "" } else { &self.text }
    }

    /// Whether any non-whitespace document text was recovered.
    pub fn has_text(&self) -> bool {
        !self.content().trim().is_empty()
    }
}

/// Trait for format-specific text extractors.
pub trait TextExtractor {
    /// Extract text from the file at `path`. Never fails: errors are logged.
    fn extract(&self, path: &Path) -> ExtractionResult;

    /// The document kind this extractor handles.
    fn kind(&self) -> DocumentKind;
}

/// Get the extractor for a document kind.
pub fn extractor_for(kind: DocumentKind, ocr: &OcrEngine) -> Box<dyn TextExtractor> {
    match kind {
        DocumentKind::Pdf => Box::new(pdf::PdfExtractor::new(ocr.clone())),
        DocumentKind::Docx => Box::new(docx::DocxExtractor),
        DocumentKind::Image => Box::new(image::ImageExtractor::new(ocr.clone())),
        DocumentKind::PlainText => Box::new(text::PlainTextExtractor),
    }
}
