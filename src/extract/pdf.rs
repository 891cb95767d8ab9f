//! PDF extraction with a three-tier fallback chain.
//!
//! 1. [`NativeTextLayer`]: per-page text layer via `pdf-extract`.
//! 2. [`LegacyParser`]: `lopdf`, with empty-password decryption.
//! 3. [`OcrFallback`]: rasterise with `pdftoppm`, recognise with tesseract.
//!
//! Tiers run in order and share one log. The first tier whose text is
//! non-empty after trimming wins; if none produce text the result is the
//! [`NO_PDF_TEXT`] placeholder.

use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use lopdf::Document;

use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::{DocumentKind, ExtractionResult, OCR_UNAVAILABLE, TextExtractor};
use crate::ocr::OcrEngine;

/// Text returned when every tier came up empty.
pub const NO_PDF_TEXT: &str = "No text could be extracted from this PDF";

const NATIVE_BACKEND: &str = "pdf-extract";
const LEGACY_BACKEND: &str = "lopdf";
const OCR_BACKEND: &str = "OCR";

/// One way of getting text out of a PDF.
pub trait PdfStrategy {
    /// Backend name used in log lines.
    fn name(&self) -> &'static str;

    /// Line logged before this tier runs, if any.
    fn announce(&self) -> Option<&'static str> {
        None
    }

    /// Try to extract text. Failures are recorded in the returned log.
    fn attempt(&self, path: &Path) -> ExtractionResult;
}

/// Result of extracting a single page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Text(String),
    Empty,
    Failed(String),
}

impl PageOutcome {
    fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(text)
        }
    }
}

/// Which kind of page text is being folded; selects markers and log wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageSource {
    TextLayer,
    Ocr,
}

impl PageSource {
    fn marker(self, page: u32) -> String {
        match self {
            Self::TextLayer => format!("[Page {page} Text]"),
            Self::Ocr => format!("[Page {page} OCR Text]"),
        }
    }

    fn log_outcome(self, page: u32, outcome: &PageOutcome) -> String {
        match (self, outcome) {
            (Self::TextLayer, PageOutcome::Text(_)) => format!("Extracted text from page {page}"),
            (Self::TextLayer, PageOutcome::Empty) => format!("No text found in page {page}"),
            (Self::TextLayer, PageOutcome::Failed(e)) => format!("Page {page} error: {e}"),
            (Self::Ocr, PageOutcome::Text(_)) => format!("OCR processed page {page}"),
            (Self::Ocr, PageOutcome::Empty) => format!("No OCR text found on page {page}"),
            (Self::Ocr, PageOutcome::Failed(e)) => format!("OCR failed for page {page}: {e}"),
        }
    }
}

/// Fold per-page outcomes into tagged document text, logging each page.
fn fold_pages(
    pages: impl IntoIterator<Item = (u32, PageOutcome)>,
    source: PageSource,
    log: &mut Vec<String>,
) -> String {
    let mut text = String::new();
    for (page, outcome) in pages {
        log.push(source.log_outcome(page, &outcome));
        match outcome {
            PageOutcome::Text(page_text) => {
                let _ = write!(text, "\n{}\n{page_text}", source.marker(page));
            }
            PageOutcome::Empty => tracing::debug!(page, "page has no text"),
            PageOutcome::Failed(reason) => tracing::debug!(page, %reason, "page extraction failed"),
        }
    }
    text
}

// ---------------------------------------------------------------------------
// Tier 1: native text layer
// ---------------------------------------------------------------------------

/// Per-page text layer through `pdf-extract`.
pub struct NativeTextLayer;

impl PdfStrategy for NativeTextLayer {
    fn name(&self) -> &'static str {
        NATIVE_BACKEND
    }

    fn attempt(&self, path: &Path) -> ExtractionResult {
        let mut log = Vec::new();
        let pages = match read_text_layer(path.to_path_buf()) {
            Ok(pages) => pages,
            Err(e) => {
                log.push(e.to_string());
                return ExtractionResult::empty(log);
            }
        };
        log.push(format!(
            "Opened PDF with {} pages using {NATIVE_BACKEND}",
            pages.len()
        ));

        let outcomes = (1u32..).zip(pages.into_iter().map(PageOutcome::from_text));
        let text = fold_pages(outcomes, PageSource::TextLayer, &mut log);
        ExtractionResult::extracted(text, log)
    }
}

fn read_text_layer(path: PathBuf) -> ExtractResult<Vec<String>> {
    // pdf-extract panics on some malformed inputs. A panic on any page loses
    // the whole tier; the lopdf tier still reports page by page.
    match panic::catch_unwind(move || pdf_extract::extract_text_by_pages(&path)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractError::Open {
            backend: NATIVE_BACKEND,
            message: e.to_string(),
        }),
        Err(_) => Err(ExtractError::Panicked {
            backend: NATIVE_BACKEND,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tier 2: legacy parser
// ---------------------------------------------------------------------------

/// `lopdf` object-level parser; tries an empty password on encrypted files.
pub struct LegacyParser;

impl PdfStrategy for LegacyParser {
    fn name(&self) -> &'static str {
        LEGACY_BACKEND
    }

    fn attempt(&self, path: &Path) -> ExtractionResult {
        let mut log = Vec::new();
        let mut doc = match Document::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                let err = ExtractError::Open {
                    backend: LEGACY_BACKEND,
                    message: e.to_string(),
                };
                log.push(err.to_string());
                return ExtractionResult::empty(log);
            }
        };
        log.push(format!(
            "Opened PDF with {} pages using {LEGACY_BACKEND}",
            doc.get_pages().len()
        ));

        if doc.is_encrypted() {
            match doc.decrypt("") {
                Ok(()) => log.push("Decrypted PDF with empty password".into()),
                Err(e) => {
                    let err = ExtractError::Decrypt {
                        message: e.to_string(),
                    };
                    log.push(err.to_string());
                    return ExtractionResult::empty(log);
                }
            }
        }

        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        let outcomes = page_numbers.into_iter().map(|page| {
            let extracted = panic::catch_unwind(AssertUnwindSafe(|| doc.extract_text(&[page])));
            let outcome = match extracted {
                Ok(Ok(text)) => PageOutcome::from_text(text),
                Ok(Err(e)) => PageOutcome::Failed(e.to_string()),
                Err(_) => PageOutcome::Failed(format!("{LEGACY_BACKEND} panicked")),
            };
            (page, outcome)
        });
        let text = fold_pages(outcomes, PageSource::TextLayer, &mut log);
        ExtractionResult::extracted(text, log)
    }
}

// ---------------------------------------------------------------------------
// Tier 3: OCR
// ---------------------------------------------------------------------------

/// Rasterise each page and run tesseract on it.
pub struct OcrFallback {
    ocr: OcrEngine,
}

impl OcrFallback {
    pub fn new(ocr: OcrEngine) -> Self {
        Self { ocr }
    }
}

impl PdfStrategy for OcrFallback {
    fn name(&self) -> &'static str {
        OCR_BACKEND
    }

    fn announce(&self) -> Option<&'static str> {
        Some("No text found with standard methods, trying OCR...")
    }

    fn attempt(&self, path: &Path) -> ExtractionResult {
        let mut log = Vec::new();
        if !self.ocr.is_available() {
            log.push(OCR_UNAVAILABLE.into());
            return ExtractionResult::empty(log);
        }

        let raster = match self.ocr.rasterize_pdf(path) {
            Ok(raster) => raster,
            Err(e) => {
                log.push(e.to_string());
                return ExtractionResult::empty(log);
            }
        };
        log.push(format!(
            "Converted {} pages to images for OCR",
            raster.pages().len()
        ));

        let outcomes = (1u32..).zip(raster.pages().iter().map(|image| {
            match self.ocr.recognize(image) {
                Ok(text) => PageOutcome::from_text(text),
                Err(e) => PageOutcome::Failed(e.to_string()),
            }
        }));
        let text = fold_pages(outcomes, PageSource::Ocr, &mut log);
        ExtractionResult::extracted(text, log)
    }
}

// ---------------------------------------------------------------------------
// The chain
// ---------------------------------------------------------------------------

/// PDF extractor running its tiers in order until one yields text.
pub struct PdfExtractor {
    tiers: Vec<Box<dyn PdfStrategy>>,
}

impl PdfExtractor {
    /// The standard chain: text layer, legacy parser, OCR.
    pub fn new(ocr: OcrEngine) -> Self {
        Self::with_tiers(vec![
            Box::new(NativeTextLayer),
            Box::new(LegacyParser),
            Box::new(OcrFallback::new(ocr)),
        ])
    }

    pub fn with_tiers(tiers: Vec<Box<dyn PdfStrategy>>) -> Self {
        Self { tiers }
    }
}

impl TextExtractor for PdfExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract(&self, path: &Path) -> ExtractionResult {
        let mut log = Vec::new();

        for tier in &self.tiers {
            if let Some(line) = tier.announce() {
                log.push(line.to_string());
            }
            let result = tier.attempt(path);
            log.extend(result.log);
            if !result.text.trim().is_empty() {
                tracing::debug!(backend = tier.name(), "PDF text extracted");
                log.push(format!("Successfully extracted text using {}", tier.name()));
                return ExtractionResult::extracted(result.text, log);
            }
            tracing::debug!(backend = tier.name(), "PDF tier produced no text, falling through");
        }

        tracing::warn!(path = %path.display(), "all PDF extraction methods failed");
        log.push("All extraction methods failed".into());
        ExtractionResult::placeholder(NO_PDF_TEXT, log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Canned {
        name: &'static str,
        text: &'static str,
        calls: Rc<Cell<usize>>,
    }

    impl PdfStrategy for Canned {
        fn name(&self) -> &'static str {
            self.name
        }

        fn attempt(&self, _path: &Path) -> ExtractionResult {
            self.calls.set(self.calls.get() + 1);
            ExtractionResult::extracted(self.text, vec![format!("{} ran", self.name)])
        }
    }

    fn canned(name: &'static str, text: &'static str) -> (Box<dyn PdfStrategy>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let tier = Canned {
            name,
            text,
            calls: Rc::clone(&calls),
        };
        (Box::new(tier), calls)
    }

    #[test]
    fn first_tier_with_text_wins() {
        let (a, a_calls) = canned("a", "  \n ");
        let (b, b_calls) = canned("b", "\n[Page 1 Text]\nhello");
        let (c, c_calls) = canned("c", "never");
        let extractor = PdfExtractor::with_tiers(vec![a, b, c]);

        let result = extractor.extract(Path::new("x.pdf"));
        assert_eq!(result.text, "\n[Page 1 Text]\nhello");
        assert!(!result.placeholder);
        assert_eq!((a_calls.get(), b_calls.get(), c_calls.get()), (1, 1, 0));
        assert_eq!(
            result.log,
            vec!["a ran", "b ran", "Successfully extracted text using b"]
        );
    }

    #[test]
    fn all_tiers_empty_yields_placeholder() {
        let (a, _) = canned("a", "");
        let (b, _) = canned("b", " ");
        let extractor = PdfExtractor::with_tiers(vec![a, b]);

        let result = extractor.extract(Path::new("x.pdf"));
        assert_eq!(result.text, NO_PDF_TEXT);
        assert!(result.placeholder);
        assert!(!result.has_text());
        assert_eq!(result.log.last().unwrap(), "All extraction methods failed");
    }

    #[test]
    fn ocr_tier_without_engine_logs_unavailable() {
        let tier = OcrFallback::new(OcrEngine::disabled());
        let result = tier.attempt(Path::new("scan.pdf"));
        assert_eq!(result.text, "");
        assert_eq!(result.log, vec![OCR_UNAVAILABLE]);
    }

    #[test]
    fn ocr_tier_is_announced() {
        let extractor = PdfExtractor::with_tiers(vec![Box::new(OcrFallback::new(
            OcrEngine::disabled(),
        ))]);
        let result = extractor.extract(Path::new("scan.pdf"));
        assert_eq!(
            result.log,
            vec![
                "No text found with standard methods, trying OCR...",
                OCR_UNAVAILABLE,
                "All extraction methods failed",
            ]
        );
    }

    #[test]
    fn fold_tags_pages_and_skips_failures() {
        let mut log = Vec::new();
        let text = fold_pages(
            vec![
                (1, PageOutcome::Text("first".into())),
                (2, PageOutcome::Empty),
                (3, PageOutcome::Failed("bad xref".into())),
                (4, PageOutcome::Text("fourth".into())),
            ],
            PageSource::TextLayer,
            &mut log,
        );
        assert_eq!(text, "\n[Page 1 Text]\nfirst\n[Page 4 Text]\nfourth");
        assert_eq!(
            log,
            vec![
                "Extracted text from page 1",
                "No text found in page 2",
                "Page 3 error: bad xref",
                "Extracted text from page 4",
            ]
        );
    }

    #[test]
    fn fold_ocr_uses_ocr_markers() {
        let mut log = Vec::new();
        let text = fold_pages(
            vec![(1, PageOutcome::Text("scanned".into())), (2, PageOutcome::Empty)],
            PageSource::Ocr,
            &mut log,
        );
        assert_eq!(text, "\n[Page 1 OCR Text]\nscanned");
        assert_eq!(log, vec!["OCR processed page 1", "No OCR text found on page 2"]);
    }

    #[test]
    fn garbage_bytes_fail_both_parsers() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let native = NativeTextLayer.attempt(&path);
        assert_eq!(native.text, "");
        assert!(native.log[0].starts_with("pdf-extract"));

        let legacy = LegacyParser.attempt(&path);
        assert_eq!(legacy.text, "");
        assert!(legacy.log[0].starts_with("lopdf error"));
    }
}
