//! DOCX extraction: body paragraphs from `word/document.xml`.
//!
//! Paragraphs inside tables and text boxes are skipped, matching what a
//! document's top-level paragraph list contains. Empty paragraphs are dropped
//! and the rest are joined with newlines.
//!
//! On failure the text is an error message rather than empty (see
//! [`ExtractionResult::placeholder`]), which downstream consumers rely on.

use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::{DocumentKind, ExtractionResult, TextExtractor};

const DOCUMENT_PART: &str = "word/document.xml";

/// DOCX extractor backed by `zip` + `quick-xml`.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Docx
    }

    fn extract(&self, path: &Path) -> ExtractionResult {
        match read_paragraphs(path) {
            Ok(paragraphs) => ExtractionResult::extracted(
                paragraphs.join("\n"),
                vec!["DOCX extracted successfully".into()],
            ),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "DOCX extraction failed");
                ExtractionResult::placeholder(
                    format!("DOCX extraction error: {e}"),
                    vec![format!("DOCX error: {e}")],
                )
            }
        }
    }
}

fn read_paragraphs(path: &Path) -> ExtractResult<Vec<String>> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ExtractError::Docx {
        message: e.to_string(),
    })?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::Docx {
            message: format!("{DOCUMENT_PART}: {e}"),
        })?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    body_paragraphs(&xml)
}

/// Collect the non-empty text of every body-level `w:p`.
fn body_paragraphs(xml: &str) -> ExtractResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    // Nesting depth of containers whose paragraphs are not body paragraphs.
    let mut nested = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| ExtractError::Docx {
            message: format!("XML error at byte {}: {e}", reader.buffer_position()),
        })?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested += 1,
                b"w:p" if nested == 0 => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested = nested.saturating_sub(1),
                b"w:p" if nested == 0 => {
                    if let Some(text) = current.take() {
                        if !text.trim().is_empty() {
                            paragraphs.push(text);
                        }
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) if nested == 0 => {
                if let Some(text) = current.as_mut() {
                    match e.name().as_ref() {
                        b"w:tab" => text.push('\t'),
                        b"w:br" | b"w:cr" => text.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::Text(e) if in_text && nested == 0 => {
                if let Some(text) = current.as_mut() {
                    let unescaped = e.unescape().map_err(|err| ExtractError::Docx {
                        message: err.to_string(),
                    })?;
                    text.push_str(&unescaped);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn paragraphs_in_document_order() {
        let xml = document(
            "<w:p><w:r><w:t>First</w:t></w:r><w:r><w:t xml:space=\"preserve\"> line</w:t></w:r></w:p>\
             <w:p/>\
             <w:p><w:r><w:t>   </w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second &amp; last</w:t></w:r></w:p>",
        );
        assert_eq!(
            body_paragraphs(&xml).unwrap(),
            vec!["First line", "Second & last"]
        );
    }

    #[test]
    fn tables_are_skipped() {
        let xml = document(
            "<w:p><w:r><w:t>Before</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>After</w:t></w:r></w:p>",
        );
        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["Before", "After"]);
    }

    #[test]
    fn tabs_and_breaks() {
        let xml = document("<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>");
        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["a\tb\nc"]);
    }

    #[test]
    fn non_zip_file_yields_error_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, b"plain bytes").unwrap();

        let result = DocxExtractor.extract(&path);
        assert!(result.placeholder);
        assert!(result.text.starts_with("DOCX extraction error: "));
        assert_eq!(result.log.len(), 1);
        assert!(result.log[0].starts_with("DOCX error: "));
    }
}
