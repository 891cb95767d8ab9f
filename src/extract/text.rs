//! Plain-text reader: UTF-8 first, Latin-1 when the bytes are not valid UTF-8.
//!
//! Line endings are normalised the way text-mode reads do (`\r\n` and lone
//! `\r` become `\n`).

use std::path::Path;

use crate::extract::{DocumentKind, ExtractionResult, TextExtractor};

/// Extractor for `.txt` files.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::PlainText
    }

    fn extract(&self, path: &Path) -> ExtractionResult {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => return ExtractionResult::empty(vec![format!("TXT read error: {e}")]),
        };

        match String::from_utf8(bytes) {
            Ok(text) => ExtractionResult::extracted(
                normalize_newlines(&text),
                vec!["TXT file read successfully".into()],
            ),
            Err(e) => {
                tracing::debug!(path = %path.display(), "not UTF-8, decoding as latin-1");
                let text = decode_latin1(e.as_bytes());
                ExtractionResult::extracted(
                    normalize_newlines(&text),
                    vec!["TXT file read with latin-1 encoding".into()],
                )
            }
        }
    }
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
