//! Metadata assembly: dispatch to an extractor, stat the file and derive the
//! record fields from the extracted text.
//!
//! [`generate_metadata`] never fails. Problems surface either as degraded
//! field values in a [`MetadataRecord`] or, when the file cannot be found or
//! stat'ed, as an [`ErrorRecord`].

use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::analysis::{ContentType, classify, extract_keywords, summarize};
use crate::config::DocmetaConfig;
use crate::extract::{ExtractionResult, detect_kind, extractor_for};
use crate::ocr::OcrEngine;

/// Used for the summary and the preview when no text was recovered.
pub const NO_TEXT_EXTRACTED: &str = "No text extracted";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether any document text was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionStatus {
    Success,
    Failed,
}

/// Full metadata for one document. Every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub file_name: String,
    /// Uppercased extension without the dot, or `Unknown`.
    pub file_type: String,
    /// Human readable, e.g. `12.50 KB`.
    pub file_size: String,
    pub creation_date: String,
    pub modification_date: String,
    pub word_count: usize,
    pub character_count: usize,
    pub line_count: usize,
    pub keywords: Vec<String>,
    pub summary: String,
    pub content_type: ContentType,
    pub extraction_status: ExtractionStatus,
    pub extraction_log: Vec<String>,
    pub text_preview: String,
}

/// Returned instead of a record when the file itself is unusable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
    pub extraction_log: Vec<String>,
}

/// Outcome of [`generate_metadata`]. Serializes as whichever record it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataReport {
    Complete(MetadataRecord),
    Error(ErrorRecord),
}

impl MetadataReport {
    pub fn record(&self) -> Option<&MetadataRecord> {
        match self {
            Self::Complete(record) => Some(record),
            Self::Error(_) => None,
        }
    }

    pub fn extraction_log(&self) -> &[String] {
        match self {
            Self::Complete(record) => &record.extraction_log,
            Self::Error(error) => &error.extraction_log,
        }
    }
}

/// Extract text from `path` and build its metadata report.
pub fn generate_metadata(path: &Path, config: &DocmetaConfig, ocr: &OcrEngine) -> MetadataReport {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "file not found");
        return MetadataReport::Error(ErrorRecord {
            error: "File not found".into(),
            extraction_log: Vec::new(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let extraction = match detect_kind(path) {
        Some(kind) => {
            let extractor = extractor_for(kind, ocr);
            tracing::info!(path = %path.display(), kind = %extractor.kind(), "extracting text");
            extractor.extract(path)
        }
        None => {
            let shown = extension.as_deref().map(|e| format!(".{e}")).unwrap_or_default();
            tracing::info!(path = %path.display(), "unsupported file type");
            ExtractionResult::empty(vec![format!("Unsupported file type: {shown}")])
        }
    };

    let stats = match std::fs::metadata(path) {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "stat failed");
            return MetadataReport::Error(ErrorRecord {
                error: format!("Metadata generation failed: {e}"),
                extraction_log: extraction.log,
            });
        }
    };

    let record = assemble(path, extension.as_deref(), &stats, extraction, config);
    tracing::info!(
        file = %record.file_name,
        status = ?record.extraction_status,
        words = record.word_count,
        content_type = %record.content_type,
        "metadata generated"
    );
    MetadataReport::Complete(record)
}

fn assemble(
    path: &Path,
    extension: Option<&str>,
    stats: &Metadata,
    extraction: ExtractionResult,
    config: &DocmetaConfig,
) -> MetadataRecord {
    let content = extraction.content();
    let has_text = extraction.has_text();

    let (keywords, summary, content_type) = if has_text {
        (
            extract_keywords(content, config.num_keywords),
            summarize(content, config.summary_sentences),
            classify(content),
        )
    } else {
        (Vec::new(), NO_TEXT_EXTRACTED.to_string(), ContentType::Unknown)
    };

    MetadataRecord {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_type: extension
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| "Unknown".into()),
        file_size: format!("{:.2} KB", stats.len() as f64 / 1024.0),
        creation_date: created_at(stats).map(format_time).unwrap_or_default(),
        modification_date: stats.modified().map(format_time).unwrap_or_default(),
        word_count: content.split_whitespace().count(),
        character_count: content.chars().count(),
        line_count: line_count(content),
        keywords,
        summary,
        content_type,
        extraction_status: if has_text {
            ExtractionStatus::Success
        } else {
            ExtractionStatus::Failed
        },
        text_preview: preview(&extraction, config.preview_chars),
        extraction_log: extraction.log,
    }
}

fn line_count(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.matches('\n').count() + 1
    }
}

/// First `limit` characters plus `...` when longer. A placeholder message is
/// shown as-is; no text at all shows [`NO_TEXT_EXTRACTED`].
fn preview(extraction: &ExtractionResult, limit: usize) -> String {
    let text = &extraction.text;
    if text.is_empty() {
        return NO_TEXT_EXTRACTED.to_string();
    }
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.clone(),
    }
}

/// Birth time where the filesystem reports one, else the inode change time.
fn created_at(stats: &Metadata) -> std::io::Result<SystemTime> {
    match stats.created() {
        Ok(time) => Ok(time),
        Err(e) => changed_at(stats).ok_or(e),
    }
}

#[cfg(unix)]
fn changed_at(stats: &Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    let changed = DateTime::from_timestamp(stats.ctime(), u32::try_from(stats.ctime_nsec()).ok()?)?;
    Some(changed.into())
}

#[cfg(not(unix))]
fn changed_at(_stats: &Metadata) -> Option<SystemTime> {
    None
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_counts() {
        assert_eq!(line_count(""), 0);
        assert_eq!(line_count("one"), 1);
        assert_eq!(line_count("one\ntwo\n"), 3);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let result = ExtractionResult::extracted("äöü".repeat(3), vec![]);
        assert_eq!(preview(&result, 4), "äöüä...");
        assert_eq!(preview(&result, 9), "äöüäöüäöü");
        assert_eq!(preview(&result, 500), "äöüäöüäöü");
    }

    #[test]
    fn preview_fallbacks() {
        assert_eq!(preview(&ExtractionResult::empty(vec![]), 500), NO_TEXT_EXTRACTED);
        let placeholder = ExtractionResult::placeholder("DOCX extraction error: x", vec![]);
        assert_eq!(preview(&placeholder, 500), "DOCX extraction error: x");
    }

    #[test]
    fn missing_file_is_error_record() {
        let report = generate_metadata(
            Path::new("/nonexistent/docmeta/missing.txt"),
            &DocmetaConfig::default(),
            &OcrEngine::disabled(),
        );
        assert_eq!(
            report,
            MetadataReport::Error(ErrorRecord {
                error: "File not found".into(),
                extraction_log: vec![],
            })
        );
        assert!(report.extraction_log().is_empty());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error"], "File not found");
        assert!(json["extraction_log"].as_array().unwrap().is_empty());
    }

    #[test]
    fn whitespace_only_text_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "  \n\t \n").unwrap();

        let report = generate_metadata(&path, &DocmetaConfig::default(), &OcrEngine::disabled());
        let record = report.record().unwrap();
        assert_eq!(record.extraction_status, ExtractionStatus::Failed);
        assert!(record.keywords.is_empty());
        assert_eq!(record.summary, NO_TEXT_EXTRACTED);
        assert_eq!(record.content_type, ContentType::Unknown);
        assert_eq!(record.line_count, 3);
    }

    #[test]
    fn record_fields_from_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.TXT");
        std::fs::write(&path, "Invoice total due.\nPay the amount by Friday.").unwrap();

        let report = generate_metadata(&path, &DocmetaConfig::default(), &OcrEngine::disabled());
        let record = report.record().unwrap();
        assert_eq!(record.file_name, "notes.TXT");
        assert_eq!(record.file_type, "TXT");
        assert_eq!(record.word_count, 8);
        assert_eq!(record.line_count, 2);
        assert_eq!(record.content_type, ContentType::Financial);
        assert_eq!(record.extraction_status, ExtractionStatus::Success);
        assert!(record.file_size.ends_with(" KB"));
        assert_eq!(record.creation_date.len(), 19);
        assert_eq!(record.modification_date.len(), 19);
        assert_eq!(report.extraction_log(), &["TXT file read successfully"]);
    }

    #[test]
    fn config_limits_apply() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("long.txt");
        std::fs::write(
            &path,
            "alpha beta gamma delta epsilon zeta. The preview will be cut short here.",
        )
        .unwrap();

        let config = DocmetaConfig {
            num_keywords: 2,
            preview_chars: 5,
            ..DocmetaConfig::default()
        };
        let report = generate_metadata(&path, &config, &OcrEngine::disabled());
        let record = report.record().unwrap();
        assert_eq!(record.keywords, vec!["alpha", "beta"]);
        assert_eq!(record.text_preview, "alpha...");
    }
}
