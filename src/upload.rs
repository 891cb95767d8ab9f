//! Upload handling: extension allowlisting, filename sanitising and the
//! stage-extract-delete cycle around [`generate_metadata`].

use std::io::Write;
use std::path::Path;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::config::{DocmetaConfig, UploadConfig};
use crate::extract::detect_kind;
use crate::metadata::{MetadataReport, generate_metadata};
use crate::ocr::OcrEngine;

/// Errors from accepting an upload.
#[derive(Debug, Error, Diagnostic)]
pub enum UploadError {
    #[error("no file was provided")]
    #[diagnostic(
        code(docmeta::upload::missing),
        help("Send the document in a multipart field named `file`.")
    )]
    Missing,

    #[error("file type not allowed: {filename}")]
    #[diagnostic(
        code(docmeta::upload::disallowed),
        help("Allowed extensions: {allowed}.")
    )]
    Disallowed { filename: String, allowed: String },

    #[error("failed to stage upload in {dir}")]
    #[diagnostic(
        code(docmeta::upload::stage),
        help("Check that the upload directory exists and is writable.")
    )]
    Stage {
        dir: String,
        #[source]
        source: std::io::Error,
    },
}

pub type UploadResult<T> = std::result::Result<T, UploadError>;

/// Extension allowlist for uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed: Vec<String>,
}

impl UploadPolicy {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            allowed: config
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// The name needs a dot and its final extension must be allowlisted.
    pub fn is_allowed(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => self.allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    fn check(&self, filename: &str) -> UploadResult<()> {
        if filename.is_empty() {
            return Err(UploadError::Missing);
        }
        if !self.is_allowed(filename) {
            return Err(UploadError::Disallowed {
                filename: filename.to_string(),
                allowed: self.allowed.join(", "),
            });
        }
        Ok(())
    }
}

/// Reduce a client-supplied name to a safe single path component.
///
/// Path separators and whitespace runs become `_`, anything other than ASCII
/// alphanumerics, `.`, `-` and `_` is dropped, and leading dots and
/// underscores are stripped.
pub fn sanitize_filename(filename: &str) -> String {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    kept.trim_start_matches(['.', '_']).to_string()
}

/// Result of processing one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    /// Sanitised name the file was staged under.
    pub filename: String,
    pub metadata: MetadataReport,
}

/// Validate, stage and analyse an uploaded document.
///
/// The bytes are written to a private temporary file named
/// `<random>_<sanitised name>` inside the configured upload directory (the
/// system temp dir by default), which is removed once the report is built.
pub fn process_upload(
    filename: &str,
    bytes: &[u8],
    config: &DocmetaConfig,
    ocr: &OcrEngine,
) -> UploadResult<UploadOutcome> {
    let policy = UploadPolicy::new(&config.upload);
    policy.check(filename)?;

    let safe_name = staged_name(filename);
    let dir = config
        .upload
        .upload_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let stage_err = |source| UploadError::Stage {
        dir: dir.display().to_string(),
        source,
    };

    let mut staged = tempfile::Builder::new()
        .prefix("")
        .suffix(&format!("_{safe_name}"))
        .rand_bytes(16)
        .tempfile_in(&dir)
        .map_err(stage_err)?;
    staged.write_all(bytes).map_err(stage_err)?;
    staged.flush().map_err(stage_err)?;

    tracing::info!(filename = %safe_name, bytes = bytes.len(), "processing upload");
    let metadata = generate_metadata(staged.path(), config, ocr);

    if let Err(e) = staged.close() {
        tracing::warn!(filename = %safe_name, error = %e, "failed to remove staged upload");
    }

    Ok(UploadOutcome {
        filename: safe_name,
        metadata,
    })
}

/// Sanitised name that still carries the uploaded extension.
fn staged_name(filename: &str) -> String {
    let safe = sanitize_filename(filename);
    if detect_kind(Path::new(&safe)).is_some() {
        return safe;
    }
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    format!("upload.{ext}")
}
