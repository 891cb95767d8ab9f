//! Configuration for the extraction pipeline, OCR backend and upload handling.
//!
//! Stored as TOML. Every field has a default, so a partial file (or none at all)
//! is valid. The default location follows the XDG Base Directory Specification:
//! `$XDG_CONFIG_HOME/docmeta/config.toml`.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or saving configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(docmeta::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(docmeta::config::parse),
        help("The config must be valid TOML. Run `docmeta config show` to see the expected shape.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(docmeta::config::write),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocmetaConfig {
    /// Maximum number of keywords in a record.
    pub num_keywords: usize,
    /// Target sentence count for the extractive summary.
    pub summary_sentences: usize,
    /// Characters of extracted text shown in the preview.
    pub preview_chars: usize,
    pub ocr: OcrConfig,
    pub upload: UploadConfig,
}

impl Default for DocmetaConfig {
    fn default() -> Self {
        Self {
            num_keywords: 10,
            summary_sentences: 3,
            preview_chars: 500,
            ocr: OcrConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

/// External OCR tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable (name on PATH or absolute path).
    pub tesseract_cmd: String,
    /// Poppler `pdftoppm` executable used to rasterise PDF pages.
    pub pdftoppm_cmd: String,
    /// Rasterisation resolution.
    pub dpi: u32,
    /// Tesseract OCR engine mode (`--oem`).
    pub oem: u8,
    /// Tesseract page segmentation mode (`--psm`).
    pub psm: u8,
    /// Tesseract language pack (`-l`); tesseract's own default when unset.
    pub language: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".into(),
            pdftoppm_cmd: "pdftoppm".into(),
            dpi: 200,
            oem: 3,
            psm: 6,
            language: None,
        }
    }
}

/// Upload validation and temporary storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Lowercase extensions (without the dot) accepted for upload.
    pub allowed_extensions: Vec<String>,
    /// Where uploads are staged; the system temp dir when unset.
    pub upload_dir: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["pdf", "docx", "txt", "png", "jpg", "jpeg"]
                .into_iter()
                .map(String::from)
                .collect(),
            upload_dir: None,
        }
    }
}

impl DocmetaConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Otherwise the XDG default is read when
    /// present, and built-in defaults are used when it is not.
    pub fn resolve(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `$XDG_CONFIG_HOME/docmeta/config.toml`, falling back to `$HOME/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;
    Some(base.join("docmeta").join("config.toml"))
}
