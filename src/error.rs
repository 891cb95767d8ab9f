//! Rich diagnostic error types for docmeta.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. The extraction pipeline itself never
//! surfaces these to callers: backend errors are folded into the extraction log.
//! They reach the user only through configuration, upload validation and the CLI.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::extract::error::ExtractError;
use crate::upload::UploadError;

/// Top-level error type for docmeta.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum DocmetaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Upload(#[from] UploadError),
}

/// Convenience alias for docmeta results.
pub type DocmetaResult<T> = std::result::Result<T, DocmetaError>;
